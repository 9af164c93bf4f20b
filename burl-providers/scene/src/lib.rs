//! Scene provider: a declarative, in-memory snarl decomposition.
//!
//! A [`SceneSpec`] describes a small variation-graph decomposition — nodes,
//! chains, snarls, their geometry, and optionally seeds — in plain data,
//! loadable from JSON. Compiling it yields a [`Scene`] implementing the
//! core's consumed [`burl_core::DistanceOracle`] and
//! [`burl_core::SequenceGraph`] traits, which is what the CLI, benches, and
//! integration tests cluster against. Prefix sums, components, and depths
//! are derived during compilation; only snarl-internal distances are
//! spelled out, since the decomposition builder that would compute them is
//! outside this workspace's scope.

mod error;
mod scene;
mod spec;

pub use crate::{
    error::SceneError,
    scene::Scene,
    spec::{
        BoundDistanceSpec, ChainElement, ChainSpec, ChildDistanceSpec, NodeSpec, SceneSpec,
        SeedSpec, SideSpec, SnarlChild, SnarlSpec,
    },
};
