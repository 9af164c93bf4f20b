//! Burl core library: snarl-decomposition seed clustering for variation
//! graphs.
//!
//! Alignment seeds — minimizer hits placed on a variation graph — are
//! clustered into spatially coherent groups without any all-pairs distance
//! computation, by folding them bottom-up through a precomputed snarl/chain
//! decomposition and querying its [`DistanceOracle`]. Both single-read and
//! paired-end (fragment) clustering are supported through
//! [`SeedClusterer`].
#![cfg_attr(docsrs, feature(doc_cfg))]

mod aggregate;
pub mod distance;
mod engine;
mod error;
mod net;
mod oracle;
mod seed;
mod state;
#[cfg(test)]
pub(crate) mod test_utils;
mod union_find;

pub use crate::{
    engine::SeedClusterer,
    error::{ClusterError, ClusterErrorCode, Result},
    net::{NetHandle, NetKind, NodeId, Side},
    oracle::{DistanceOracle, SequenceGraph, SnarlPosition},
    seed::{Cluster, GraphPos, NodeFacts, Seed},
};
