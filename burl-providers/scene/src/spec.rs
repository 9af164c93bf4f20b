//! Serde data model for scene descriptions.

use burl_core::Side;
use serde::{Deserialize, Serialize};

/// A whole scene: the decomposition plus optional per-read seeds.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneSpec {
    /// Display name for summaries; defaults to the file stem at the CLI.
    #[serde(default)]
    pub name: Option<String>,
    /// Every graph node in the scene.
    pub nodes: Vec<NodeSpec>,
    /// Chains; nodes and snarls not referenced by any chain or snarl hang
    /// off the root.
    #[serde(default)]
    pub chains: Vec<ChainSpec>,
    /// Snarls referenced from the chains.
    #[serde(default)]
    pub snarls: Vec<SnarlSpec>,
    /// Seeds per read (one entry for single-end, two for paired-end).
    #[serde(default)]
    pub reads: Vec<Vec<SeedSpec>>,
}

/// One graph node.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Node id.
    pub id: u64,
    /// Sequence length in bases.
    pub length: usize,
    /// Connected component at the root, for nodes hanging off the root.
    #[serde(default)]
    pub root_component: usize,
}

/// One chain: an ordered run of nodes and snarls.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainSpec {
    /// Chain id.
    pub id: u64,
    /// Whether the chain's two ends meet at the same boundary node.
    #[serde(default)]
    pub looping: bool,
    /// Connected component at the root, for top-level chains.
    #[serde(default)]
    pub root_component: usize,
    /// Children in chain order; must start and end with a node.
    pub children: Vec<ChainElement>,
}

/// One element of a chain's child run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainElement {
    /// A node of the chain.
    Node {
        /// Node id.
        id: u64,
        /// Whether the node runs backwards relative to the chain.
        #[serde(default)]
        reversed: bool,
    },
    /// A snarl between the surrounding nodes.
    Snarl {
        /// Snarl id.
        id: u64,
    },
    /// A connectivity break: coordinates restart and no distance crosses.
    Break,
}

/// One snarl and its internal geometry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnarlSpec {
    /// Snarl id.
    pub id: u64,
    /// Minimum distance between the snarl's two bound positions.
    pub min_length: usize,
    /// The chains and trivial nodes inside the snarl.
    #[serde(default)]
    pub children: Vec<SnarlChild>,
    /// Bound-to-bound distances between children; unlisted pairs are
    /// unreachable.
    #[serde(default)]
    pub distances: Vec<ChildDistanceSpec>,
    /// Distances from child bounds to the snarl's own bounds.
    #[serde(default)]
    pub bound_distances: Vec<BoundDistanceSpec>,
}

/// A child of a snarl: a nested chain, or a node acting as a trivial
/// chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnarlChild {
    /// A bare node directly inside the snarl.
    Node {
        /// Node id.
        id: u64,
    },
    /// A nested chain.
    Chain {
        /// Chain id.
        id: u64,
    },
}

/// One side of a decomposition node, serialisable form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideSpec {
    /// The start-facing side.
    Left,
    /// The end-facing side.
    Right,
}

impl From<SideSpec> for Side {
    fn from(side: SideSpec) -> Self {
        match side {
            SideSpec::Left => Self::Left,
            SideSpec::Right => Self::Right,
        }
    }
}

/// Minimum distance between the bound positions of two snarl children.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ChildDistanceSpec {
    /// First child.
    pub from: SnarlChild,
    /// Side of the first child.
    pub from_side: SideSpec,
    /// Second child.
    pub to: SnarlChild,
    /// Side of the second child.
    pub to_side: SideSpec,
    /// Distance in bases.
    pub distance: usize,
}

/// Distance from a child's bound to one of the snarl's own bounds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoundDistanceSpec {
    /// The child.
    pub child: SnarlChild,
    /// Side of the child.
    pub child_side: SideSpec,
    /// Side of the snarl.
    pub snarl_side: SideSpec,
    /// Distance in bases.
    pub distance: usize,
}

/// One seed placement.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SeedSpec {
    /// Node the seed sits on.
    pub node: u64,
    /// Whether the seed reads the node's reverse strand.
    #[serde(default)]
    pub reversed: bool,
    /// Base offset along the chosen strand.
    pub offset: usize,
    /// Index of the source minimizer.
    pub source: usize,
}
