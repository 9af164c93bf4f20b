//! Errors raised while parsing or compiling a scene.

use thiserror::Error;

/// Errors surfaced by [`crate::Scene`] construction.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SceneError {
    /// The JSON input did not parse as a [`crate::SceneSpec`].
    #[error("scene description is not valid JSON: {source}")]
    Parse {
        /// Underlying deserialisation failure.
        #[from]
        source: serde_json::Error,
    },
    /// Two declarations used the same node id.
    #[error("node {node} is declared more than once")]
    DuplicateNode {
        /// The repeated node id.
        node: u64,
    },
    /// Two declarations used the same chain id.
    #[error("chain {chain} is declared more than once")]
    DuplicateChain {
        /// The repeated chain id.
        chain: u64,
    },
    /// Two declarations used the same snarl id.
    #[error("snarl {snarl} is declared more than once")]
    DuplicateSnarl {
        /// The repeated snarl id.
        snarl: u64,
    },
    /// A chain or snarl referenced an undeclared node.
    #[error("reference to undeclared node {node}")]
    UnknownNode {
        /// The missing node id.
        node: u64,
    },
    /// A chain referenced an undeclared snarl.
    #[error("chain {chain} references undeclared snarl {snarl}")]
    UnknownSnarl {
        /// The referencing chain.
        chain: u64,
        /// The missing snarl id.
        snarl: u64,
    },
    /// A snarl referenced an undeclared chain.
    #[error("snarl {snarl} references undeclared chain {chain}")]
    UnknownChain {
        /// The referencing snarl.
        snarl: u64,
        /// The missing chain id.
        chain: u64,
    },
    /// A node or chain was claimed by more than one parent.
    #[error("{what} {id} is claimed by more than one parent")]
    ClaimedTwice {
        /// `"node"` or `"chain"`.
        what: &'static str,
        /// The contested id.
        id: u64,
    },
    /// A declared snarl never appeared between two nodes of a chain.
    #[error("snarl {snarl} is not placed in any chain")]
    UnplacedSnarl {
        /// The orphaned snarl id.
        snarl: u64,
    },
    /// A chain must start and end with a node.
    #[error("chain {chain} must start and end with a node")]
    MalformedChain {
        /// The offending chain id.
        chain: u64,
    },
    /// A component break must sit between two nodes.
    #[error("chain {chain} has a break that is not between two nodes")]
    MisplacedBreak {
        /// The offending chain id.
        chain: u64,
    },
    /// A snarl distance referenced something that is not a child of that
    /// snarl.
    #[error("snarl {snarl} distance references a non-child")]
    ForeignDistance {
        /// The offending snarl id.
        snarl: u64,
    },
    /// The decomposition nests in a cycle.
    #[error("decomposition nesting forms a cycle")]
    CyclicNesting,
    /// A seed lies outside its node.
    #[error("seed on node {node} has offset {offset} beyond length {length}")]
    SeedOutOfBounds {
        /// Node the seed names.
        node: u64,
        /// Offending offset.
        offset: usize,
        /// Length of the node.
        length: usize,
    },
}
