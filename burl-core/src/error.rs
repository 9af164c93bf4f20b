//! Error types for the burl core library.
//!
//! The engine raises no I/O or parsing errors; every failure mode is a
//! caller-contract violation surfaced before any clustering state is built.

use crate::net::NodeId;

/// Errors returned by [`crate::SeedClusterer`] entry points.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClusterError {
    /// Fragment clustering was requested with a limit tighter than the read
    /// limit.
    #[error(
        "fragment_distance_limit {fragment_limit} must be at least read_distance_limit {read_limit}"
    )]
    FragmentLimitTooSmall {
        /// The per-read distance limit supplied by the caller.
        read_limit: usize,
        /// The offending fragment distance limit.
        fragment_limit: usize,
    },
    /// A fragment carried more reads than the engine supports.
    #[error("a fragment may hold at most 2 reads, got {got}")]
    TooManyReads {
        /// Number of per-read seed sequences supplied.
        got: usize,
    },
    /// A seed referenced a graph node that neither the graph nor the
    /// decomposition knows about.
    #[error("seed references unknown graph node {node}")]
    UnknownNode {
        /// The unknown node id.
        node: NodeId,
    },
}

impl ClusterError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> ClusterErrorCode {
        match self {
            Self::FragmentLimitTooSmall { .. } => ClusterErrorCode::FragmentLimitTooSmall,
            Self::TooManyReads { .. } => ClusterErrorCode::TooManyReads,
            Self::UnknownNode { .. } => ClusterErrorCode::UnknownNode,
        }
    }
}

/// Machine-readable error codes for [`ClusterError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ClusterErrorCode {
    /// Fragment limit below the read limit.
    FragmentLimitTooSmall,
    /// More per-fragment reads than supported.
    TooManyReads,
    /// Seed on a node unknown to graph and decomposition.
    UnknownNode,
}

impl ClusterErrorCode {
    /// Returns the symbolic identifier for logging surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FragmentLimitTooSmall => "FRAGMENT_LIMIT_TOO_SMALL",
            Self::TooManyReads => "TOO_MANY_READS",
            Self::UnknownNode => "UNKNOWN_NODE",
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, ClusterError>;
