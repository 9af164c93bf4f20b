//! Opaque references into the snarl decomposition.
//!
//! A [`NetHandle`] names one node of the decomposition tree (a graph node, a
//! snarl, or a chain) without owning it: a kind tag, a numeric id, and an
//! orientation bit, with structural equality and hashing. The decomposition
//! itself is owned by the distance oracle; the engine only passes handles
//! back into oracle queries.

/// Identifier of a node in the underlying variation graph.
pub type NodeId = u64;

/// The kind of decomposition-tree node a [`NetHandle`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetKind {
    /// A single graph node.
    Node,
    /// A snarl: a bounded bubble region between two boundary nodes.
    Snarl,
    /// A chain: an ordered run of nodes and snarls.
    Chain,
    /// The synthetic root containing every top-level chain.
    Root,
}

/// Opaque reference to one node of the snarl decomposition.
///
/// # Examples
/// ```
/// use burl_core::{NetHandle, NetKind};
///
/// let chain = NetHandle::new(NetKind::Chain, 3);
/// assert_eq!(chain.kind(), NetKind::Chain);
/// assert_eq!(chain.id(), 3);
/// assert!(!chain.is_reverse());
/// assert_eq!(chain.flipped().is_reverse(), true);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NetHandle {
    kind: NetKind,
    id: u64,
    is_reverse: bool,
}

impl NetHandle {
    /// Creates a forward-oriented handle.
    #[must_use]
    pub const fn new(kind: NetKind, id: u64) -> Self {
        Self {
            kind,
            id,
            is_reverse: false,
        }
    }

    /// Creates a handle with an explicit orientation.
    #[must_use]
    pub const fn new_oriented(kind: NetKind, id: u64, is_reverse: bool) -> Self {
        Self {
            kind,
            id,
            is_reverse,
        }
    }

    /// The handle of the synthetic root.
    #[must_use]
    pub const fn root() -> Self {
        Self::new(NetKind::Root, 0)
    }

    /// Returns the kind of decomposition node this handle refers to.
    #[must_use]
    #[rustfmt::skip]
    pub const fn kind(self) -> NetKind { self.kind }

    /// Returns the numeric id within the handle's kind.
    #[must_use]
    #[rustfmt::skip]
    pub const fn id(self) -> u64 { self.id }

    /// Returns the orientation bit.
    #[must_use]
    #[rustfmt::skip]
    pub const fn is_reverse(self) -> bool { self.is_reverse }

    /// Returns the same handle with the opposite orientation.
    #[must_use]
    pub const fn flipped(self) -> Self {
        Self {
            kind: self.kind,
            id: self.id,
            is_reverse: !self.is_reverse,
        }
    }
}

/// One side of a decomposition node, in the node's own orientation.
///
/// `Left` is the side nearest a chain's start (or a node's first base);
/// `Right` is the side nearest the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The start-facing side.
    Left,
    /// The end-facing side.
    Right,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_compare_structurally() {
        let a = NetHandle::new(NetKind::Snarl, 7);
        let b = NetHandle::new(NetKind::Snarl, 7);
        assert_eq!(a, b);
        assert_ne!(a, a.flipped());
        assert_ne!(a, NetHandle::new(NetKind::Chain, 7));
    }

    #[test]
    fn sides_are_involutive() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite().opposite(), Side::Right);
    }
}
