//! Consumed interfaces: the distance oracle and the handle graph.
//!
//! The engine never computes graph distances itself. It folds seeds upward
//! through the snarl decomposition and asks a precomputed, read-only
//! [`DistanceOracle`] for every structural or metric fact it needs. The
//! oracle (and the [`SequenceGraph`] it complements) is immutable for the
//! duration of a clustering call and may be shared by concurrent calls.
//!
//! # Distance and coordinate contract
//!
//! All distances are point-to-point base counts along a minimal traversal;
//! [`UNREACHABLE`] marks the absence of a path. Per-node prefix sums are
//! chain-local coordinates, restarting at zero in every chain component, and
//! are consistent with point distances: the first position of a node is one
//! past the last position of an adjacent predecessor, or the predecessor's
//! last position plus the minimum length of the snarl between them.
//!
//! [`UNREACHABLE`]: crate::distance::UNREACHABLE

use crate::net::{NetHandle, NodeId, Side};

/// Position of a snarl within its parent chain's coordinates.
///
/// `left_offset` is the coordinate of the snarl's left bound position (the
/// inward face of its start node); `right_offset` is the coordinate of the
/// right bound position. The component fields give the chain components of
/// the two bounds, which differ exactly when the chain breaks inside the
/// snarl.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnarlPosition {
    /// Chain coordinate of the left bound position.
    pub left_offset: usize,
    /// Chain coordinate of the right bound position.
    pub right_offset: usize,
    /// Chain component of the left bound.
    pub start_component: usize,
    /// Chain component of the right bound.
    pub end_component: usize,
}

/// Read-only queries over a precomputed snarl decomposition.
///
/// Every method is conceptually `O(1)` or `O(log n)` and must be safe to
/// call from concurrent, independent clustering invocations; the engine
/// takes `&self` only.
pub trait DistanceOracle {
    /// Returns the decomposition handle of a graph node, or `None` when the
    /// node is unknown to the decomposition.
    fn node_net(&self, node: NodeId) -> Option<NetHandle>;

    /// Returns the parent of a decomposition node (the root for top-level
    /// chains).
    fn parent(&self, net: NetHandle) -> NetHandle;

    /// Returns the chain depth of a decomposition node: the root is `0`,
    /// top-level chains are `1`, and each snarl nesting adds one level to
    /// the chains (and trivial-chain nodes) it contains.
    fn depth(&self, net: NetHandle) -> usize;

    /// Returns the connected-component id of the decomposition node at the
    /// root. Two top-level chains share a component exactly when their
    /// graphs are connected.
    fn root_component(&self, net: NetHandle) -> usize;

    /// Returns the minimum traversable length of a node or snarl. For a
    /// snarl this is the minimum distance between its two bound positions.
    fn minimum_length(&self, net: NetHandle) -> usize;

    /// Returns the minimum length of a chain; for a multi-component chain
    /// this is the length of the final reachable component.
    fn chain_minimum_length(&self, chain: NetHandle) -> usize;

    /// Returns the chain-local coordinate of a node's first position.
    fn prefix_sum(&self, node: NodeId) -> usize;

    /// Returns the chain component a node belongs to.
    fn chain_component(&self, node: NodeId) -> usize;

    /// Returns whether a node is traversed backwards relative to its chain.
    fn is_reversed_in_chain(&self, node: NodeId) -> bool;

    /// Returns the distance to leave a node's right side, turn around, and
    /// come back to it heading left.
    fn forward_loop(&self, node: NodeId) -> usize;

    /// Returns the distance to leave a node's left side, turn around, and
    /// come back to it heading right.
    fn reverse_loop(&self, node: NodeId) -> usize;

    /// Returns whether a chain's two ends meet at the same boundary node.
    fn is_looping_chain(&self, chain: NetHandle) -> bool;

    /// Returns the chain component of a chain's end bound.
    fn chain_end_component(&self, chain: NetHandle) -> usize;

    /// Returns the boundary node of a snarl on the given side.
    fn snarl_bound(&self, snarl: NetHandle, side: Side) -> NodeId;

    /// Returns a snarl's position within its parent chain.
    fn snarl_position(&self, snarl: NetHandle) -> SnarlPosition;

    /// Orders two children that share a chain coordinate, using the
    /// oracle's finer internal order. Returns `true` when `left` comes
    /// first. Must be antisymmetric for distinct handles.
    fn ordered_in_chain(&self, left: NetHandle, right: NetHandle) -> bool;

    /// Returns the minimum distance, confined to `snarl`, between the
    /// `a_side` bound position of child `a` and the `b_side` bound position
    /// of child `b`.
    fn distance_between_children(
        &self,
        snarl: NetHandle,
        a: NetHandle,
        a_side: Side,
        b: NetHandle,
        b_side: Side,
    ) -> usize;

    /// Returns the minimum distance, confined to `snarl`, between the
    /// `child_side` bound position of `child` and the snarl's own
    /// `snarl_side` bound position.
    fn distance_to_bound(
        &self,
        snarl: NetHandle,
        child: NetHandle,
        child_side: Side,
        snarl_side: Side,
    ) -> usize;
}

/// Read-only handle access to the variation graph.
///
/// Clustering needs the graph only to resolve a seed's node length when the
/// seed's cached decomposition facts are absent.
pub trait SequenceGraph {
    /// Returns the sequence length of a node, or `None` when the graph does
    /// not contain it.
    fn node_length(&self, node: NodeId) -> Option<usize>;

    /// Returns whether the graph contains a node.
    #[must_use]
    fn has_node(&self, node: NodeId) -> bool {
        self.node_length(node).is_some()
    }
}
