//! Shared test fixtures for `burl-core`.
//!
//! [`Fixture`] is a hand-built decomposition implementing both consumed
//! traits, with constructors for the shapes the engine tests exercise: a
//! lone node, a linear chain, a broken (multi-component) chain, a snarl
//! bubble with two trivial children, and a chain with a nested snarl.
//! Distances follow the oracle's coordinate contract exactly, so the
//! expected cluster partitions in the tests can be computed by hand.

use std::collections::{HashMap, HashSet};

use burl_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;

use crate::{
    distance::UNREACHABLE,
    net::{NetHandle, NetKind, NodeId, Side},
    oracle::{DistanceOracle, SequenceGraph, SnarlPosition},
};

/// Builds a standard proptest configuration from the shared run profile so
/// every property suite honours the same `BURL_PBT_*` environment knobs.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

pub(crate) fn node_net(node: NodeId) -> NetHandle {
    NetHandle::new(NetKind::Node, node)
}

pub(crate) fn chain_net(chain: u64) -> NetHandle {
    NetHandle::new(NetKind::Chain, chain)
}

pub(crate) fn snarl_net(snarl: u64) -> NetHandle {
    NetHandle::new(NetKind::Snarl, snarl)
}

/// Hand-built decomposition fixture.
#[derive(Debug, Default)]
pub(crate) struct Fixture {
    node_lengths: HashMap<NodeId, usize>,
    node_parent: HashMap<NodeId, NetHandle>,
    node_prefix: HashMap<NodeId, usize>,
    node_component: HashMap<NodeId, usize>,
    node_reversed: HashSet<NodeId>,
    forward_loops: HashMap<NodeId, usize>,
    reverse_loops: HashMap<NodeId, usize>,
    chain_parent: HashMap<u64, NetHandle>,
    chain_min_length: HashMap<u64, usize>,
    chain_end_component: HashMap<u64, usize>,
    looping_chains: HashSet<u64>,
    snarl_parent: HashMap<u64, NetHandle>,
    snarl_min_length: HashMap<u64, usize>,
    snarl_positions: HashMap<u64, SnarlPosition>,
    snarl_bounds: HashMap<u64, (NodeId, NodeId)>,
    child_distances: HashMap<(u64, NetHandle, Side, NetHandle, Side), usize>,
    bound_distances: HashMap<(u64, NetHandle, Side, Side), usize>,
    depths: HashMap<NetHandle, usize>,
    root_components: HashMap<NetHandle, usize>,
    ranks: HashMap<NetHandle, usize>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A lone node hanging off the root as its own trivial chain.
    pub(crate) fn single_node(node: NodeId, length: usize) -> Self {
        let mut fixture = Self::new();
        fixture.add_root_node(node, length);
        fixture
    }

    /// One top-level chain of directly adjacent nodes.
    pub(crate) fn linear_chain(chain: u64, nodes: &[(NodeId, usize)]) -> Self {
        let mut fixture = Self::new();
        fixture.add_top_chain(chain);
        let mut prefix = 0;
        for (rank, &(node, length)) in nodes.iter().enumerate() {
            fixture.add_chain_node(chain, node, length, prefix, 0);
            fixture.ranks.insert(node_net(node), rank);
            prefix += length;
        }
        fixture.chain_min_length.insert(chain, prefix);
        fixture
    }

    /// A chain broken into components; coordinates restart per segment and
    /// the chain length is the final segment's.
    pub(crate) fn broken_chain(chain: u64, segments: &[&[(NodeId, usize)]]) -> Self {
        let mut fixture = Self::new();
        fixture.add_top_chain(chain);
        let mut rank = 0;
        let mut last_len = 0;
        for (component, segment) in segments.iter().enumerate() {
            let mut prefix = 0;
            for &(node, length) in *segment {
                fixture.add_chain_node(chain, node, length, prefix, component);
                fixture.ranks.insert(node_net(node), rank);
                rank += 1;
                prefix += length;
            }
            last_len = prefix;
        }
        fixture.chain_min_length.insert(chain, last_len);
        fixture
            .chain_end_component
            .insert(chain, segments.len().saturating_sub(1));
        fixture
    }

    /// Scenario geometry from the snarl bubble: top chain `1` holds nodes
    /// `1` and `2` (length 10 each) around snarl `1` (minimum length 5);
    /// the snarl holds trivial nodes `10` and `11` (length 7 each), whose
    /// facing bounds sit 4 bases apart.
    pub(crate) fn snarl_bubble() -> Self {
        let mut fixture = Self::new();
        fixture.add_top_chain(1);
        fixture.add_chain_node(1, 1, 10, 0, 0);
        fixture.add_chain_node(1, 2, 10, 14, 0);
        fixture.chain_min_length.insert(1, 24);
        fixture.add_snarl(
            1,
            1,
            (1, 2),
            5,
            SnarlPosition {
                left_offset: 9,
                right_offset: 14,
                start_component: 0,
                end_component: 0,
            },
        );
        fixture.add_snarl_node(1, 10, 7);
        fixture.add_snarl_node(1, 11, 7);
        fixture.set_child_distance(1, node_net(10), Side::Right, node_net(11), Side::Left, 4);
        fixture.set_bound_distance(1, node_net(10), Side::Left, Side::Left, 1);
        fixture.set_bound_distance(1, node_net(10), Side::Right, Side::Right, 11);
        fixture.set_bound_distance(1, node_net(11), Side::Left, Side::Left, 11);
        fixture.set_bound_distance(1, node_net(11), Side::Right, Side::Right, 1);
        fixture.ranks.insert(node_net(1), 0);
        fixture.ranks.insert(snarl_net(1), 1);
        fixture.ranks.insert(node_net(2), 2);
        fixture
    }

    /// A chain mixing seed and snarl children: nodes `1` and `2` (length 10
    /// each) around snarl `1` (minimum length 4) holding trivial node `10`
    /// (length 7, one base in from each bound).
    pub(crate) fn chain_with_snarl() -> Self {
        let mut fixture = Self::new();
        fixture.add_top_chain(1);
        fixture.add_chain_node(1, 1, 10, 0, 0);
        fixture.add_chain_node(1, 2, 10, 13, 0);
        fixture.chain_min_length.insert(1, 23);
        fixture.add_snarl(
            1,
            1,
            (1, 2),
            4,
            SnarlPosition {
                left_offset: 9,
                right_offset: 13,
                start_component: 0,
                end_component: 0,
            },
        );
        fixture.add_snarl_node(1, 10, 7);
        fixture.set_bound_distance(1, node_net(10), Side::Left, Side::Left, 1);
        fixture.set_bound_distance(1, node_net(10), Side::Right, Side::Right, 1);
        fixture.ranks.insert(node_net(1), 0);
        fixture.ranks.insert(snarl_net(1), 1);
        fixture.ranks.insert(node_net(2), 2);
        fixture
    }

    pub(crate) fn add_root_node(&mut self, node: NodeId, length: usize) {
        self.node_lengths.insert(node, length);
        self.node_parent.insert(node, NetHandle::root());
        self.depths.insert(node_net(node), 1);
    }

    pub(crate) fn add_top_chain(&mut self, chain: u64) {
        self.chain_parent.insert(chain, NetHandle::root());
        self.depths.insert(chain_net(chain), 1);
    }

    pub(crate) fn add_chain_node(
        &mut self,
        chain: u64,
        node: NodeId,
        length: usize,
        prefix: usize,
        component: usize,
    ) {
        self.node_lengths.insert(node, length);
        self.node_parent.insert(node, chain_net(chain));
        self.node_prefix.insert(node, prefix);
        self.node_component.insert(node, component);
        let depth = self.depths.get(&chain_net(chain)).copied().unwrap_or(1);
        self.depths.insert(node_net(node), depth);
    }

    pub(crate) fn add_snarl(
        &mut self,
        snarl: u64,
        chain: u64,
        bounds: (NodeId, NodeId),
        min_length: usize,
        position: SnarlPosition,
    ) {
        self.snarl_parent.insert(snarl, chain_net(chain));
        self.snarl_min_length.insert(snarl, min_length);
        self.snarl_positions.insert(snarl, position);
        self.snarl_bounds.insert(snarl, bounds);
        let depth = self.depths.get(&chain_net(chain)).copied().unwrap_or(1);
        self.depths.insert(snarl_net(snarl), depth);
    }

    /// Adds a node directly inside a snarl, acting as a trivial chain one
    /// level below it.
    pub(crate) fn add_snarl_node(&mut self, snarl: u64, node: NodeId, length: usize) {
        self.node_lengths.insert(node, length);
        self.node_parent.insert(node, snarl_net(snarl));
        let depth = self.depths.get(&snarl_net(snarl)).copied().unwrap_or(1);
        self.depths.insert(node_net(node), depth + 1);
    }

    pub(crate) fn set_looping(&mut self, chain: u64) {
        self.looping_chains.insert(chain);
    }

    pub(crate) fn set_reversed_in_chain(&mut self, node: NodeId) {
        self.node_reversed.insert(node);
    }

    /// Records a symmetric bound-to-bound distance between two snarl
    /// children.
    pub(crate) fn set_child_distance(
        &mut self,
        snarl: u64,
        a: NetHandle,
        a_side: Side,
        b: NetHandle,
        b_side: Side,
        distance: usize,
    ) {
        self.child_distances
            .insert((snarl, a, a_side, b, b_side), distance);
        self.child_distances
            .insert((snarl, b, b_side, a, a_side), distance);
    }

    pub(crate) fn set_bound_distance(
        &mut self,
        snarl: u64,
        child: NetHandle,
        child_side: Side,
        snarl_side: Side,
        distance: usize,
    ) {
        self.bound_distances
            .insert((snarl, child, child_side, snarl_side), distance);
    }

    fn rank_of(&self, net: NetHandle) -> usize {
        self.ranks.get(&net).copied().unwrap_or(net.id() as usize)
    }
}

impl DistanceOracle for Fixture {
    fn node_net(&self, node: NodeId) -> Option<NetHandle> {
        self.node_lengths.contains_key(&node).then(|| node_net(node))
    }

    fn parent(&self, net: NetHandle) -> NetHandle {
        match net.kind() {
            NetKind::Node => self
                .node_parent
                .get(&net.id())
                .copied()
                .unwrap_or_else(NetHandle::root),
            NetKind::Chain => self
                .chain_parent
                .get(&net.id())
                .copied()
                .unwrap_or_else(NetHandle::root),
            NetKind::Snarl => self
                .snarl_parent
                .get(&net.id())
                .copied()
                .unwrap_or_else(NetHandle::root),
            NetKind::Root => NetHandle::root(),
        }
    }

    fn depth(&self, net: NetHandle) -> usize {
        self.depths.get(&net).copied().unwrap_or(1)
    }

    fn root_component(&self, net: NetHandle) -> usize {
        self.root_components.get(&net).copied().unwrap_or(0)
    }

    fn minimum_length(&self, net: NetHandle) -> usize {
        match net.kind() {
            NetKind::Node => self.node_lengths.get(&net.id()).copied().unwrap_or(0),
            NetKind::Snarl => self
                .snarl_min_length
                .get(&net.id())
                .copied()
                .unwrap_or(UNREACHABLE),
            NetKind::Chain => self.chain_minimum_length(net),
            NetKind::Root => UNREACHABLE,
        }
    }

    fn chain_minimum_length(&self, chain: NetHandle) -> usize {
        self.chain_min_length
            .get(&chain.id())
            .copied()
            .unwrap_or(UNREACHABLE)
    }

    fn prefix_sum(&self, node: NodeId) -> usize {
        self.node_prefix.get(&node).copied().unwrap_or(0)
    }

    fn chain_component(&self, node: NodeId) -> usize {
        self.node_component.get(&node).copied().unwrap_or(0)
    }

    fn is_reversed_in_chain(&self, node: NodeId) -> bool {
        self.node_reversed.contains(&node)
    }

    fn forward_loop(&self, node: NodeId) -> usize {
        self.forward_loops.get(&node).copied().unwrap_or(UNREACHABLE)
    }

    fn reverse_loop(&self, node: NodeId) -> usize {
        self.reverse_loops.get(&node).copied().unwrap_or(UNREACHABLE)
    }

    fn is_looping_chain(&self, chain: NetHandle) -> bool {
        self.looping_chains.contains(&chain.id())
    }

    fn chain_end_component(&self, chain: NetHandle) -> usize {
        self.chain_end_component
            .get(&chain.id())
            .copied()
            .unwrap_or(0)
    }

    fn snarl_bound(&self, snarl: NetHandle, side: Side) -> NodeId {
        let (start, end) = self.snarl_bounds.get(&snarl.id()).copied().unwrap_or((0, 0));
        match side {
            Side::Left => start,
            Side::Right => end,
        }
    }

    fn snarl_position(&self, snarl: NetHandle) -> SnarlPosition {
        self.snarl_positions
            .get(&snarl.id())
            .copied()
            .unwrap_or(SnarlPosition {
                left_offset: 0,
                right_offset: 0,
                start_component: 0,
                end_component: 0,
            })
    }

    fn ordered_in_chain(&self, left: NetHandle, right: NetHandle) -> bool {
        self.rank_of(left) < self.rank_of(right)
    }

    fn distance_between_children(
        &self,
        snarl: NetHandle,
        a: NetHandle,
        a_side: Side,
        b: NetHandle,
        b_side: Side,
    ) -> usize {
        self.child_distances
            .get(&(snarl.id(), a, a_side, b, b_side))
            .copied()
            .unwrap_or(UNREACHABLE)
    }

    fn distance_to_bound(
        &self,
        snarl: NetHandle,
        child: NetHandle,
        child_side: Side,
        snarl_side: Side,
    ) -> usize {
        self.bound_distances
            .get(&(snarl.id(), child, child_side, snarl_side))
            .copied()
            .unwrap_or(UNREACHABLE)
    }
}

impl SequenceGraph for Fixture {
    fn node_length(&self, node: NodeId) -> Option<usize> {
        self.node_lengths.get(&node).copied()
    }
}
