//! Per-tree-node cluster aggregates and the parent→children maps.
//!
//! A [`NetAggregate`] summarises the clusters currently sitting on one
//! decomposition-tree node: the union-find heads, the best boundary
//! distances per read and for the fragment union, and the structural facts
//! the parent level needs. Aggregates live in a growable arena inside the
//! tree state and are referenced by index everywhere, never by address;
//! each one is created when its tree node is first populated and is dead
//! once the parent has consumed it.

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
};

use crate::{
    distance::{UNREACHABLE, sum, sum3},
    net::{NetHandle, Side},
    oracle::DistanceOracle,
    seed::NodeFacts,
};

/// Maximum number of reads per fragment (paired-end input).
pub(crate) const MAX_READS: usize = 2;

/// Cluster summary for one decomposition-tree node.
#[derive(Clone, Debug)]
pub(crate) struct NetAggregate {
    pub(crate) net: NetHandle,
    /// Current union-find representatives, tagged by read index.
    pub(crate) heads: HashSet<(usize, usize)>,
    pub(crate) read_best_left: [usize; MAX_READS],
    pub(crate) read_best_right: [usize; MAX_READS],
    pub(crate) fragment_best_left: usize,
    pub(crate) fragment_best_right: usize,
    /// Minimum traversable length; for chains, the final-component length.
    pub(crate) min_length: usize,
    /// Parent-chain coordinate of the left reference position.
    pub(crate) offset_left: usize,
    /// Parent-chain coordinate of the right reference position.
    pub(crate) offset_right: usize,
    pub(crate) component_start: usize,
    pub(crate) component_end: usize,
    /// Cost of leaving through the left bound and coming back heading
    /// right; only meaningful for snarls.
    pub(crate) loop_left: usize,
    /// Cost of leaving through the right bound and coming back heading
    /// left; only meaningful for snarls.
    pub(crate) loop_right: usize,
    pub(crate) root_component: usize,
    pub(crate) is_trivial_chain: bool,
    pub(crate) is_looping_chain: bool,
}

impl NetAggregate {
    fn empty(net: NetHandle) -> Self {
        Self {
            net,
            heads: HashSet::new(),
            read_best_left: [UNREACHABLE; MAX_READS],
            read_best_right: [UNREACHABLE; MAX_READS],
            fragment_best_left: UNREACHABLE,
            fragment_best_right: UNREACHABLE,
            min_length: UNREACHABLE,
            offset_left: 0,
            offset_right: 0,
            component_start: 0,
            component_end: 0,
            loop_left: UNREACHABLE,
            loop_right: UNREACHABLE,
            root_component: 0,
            is_trivial_chain: false,
            is_looping_chain: false,
        }
    }

    /// Aggregate for a graph node acting as its own (trivial) chain.
    pub(crate) fn for_node(net: NetHandle, facts: &NodeFacts) -> Self {
        let mut agg = Self::empty(net);
        agg.min_length = facts.node_length;
        agg.offset_left = facts.prefix_sum;
        agg.offset_right = sum(facts.prefix_sum, facts.node_length.saturating_sub(1));
        agg.component_start = facts.chain_component;
        agg.component_end = facts.chain_component;
        agg.root_component = facts.root_component;
        agg.is_trivial_chain = true;
        agg
    }

    /// Aggregate for a chain, with its end-of-chain facts resolved.
    pub(crate) fn for_chain<O: DistanceOracle>(net: NetHandle, oracle: &O) -> Self {
        let mut agg = Self::empty(net);
        agg.min_length = oracle.chain_minimum_length(net);
        agg.component_end = oracle.chain_end_component(net);
        agg.root_component = oracle.root_component(net);
        agg.is_looping_chain = oracle.is_looping_chain(net);
        agg
    }

    /// Aggregate for a snarl, positioned within its parent chain.
    pub(crate) fn for_snarl<O: DistanceOracle>(net: NetHandle, oracle: &O) -> Self {
        let mut agg = Self::empty(net);
        let position = oracle.snarl_position(net);
        agg.min_length = oracle.minimum_length(net);
        agg.offset_left = position.left_offset;
        agg.offset_right = position.right_offset;
        agg.component_start = position.start_component;
        agg.component_end = position.end_component;
        agg.root_component = oracle.root_component(net);
        agg.loop_left = bound_loop(oracle, net, Side::Left);
        agg.loop_right = bound_loop(oracle, net, Side::Right);
        agg
    }

    /// Returns the best fragment-scoped distance to the given side.
    pub(crate) fn fragment_best(&self, side: Side) -> usize {
        match side {
            Side::Left => self.fragment_best_left,
            Side::Right => self.fragment_best_right,
        }
    }

    /// Lowers the per-read best boundary distances; bests never re-increase.
    pub(crate) fn record_read_best(&mut self, read: usize, left: usize, right: usize) {
        self.read_best_left[read] = self.read_best_left[read].min(left);
        self.read_best_right[read] = self.read_best_right[read].min(right);
    }

    /// Lowers the fragment-scoped best boundary distances.
    pub(crate) fn record_fragment_best(&mut self, left: usize, right: usize) {
        self.fragment_best_left = self.fragment_best_left.min(left);
        self.fragment_best_right = self.fragment_best_right.min(right);
    }
}

/// U-turn cost just outside a snarl bound: the bound node's loop value plus
/// a double traversal of the bound node itself.
fn bound_loop<O: DistanceOracle>(oracle: &O, snarl: NetHandle, side: Side) -> usize {
    let bound = oracle.snarl_bound(snarl, side);
    let Some(bound_net) = oracle.node_net(bound) else {
        return UNREACHABLE;
    };
    let crossing = oracle.minimum_length(bound_net).saturating_sub(1);
    let turn = match side {
        Side::Left => oracle.reverse_loop(bound),
        Side::Right => oracle.forward_loop(bound),
    };
    sum3(turn, crossing, crossing)
}

/// What a chain child is: a bare seed on one of the chain's nodes, or an
/// already-clustered aggregate (a snarl) by arena index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ChildPayload {
    Seed { read: usize, seed: usize },
    Aggregate(usize),
}

/// One child of a chain, carrying everything the chain scan needs to order
/// and fold it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChainChild {
    pub(crate) net: NetHandle,
    pub(crate) payload: ChildPayload,
    pub(crate) component: usize,
    /// Chain coordinate used for ordering: a seed's position, or a snarl's
    /// left bound position.
    pub(crate) offset: usize,
}

/// The children recorded for one parent, plus the flag enabling the linear
/// fast path when every child is a bare seed.
#[derive(Clone, Debug)]
pub(crate) struct ChildList {
    pub(crate) only_seeds: bool,
    pub(crate) children: Vec<ChainChild>,
}

/// Groups decomposition-tree children by their parent aggregate for one
/// tree depth.
#[derive(Clone, Debug, Default)]
pub(crate) struct ChildMap {
    parents: HashMap<usize, ChildList>,
}

impl ChildMap {
    pub(crate) fn add_child(&mut self, parent: usize, child: ChainChild) {
        let is_seed = matches!(child.payload, ChildPayload::Seed { .. });
        let list = self.parents.entry(parent).or_insert_with(|| ChildList {
            only_seeds: true,
            children: Vec::new(),
        });
        list.only_seeds = list.only_seeds && is_seed;
        list.children.push(child);
    }

    /// Drains the map into (parent, children) pairs in a deterministic
    /// order.
    pub(crate) fn take(&mut self) -> Vec<(usize, ChildList)> {
        let mut entries: Vec<(usize, ChildList)> = self.parents.drain().collect();
        entries.sort_by_key(|(parent, _)| *parent);
        entries
    }
}

/// Sorts chain children into the total order the chain merge depends on:
/// by chain component, then position offset, with the oracle's finer
/// ordering as the tie-break for distinct handles at one offset.
pub(crate) fn sort_children<O: DistanceOracle>(children: &mut [ChainChild], oracle: &O) {
    children.sort_by(|a, b| {
        a.component
            .cmp(&b.component)
            .then_with(|| a.offset.cmp(&b.offset))
            .then_with(|| {
                if a.net == b.net {
                    Ordering::Equal
                } else if oracle.ordered_in_chain(a.net, b.net) {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            })
    });
}
