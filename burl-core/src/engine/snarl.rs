//! Snarl clustering: pairwise combination of a snarl's child chains.
//!
//! A snarl imposes no linear order between non-adjacent children, so every
//! pair of children is compared through the oracle's bound-to-bound
//! distances. Merging uses the best-bound test: a cluster joins the
//! combined set exactly when its own bound distance, plus the distance
//! between the bounds, plus the other child's best bound distance is within
//! the limit. With exact per-child minima this reproduces the transitive
//! closure of the pairwise threshold relation across the two children.
//! Snarls are small bubbles, so the quadratic pair loop is acceptable where
//! it would not be for chains.

use crate::{
    aggregate::MAX_READS,
    distance::{UNREACHABLE, is_reachable, sum, sum3},
    engine::SeedClusterer,
    net::{NetHandle, Side},
    oracle::{DistanceOracle, SequenceGraph},
    state::{ClusterState, ResolvedHead},
};

const SIDE_PAIRS: [(Side, Side); 4] = [
    (Side::Left, Side::Left),
    (Side::Left, Side::Right),
    (Side::Right, Side::Left),
    (Side::Right, Side::Right),
];

/// Snapshot of one child taken before any snarl-level merging, holding
/// child-level head distances and exact per-side bests.
struct ChildSnapshot {
    net: NetHandle,
    heads: Vec<ResolvedHead>,
    read_best_left: [usize; MAX_READS],
    read_best_right: [usize; MAX_READS],
    fragment_best_left: usize,
    fragment_best_right: usize,
}

impl ChildSnapshot {
    fn read_best(&self, side: Side, read: usize) -> usize {
        match side {
            Side::Left => self.read_best_left[read],
            Side::Right => self.read_best_right[read],
        }
    }

    fn fragment_best(&self, side: Side) -> usize {
        match side {
            Side::Left => self.fragment_best_left,
            Side::Right => self.fragment_best_right,
        }
    }
}

impl<'a, O: DistanceOracle, G: SequenceGraph> SeedClusterer<'a, O, G> {
    /// Clusters one snarl from its already-clustered children.
    pub(crate) fn cluster_snarl(
        &self,
        state: &mut ClusterState<'_>,
        snarl_idx: usize,
        children: &[usize],
    ) {
        let snapshots: Vec<ChildSnapshot> = children
            .iter()
            .map(|&child| {
                let heads = state.resolved_heads(child);
                let aggregate = &state.aggregates[child];
                ChildSnapshot {
                    net: aggregate.net,
                    heads,
                    read_best_left: aggregate.read_best_left,
                    read_best_right: aggregate.read_best_right,
                    fragment_best_left: aggregate.fragment_best_left,
                    fragment_best_right: aggregate.fragment_best_right,
                }
            })
            .collect();

        for (position, snapshot) in snapshots.iter().enumerate() {
            self.absorb_snarl_child(state, snarl_idx, snapshot);
            for earlier in &snapshots[..position] {
                self.combine_snarl_children(state, snarl_idx, snapshot, earlier);
            }
        }
    }

    /// Translates a child's clusters through the snarl's own bounds into
    /// the snarl aggregate.
    fn absorb_snarl_child(
        &self,
        state: &mut ClusterState<'_>,
        snarl_idx: usize,
        child: &ChildSnapshot,
    ) {
        let snarl_net = state.aggregates[snarl_idx].net;
        let left_left = self
            .oracle
            .distance_to_bound(snarl_net, child.net, Side::Left, Side::Left);
        let right_left = self
            .oracle
            .distance_to_bound(snarl_net, child.net, Side::Right, Side::Left);
        let left_right = self
            .oracle
            .distance_to_bound(snarl_net, child.net, Side::Left, Side::Right);
        let right_right = self
            .oracle
            .distance_to_bound(snarl_net, child.net, Side::Right, Side::Right);
        let fragment = state.fragment_enabled();

        for head in &child.heads {
            let left = sum(head.distance_left, left_left).min(sum(head.distance_right, right_left));
            let right =
                sum(head.distance_left, left_right).min(sum(head.distance_right, right_right));
            let root = state.find(head.read, head.seed);
            state.seed_mut(head.read, root).distance_left = left;
            state.seed_mut(head.read, root).distance_right = right;
            let aggregate = &mut state.aggregates[snarl_idx];
            aggregate.heads.insert((head.read, root));
            aggregate.record_read_best(head.read, left, right);
            if fragment {
                aggregate.record_fragment_best(left, right);
            }
        }
    }

    /// Compares two children of the snarl and combines clusters within the
    /// active limits.
    fn combine_snarl_children(
        &self,
        state: &mut ClusterState<'_>,
        snarl_idx: usize,
        a: &ChildSnapshot,
        b: &ChildSnapshot,
    ) {
        let snarl_net = state.aggregates[snarl_idx].net;
        let read_limit = state.read_distance_limit;
        let fragment_limit = state.fragment_distance_limit;

        for (a_side, b_side) in SIDE_PAIRS {
            let between = self
                .oracle
                .distance_between_children(snarl_net, a.net, a_side, b.net, b_side);
            if !is_reachable(between) {
                continue;
            }

            for read in 0..state.read_count() {
                let best_a = a.read_best(a_side, read);
                let best_b = b.read_best(b_side, read);
                if sum3(best_a, between, best_b) > read_limit {
                    continue;
                }
                let mut members: Vec<usize> = Vec::new();
                for head in a.heads.iter().filter(|head| head.read == read) {
                    if sum3(head.distance(a_side), between, best_b) <= read_limit {
                        members.push(head.seed);
                    }
                }
                for head in b.heads.iter().filter(|head| head.read == read) {
                    if sum3(head.distance(b_side), between, best_a) <= read_limit {
                        members.push(head.seed);
                    }
                }
                union_snarl_members(state, snarl_idx, read, &members);
            }

            if fragment_limit != 0 {
                let best_a = a.fragment_best(a_side);
                let best_b = b.fragment_best(b_side);
                if sum3(best_a, between, best_b) > fragment_limit {
                    continue;
                }
                let mut members: Vec<(usize, usize)> = Vec::new();
                for head in &a.heads {
                    if sum3(head.distance(a_side), between, best_b) <= fragment_limit {
                        members.push((head.read, head.seed));
                    }
                }
                for head in &b.heads {
                    if sum3(head.distance(b_side), between, best_a) <= fragment_limit {
                        members.push((head.read, head.seed));
                    }
                }
                state.union_fragment_members(&members);
            }
        }
    }
}

/// Unions a qualifying read-scoped set inside the snarl aggregate, keeping
/// the surviving representative's scratch distances at the member minima.
fn union_snarl_members(
    state: &mut ClusterState<'_>,
    snarl_idx: usize,
    read: usize,
    members: &[usize],
) {
    let mut roots: Vec<usize> = members
        .iter()
        .map(|&member| state.find(read, member))
        .collect();
    roots.sort_unstable();
    roots.dedup();
    if roots.len() < 2 {
        return;
    }
    let mut left = UNREACHABLE;
    let mut right = UNREACHABLE;
    for &root in &roots {
        left = left.min(state.seed(read, root).distance_left);
        right = right.min(state.seed(read, root).distance_right);
        state.aggregates[snarl_idx].heads.remove(&(read, root));
    }
    let mut combined = roots[0];
    for &root in &roots[1..] {
        combined = state.merge_pair(read, combined, root);
    }
    state.seed_mut(read, combined).distance_left = left;
    state.seed_mut(read, combined).distance_right = right;
    state.aggregates[snarl_idx].heads.insert((read, combined));
}
