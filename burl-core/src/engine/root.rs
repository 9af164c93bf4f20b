//! Root clustering: the final pass over top-level aggregates.
//!
//! The root is a synthetic container with no enclosing boundary, so there
//! is no oracle query connecting two top-level chains; under a read-scoped
//! limit distinct root children never merge. The pass exists to perform the
//! one case that does apply to paired input: with a fragment limit set,
//! children sharing a root component are compared pairwise using only their
//! own best boundary distances, in the fragment union alone.

use std::collections::HashMap;

use crate::{
    distance::sum,
    engine::SeedClusterer,
    net::Side,
    oracle::{DistanceOracle, SequenceGraph},
    state::ClusterState,
};

const SIDE_PAIRS: [(Side, Side); 4] = [
    (Side::Left, Side::Left),
    (Side::Left, Side::Right),
    (Side::Right, Side::Left),
    (Side::Right, Side::Right),
];

impl<'a, O: DistanceOracle, G: SequenceGraph> SeedClusterer<'a, O, G> {
    /// Runs the fragment-only merge over the root's children.
    pub(crate) fn cluster_root(&self, state: &mut ClusterState<'_>) {
        if !state.fragment_enabled() || state.root_children.len() < 2 {
            return;
        }
        let fragment_limit = state.fragment_distance_limit;

        let mut by_component: HashMap<usize, Vec<usize>> = HashMap::new();
        for &child in &state.root_children {
            let component = state.aggregates[child].root_component;
            by_component.entry(component).or_default().push(child);
        }
        let mut groups: Vec<(usize, Vec<usize>)> = by_component.into_iter().collect();
        groups.sort_by_key(|(component, _)| *component);

        for (_, mut members) in groups {
            members.sort_unstable();
            for (position, &a) in members.iter().enumerate() {
                for &b in &members[..position] {
                    self.combine_root_children(state, a, b, fragment_limit);
                }
            }
        }
    }

    /// Compares two same-component root children using only their own best
    /// boundary distances.
    fn combine_root_children(
        &self,
        state: &mut ClusterState<'_>,
        a: usize,
        b: usize,
        fragment_limit: usize,
    ) {
        for (a_side, b_side) in SIDE_PAIRS {
            let best_a = state.aggregates[a].fragment_best(a_side);
            let best_b = state.aggregates[b].fragment_best(b_side);
            if sum(best_a, best_b) > fragment_limit {
                continue;
            }
            let heads_a = state.resolved_heads(a);
            let heads_b = state.resolved_heads(b);
            let mut members: Vec<(usize, usize)> = Vec::new();
            for head in &heads_a {
                if sum(head.distance(a_side), best_b) <= fragment_limit {
                    members.push((head.read, head.seed));
                }
            }
            for head in &heads_b {
                if sum(head.distance(b_side), best_a) <= fragment_limit {
                    members.push((head.read, head.seed));
                }
            }
            state.union_fragment_members(&members);
        }
    }
}
