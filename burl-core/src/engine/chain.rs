//! Chain clustering: one left-to-right fold over a chain's children.
//!
//! Children (bare seeds on the chain's nodes, and already-clustered snarls)
//! arrive in their precomputed total order. The scan carries the previous
//! child's right reference coordinate and component; every retained cluster
//! head keeps, in its scratch right-distance, its trailing distance to that
//! reference. A component break makes every trailing distance unreachable,
//! so no merge ever crosses it. After the scan the trailing distances are
//! finalised against the chain's end, and a looping chain gets one
//! wraparound pass between its first and last retained clusters.

use crate::{
    aggregate::{ChainChild, ChildPayload},
    distance::{UNREACHABLE, sum, sum3},
    engine::{SeedClusterer, linear},
    oracle::{DistanceOracle, SequenceGraph},
    state::{ClusterState, ResolvedHead},
};

struct ChainScan {
    started: bool,
    /// Chain coordinate of the previous child's right reference.
    last_right_offset: usize,
    /// Component the previous child ended in.
    last_component: usize,
}

/// A snarl cluster translated into its chain-level placement.
struct PlacedHead {
    read: usize,
    seed: usize,
    /// Distance to the snarl's left bound, directly or around the far end.
    to_left_bound: usize,
    /// Trailing distance to the snarl's right bound.
    trailing: usize,
    /// Distance to the chain's start position.
    chain_left: usize,
}

impl<'a, O: DistanceOracle, G: SequenceGraph> SeedClusterer<'a, O, G> {
    /// Clusters one chain from its sorted children.
    ///
    /// Chains whose children are all seeds in a single component bypass the
    /// general fold and run the linear scan directly on chain coordinates.
    pub(crate) fn cluster_chain(
        &self,
        state: &mut ClusterState<'_>,
        chain_idx: usize,
        children: &[ChainChild],
        only_seeds: bool,
    ) {
        let chain = &state.aggregates[chain_idx];
        let length = chain.min_length;
        let looping = chain.is_looping_chain;
        let linear_ok = only_seeds
            && chain.component_end == 0
            && children.iter().all(|child| child.component == 0);

        if linear_ok {
            linear::cluster_linear(state, chain_idx, children, length, |child| {
                match child.payload {
                    ChildPayload::Seed { read, seed } => linear::LinearItem {
                        read,
                        seed,
                        offset: child.offset,
                    },
                    ChildPayload::Aggregate(_) => {
                        unreachable!("linear chains hold only seed children")
                    }
                }
            });
        } else {
            let mut scan = ChainScan {
                started: false,
                last_right_offset: 0,
                last_component: 0,
            };
            for child in children {
                match child.payload {
                    ChildPayload::Seed { read, seed } => {
                        self.add_seed_to_chain(state, chain_idx, &mut scan, read, seed, child);
                    }
                    ChildPayload::Aggregate(snarl) => {
                        self.add_snarl_to_chain(state, chain_idx, &mut scan, snarl, child);
                    }
                }
            }
            finish_chain(state, chain_idx, &scan);
        }

        if looping {
            self.merge_chain_wraparound(state, chain_idx);
        }
        record_chain_bests(state, chain_idx);
    }

    /// Opens the next child: detects component breaks and returns the gap
    /// from the previous right reference to the child's left reference, or
    /// `None` when no merge across is possible.
    fn begin_child(
        &self,
        state: &mut ClusterState<'_>,
        chain_idx: usize,
        scan: &ChainScan,
        component: usize,
        left_offset: usize,
    ) -> Option<usize> {
        if !scan.started {
            return None;
        }
        if component != scan.last_component {
            break_chain_components(state, chain_idx);
            return None;
        }
        Some(left_offset.saturating_sub(scan.last_right_offset))
    }

    /// Folds one bare seed into the chain clusters.
    fn add_seed_to_chain(
        &self,
        state: &mut ClusterState<'_>,
        chain_idx: usize,
        scan: &mut ChainScan,
        read: usize,
        seed: usize,
        child: &ChainChild,
    ) {
        let read_limit = state.read_distance_limit;
        let fragment_limit = state.fragment_distance_limit;
        let offset = child.offset;
        let gap = self.begin_child(state, chain_idx, scan, child.component, offset);

        let mut new_head = seed;
        let mut combined_left = if child.component == 0 {
            offset
        } else {
            UNREACHABLE
        };

        if let Some(gap) = gap {
            let heads = state.resolved_heads(chain_idx);
            for head in heads {
                let reach = sum(head.distance_right, gap);
                if head.read == read && reach <= read_limit {
                    combined_left = combined_left.min(head.distance_left);
                    state.aggregates[chain_idx].heads.remove(&(read, head.seed));
                    new_head = state.merge_pair(read, new_head, head.seed);
                } else if fragment_limit != 0 && reach <= fragment_limit {
                    state.merge_fragment(head.read, head.seed, read, seed);
                }
            }
            advance_trailing(state, chain_idx, gap);
        }

        state.seed_mut(read, new_head).distance_left = combined_left;
        state.seed_mut(read, new_head).distance_right = 0;
        state.aggregates[chain_idx].heads.insert((read, new_head));

        scan.started = true;
        scan.last_right_offset = offset;
        scan.last_component = child.component;
    }

    /// Folds an already-clustered snarl into the chain clusters.
    fn add_snarl_to_chain(
        &self,
        state: &mut ClusterState<'_>,
        chain_idx: usize,
        scan: &mut ChainScan,
        snarl_idx: usize,
        child: &ChainChild,
    ) {
        let read_limit = state.read_distance_limit;
        let fragment_limit = state.fragment_distance_limit;
        let snarl = &state.aggregates[snarl_idx];
        let left_offset = snarl.offset_left;
        let right_offset = snarl.offset_right;
        let end_component = snarl.component_end;
        let component_start = snarl.component_start;
        let crosses_break = end_component != component_start;
        let through = if crosses_break {
            UNREACHABLE
        } else {
            snarl.min_length
        };
        let loop_left = snarl.loop_left;
        let loop_right = snarl.loop_right;

        let snarl_heads = state.resolved_heads(snarl_idx);
        let placed: Vec<PlacedHead> = snarl_heads
            .iter()
            .map(|head| {
                let to_left_bound = head
                    .distance_left
                    .min(sum3(head.distance_right, loop_right, through));
                let trailing = head
                    .distance_right
                    .min(sum3(head.distance_left, loop_left, through));
                let chain_left = if component_start == 0 {
                    sum(left_offset, to_left_bound)
                } else {
                    UNREACHABLE
                };
                PlacedHead {
                    read: head.read,
                    seed: head.seed,
                    to_left_bound,
                    trailing,
                    chain_left,
                }
            })
            .collect();

        let gap = self.begin_child(state, chain_idx, scan, child.component, left_offset);
        let mut absorbed: Vec<(usize, usize)> = Vec::new();
        let mut pending: Vec<(usize, usize, usize, usize)> = Vec::new();

        if let Some(gap) = gap {
            let chain_heads = state.resolved_heads(chain_idx);
            for read in 0..state.read_count() {
                let best_trailing = chain_heads
                    .iter()
                    .filter(|head| head.read == read)
                    .map(|head| head.distance_right)
                    .min()
                    .unwrap_or(UNREACHABLE);
                let best_entry = placed
                    .iter()
                    .filter(|head| head.read == read)
                    .map(|head| head.to_left_bound)
                    .min()
                    .unwrap_or(UNREACHABLE);
                if sum3(best_trailing, gap, best_entry) > read_limit {
                    continue;
                }
                let mut members: Vec<usize> = Vec::new();
                let mut absorbed_here: Vec<(usize, usize)> = Vec::new();
                let mut combined_left = UNREACHABLE;
                let mut combined_trailing = UNREACHABLE;
                for head in chain_heads.iter().filter(|head| head.read == read) {
                    if sum3(head.distance_right, gap, best_entry) <= read_limit {
                        members.push(head.seed);
                        combined_left = combined_left.min(head.distance_left);
                        combined_trailing =
                            combined_trailing.min(sum3(head.distance_right, gap, through));
                    }
                }
                for head in placed.iter().filter(|head| head.read == read) {
                    if sum3(head.to_left_bound, gap, best_trailing) <= read_limit {
                        members.push(head.seed);
                        combined_left = combined_left.min(head.chain_left);
                        combined_trailing = combined_trailing.min(head.trailing);
                        absorbed_here.push((read, head.seed));
                    }
                }
                if members.len() < 2 {
                    continue;
                }
                absorbed.extend(absorbed_here);
                for &member in &members {
                    state.aggregates[chain_idx].heads.remove(&(read, member));
                }
                let mut root = members[0];
                for &member in &members[1..] {
                    root = state.merge_pair(read, root, member);
                }
                pending.push((read, root, combined_left, combined_trailing));
            }

            if fragment_limit != 0 {
                let best_trailing = chain_heads
                    .iter()
                    .map(|head| head.distance_right)
                    .min()
                    .unwrap_or(UNREACHABLE);
                let best_entry = placed
                    .iter()
                    .map(|head| head.to_left_bound)
                    .min()
                    .unwrap_or(UNREACHABLE);
                if sum3(best_trailing, gap, best_entry) <= fragment_limit {
                    let mut members: Vec<(usize, usize)> = Vec::new();
                    for head in &chain_heads {
                        if sum3(head.distance_right, gap, best_entry) <= fragment_limit {
                            members.push((head.read, head.seed));
                        }
                    }
                    for head in &placed {
                        if sum3(head.to_left_bound, gap, best_trailing) <= fragment_limit {
                            members.push((head.read, head.seed));
                        }
                    }
                    state.union_fragment_members(&members);
                }
            }

            let delta = sum(gap, through);
            advance_trailing(state, chain_idx, delta);
        }

        for head in &placed {
            if absorbed.contains(&(head.read, head.seed)) {
                continue;
            }
            let root = state.find(head.read, head.seed);
            state.seed_mut(head.read, root).distance_left = head.chain_left;
            state.seed_mut(head.read, root).distance_right = head.trailing;
            state.aggregates[chain_idx].heads.insert((head.read, root));
        }
        for (read, root, left, trailing) in pending {
            state.seed_mut(read, root).distance_left = left;
            state.seed_mut(read, root).distance_right = trailing;
            state.aggregates[chain_idx].heads.insert((read, root));
        }

        scan.started = true;
        scan.last_right_offset = right_offset;
        scan.last_component = end_component;
    }

    /// Attempts the single wraparound merge of a looping chain, strictly
    /// after the linear pass: first and last retained clusters connect
    /// through the shared boundary, at their right plus left end distances.
    fn merge_chain_wraparound(&self, state: &mut ClusterState<'_>, chain_idx: usize) {
        let read_limit = state.read_distance_limit;
        let fragment_limit = state.fragment_distance_limit;

        for read in 0..state.read_count() {
            let heads: Vec<ResolvedHead> = state
                .resolved_heads(chain_idx)
                .into_iter()
                .filter(|head| head.read == read)
                .collect();
            if heads.len() < 2 {
                continue;
            }
            let best_left = heads
                .iter()
                .map(|head| head.distance_left)
                .min()
                .unwrap_or(UNREACHABLE);
            let best_right = heads
                .iter()
                .map(|head| head.distance_right)
                .min()
                .unwrap_or(UNREACHABLE);
            if sum(best_right, best_left) > read_limit {
                continue;
            }
            let mut members: Vec<usize> = Vec::new();
            let mut combined_left = UNREACHABLE;
            let mut combined_right = UNREACHABLE;
            for head in &heads {
                let wrap = sum(head.distance_right, best_left).min(sum(head.distance_left, best_right));
                if wrap <= read_limit {
                    members.push(head.seed);
                    combined_left = combined_left.min(head.distance_left);
                    combined_right = combined_right.min(head.distance_right);
                }
            }
            if members.len() < 2 {
                continue;
            }
            for &member in &members {
                state.aggregates[chain_idx].heads.remove(&(read, member));
            }
            let mut root = members[0];
            for &member in &members[1..] {
                root = state.merge_pair(read, root, member);
            }
            state.seed_mut(read, root).distance_left = combined_left;
            state.seed_mut(read, root).distance_right = combined_right;
            state.aggregates[chain_idx].heads.insert((read, root));
        }

        if fragment_limit != 0 {
            let heads = state.resolved_heads(chain_idx);
            if heads.len() < 2 {
                return;
            }
            let best_left = heads
                .iter()
                .map(|head| head.distance_left)
                .min()
                .unwrap_or(UNREACHABLE);
            let best_right = heads
                .iter()
                .map(|head| head.distance_right)
                .min()
                .unwrap_or(UNREACHABLE);
            if sum(best_right, best_left) > fragment_limit {
                return;
            }
            let members: Vec<(usize, usize)> = heads
                .iter()
                .filter(|head| {
                    sum(head.distance_right, best_left).min(sum(head.distance_left, best_right))
                        <= fragment_limit
                })
                .map(|head| (head.read, head.seed))
                .collect();
            state.union_fragment_members(&members);
        }
    }
}

/// A component break: every retained cluster becomes unreachable from the
/// remainder of the chain.
fn break_chain_components(state: &mut ClusterState<'_>, chain_idx: usize) {
    let heads: Vec<(usize, usize)> = state.aggregates[chain_idx].heads.iter().copied().collect();
    for (read, head) in heads {
        state.seed_mut(read, head).distance_right = UNREACHABLE;
    }
}

/// Moves the right reference past the newest child: every retained head's
/// trailing distance grows by the spine distance covered.
fn advance_trailing(state: &mut ClusterState<'_>, chain_idx: usize, delta: usize) {
    let heads: Vec<(usize, usize)> = state.aggregates[chain_idx].heads.iter().copied().collect();
    for (read, head) in heads {
        let trailing = state.seed(read, head).distance_right;
        state.seed_mut(read, head).distance_right = sum(trailing, delta);
    }
}

/// Converts trailing distances into distances to the chain's end. Clusters
/// stranded in an earlier component stay unreachable.
fn finish_chain(state: &mut ClusterState<'_>, chain_idx: usize, scan: &ChainScan) {
    let chain = &state.aggregates[chain_idx];
    let end_offset = chain.min_length.saturating_sub(1);
    let tail = if scan.started && scan.last_component == chain.component_end {
        end_offset.saturating_sub(scan.last_right_offset)
    } else {
        UNREACHABLE
    };
    let heads: Vec<(usize, usize)> = state.aggregates[chain_idx].heads.iter().copied().collect();
    for (read, head) in heads {
        let trailing = state.seed(read, head).distance_right;
        state.seed_mut(read, head).distance_right = sum(trailing, tail);
    }
}

/// Re-resolves the chain's heads and records its best boundary distances
/// for the parent level.
fn record_chain_bests(state: &mut ClusterState<'_>, chain_idx: usize) {
    let fragment = state.fragment_enabled();
    let heads = state.resolved_heads(chain_idx);
    let aggregate = &mut state.aggregates[chain_idx];
    aggregate.heads.clear();
    for head in &heads {
        aggregate.heads.insert((head.read, head.seed));
        aggregate.record_read_best(head.read, head.distance_left, head.distance_right);
        if fragment {
            aggregate.record_fragment_best(head.distance_left, head.distance_right);
        }
    }
}
