//! Single-linkage clustering along one linear structure.
//!
//! Seeds on a single graph node, or on a chain whose children are all bare
//! seeds, sit on a totally ordered coordinate. One pass over the sorted
//! order is enough for single-linkage: a seed joins its read's current run
//! when the gap to the previous seed of that read is within the read limit,
//! and the fragment union additionally links consecutive seeds of any read
//! within the fragment limit. The offset accessor is a compile-time
//! parameter so the same scan serves both call sites.

use crate::{aggregate::MAX_READS, state::ClusterState};

/// One entry of the sorted scan: a seed and its coordinate on the
/// structure.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LinearItem {
    pub(crate) read: usize,
    pub(crate) seed: usize,
    pub(crate) offset: usize,
}

struct Run {
    head: usize,
    last_offset: usize,
}

/// Clusters `items` along a structure of `structure_length` bases,
/// recording heads and best boundary distances into `aggregate`.
pub(crate) fn cluster_linear<T, F>(
    state: &mut ClusterState<'_>,
    aggregate: usize,
    items: &[T],
    structure_length: usize,
    get: F,
) where
    F: Fn(&T) -> LinearItem,
{
    let mut ordered: Vec<LinearItem> = items.iter().map(|item| get(item)).collect();
    ordered.sort_by_key(|item| (item.offset, item.read, item.seed));
    if ordered.is_empty() {
        return;
    }

    let read_limit = state.read_distance_limit;
    let fragment_limit = state.fragment_distance_limit;
    let end = structure_length.saturating_sub(1);

    let mut runs: [Option<Run>; MAX_READS] = [None, None];
    let mut previous: Option<LinearItem> = None;

    for item in &ordered {
        match runs[item.read].take() {
            Some(run) => {
                let gap = item.offset - run.last_offset;
                if gap <= read_limit {
                    let left = state.seed(item.read, run.head).distance_left;
                    let head = state.merge_pair(item.read, run.head, item.seed);
                    state.seed_mut(item.read, head).distance_left = left;
                    runs[item.read] = Some(Run {
                        head,
                        last_offset: item.offset,
                    });
                } else {
                    finish_run(state, aggregate, item.read, &run, end);
                    state.seed_mut(item.read, item.seed).distance_left = item.offset;
                    runs[item.read] = Some(Run {
                        head: item.seed,
                        last_offset: item.offset,
                    });
                }
            }
            None => {
                state.seed_mut(item.read, item.seed).distance_left = item.offset;
                runs[item.read] = Some(Run {
                    head: item.seed,
                    last_offset: item.offset,
                });
            }
        }

        if fragment_limit != 0 {
            if let Some(prev) = previous {
                let gap = item.offset - prev.offset;
                if gap <= fragment_limit {
                    state.merge_fragment(prev.read, prev.seed, item.read, item.seed);
                }
            }
            previous = Some(*item);
        }
    }

    for read in 0..state.read_count() {
        if let Some(run) = runs[read].take() {
            finish_run(state, aggregate, read, &run, end);
        }
    }

    if fragment_limit != 0 {
        let first = ordered[0].offset;
        let last = ordered[ordered.len() - 1].offset;
        state.aggregates[aggregate].record_fragment_best(first, end.saturating_sub(last));
    }
}

/// Closes a run: fixes the head's right boundary distance and records it on
/// the aggregate.
fn finish_run(state: &mut ClusterState<'_>, aggregate: usize, read: usize, run: &Run, end: usize) {
    let head = state.find(read, run.head);
    let right = end.saturating_sub(run.last_offset);
    let left = state.seed(read, head).distance_left;
    state.seed_mut(read, head).distance_right = right;
    let agg = &mut state.aggregates[aggregate];
    agg.heads.insert((read, head));
    agg.record_read_best(read, left, right);
}
