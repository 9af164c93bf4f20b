//! Per-invocation mutable clustering state.
//!
//! Everything a clustering call mutates lives here and is threaded by
//! reference through every level of the traversal; nothing is ambient, so
//! independent calls can run concurrently against the same oracle and
//! graph. The state owns the two coupled disjoint-set structures: one per
//! read, and one spanning the whole fragment. A merge decision always
//! updates the read-scoped structure and, through [`ClusterState::merge_pair`],
//! conditionally the fragment-scoped one; the fragment set is never unioned
//! without the corresponding read union happening first.

use std::collections::HashMap;

use crate::{
    aggregate::{MAX_READS, NetAggregate},
    net::{NetHandle, NodeId, Side},
    seed::Seed,
    union_find::DisjointSet,
};

/// A cluster head with its scratch distances, resolved to the current
/// union-find representative.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ResolvedHead {
    pub(crate) read: usize,
    pub(crate) seed: usize,
    pub(crate) distance_left: usize,
    pub(crate) distance_right: usize,
}

impl ResolvedHead {
    pub(crate) fn distance(&self, side: Side) -> usize {
        match side {
            Side::Left => self.distance_left,
            Side::Right => self.distance_right,
        }
    }
}

pub(crate) struct ClusterState<'a> {
    pub(crate) all_seeds: Vec<&'a mut [Seed]>,
    /// Prefix sum of per-read seed counts, mapping a (read, index) pair to
    /// its fragment-wide index.
    pub(crate) seed_count_prefix_sum: Vec<usize>,
    pub(crate) read_distance_limit: usize,
    /// Zero disables fragment clustering.
    pub(crate) fragment_distance_limit: usize,
    pub(crate) read_union_find: Vec<DisjointSet>,
    pub(crate) fragment_union_find: DisjointSet,
    /// Seeds grouped by the graph node containing them.
    pub(crate) node_to_seeds: HashMap<NodeId, Vec<(usize, usize)>>,
    /// Arena of every aggregate created during the run; referenced by index
    /// because the vector may reallocate.
    pub(crate) aggregates: Vec<NetAggregate>,
    pub(crate) net_to_aggregate: HashMap<NetHandle, usize>,
    /// Aggregate indices of the top-level children reaching the root.
    pub(crate) root_children: Vec<usize>,
}

impl<'a> ClusterState<'a> {
    pub(crate) fn new(
        all_seeds: Vec<&'a mut [Seed]>,
        read_distance_limit: usize,
        fragment_distance_limit: usize,
    ) -> Self {
        debug_assert!(all_seeds.len() <= MAX_READS);
        let mut seed_count_prefix_sum = vec![0usize];
        let mut read_union_find = Vec::with_capacity(all_seeds.len());
        for seeds in &all_seeds {
            let offset = seed_count_prefix_sum
                .last()
                .copied()
                .unwrap_or(0)
                .saturating_add(seeds.len());
            seed_count_prefix_sum.push(offset);
            read_union_find.push(DisjointSet::new(seeds.len()));
        }
        let total = seed_count_prefix_sum.last().copied().unwrap_or(0);

        Self {
            all_seeds,
            seed_count_prefix_sum,
            read_distance_limit,
            fragment_distance_limit,
            read_union_find,
            fragment_union_find: DisjointSet::new(total),
            node_to_seeds: HashMap::new(),
            aggregates: Vec::new(),
            net_to_aggregate: HashMap::new(),
            root_children: Vec::new(),
        }
    }

    pub(crate) fn read_count(&self) -> usize {
        self.all_seeds.len()
    }

    pub(crate) fn fragment_enabled(&self) -> bool {
        self.fragment_distance_limit != 0
    }

    /// Maps a (read, index) pair to its fragment-wide index.
    pub(crate) fn global_index(&self, read: usize, seed: usize) -> usize {
        self.seed_count_prefix_sum[read] + seed
    }

    pub(crate) fn seed(&self, read: usize, seed: usize) -> &Seed {
        &self.all_seeds[read][seed]
    }

    pub(crate) fn seed_mut(&mut self, read: usize, seed: usize) -> &mut Seed {
        &mut self.all_seeds[read][seed]
    }

    pub(crate) fn find(&mut self, read: usize, seed: usize) -> usize {
        self.read_union_find[read].find(seed)
    }

    /// Merges two same-read clusters: always the read-scoped set, and the
    /// fragment-scoped set whenever fragment clustering is active. Returns
    /// the surviving read-scoped representative.
    pub(crate) fn merge_pair(&mut self, read: usize, a: usize, b: usize) -> usize {
        let root = self.read_union_find[read].union(a, b);
        if self.fragment_enabled() {
            let ga = self.global_index(read, a);
            let gb = self.global_index(read, b);
            self.fragment_union_find.union(ga, gb);
        }
        root
    }

    /// Merges two clusters in the fragment-scoped set only; the members may
    /// belong to different reads.
    pub(crate) fn merge_fragment(&mut self, read_a: usize, a: usize, read_b: usize, b: usize) {
        debug_assert!(self.fragment_enabled());
        let ga = self.global_index(read_a, a);
        let gb = self.global_index(read_b, b);
        self.fragment_union_find.union(ga, gb);
    }

    /// Folds a qualifying set into one fragment-scoped cluster.
    pub(crate) fn union_fragment_members(&mut self, members: &[(usize, usize)]) {
        if members.len() < 2 {
            return;
        }
        let (read0, seed0) = members[0];
        for &(read, seed) in &members[1..] {
            self.merge_fragment(read0, seed0, read, seed);
        }
    }

    pub(crate) fn push_aggregate(&mut self, aggregate: NetAggregate) -> usize {
        let index = self.aggregates.len();
        self.net_to_aggregate.insert(aggregate.net, index);
        self.aggregates.push(aggregate);
        index
    }

    /// Returns the arena index for `net`, building the aggregate on first
    /// use.
    pub(crate) fn ensure_aggregate(
        &mut self,
        net: NetHandle,
        make: impl FnOnce() -> NetAggregate,
    ) -> usize {
        if let Some(&index) = self.net_to_aggregate.get(&net) {
            return index;
        }
        self.push_aggregate(make())
    }

    /// Re-resolves an aggregate's heads through the union-find and returns
    /// them with their current scratch distances, deduplicated. Stale head
    /// ids are never trusted when a lower level is consumed.
    pub(crate) fn resolved_heads(&mut self, aggregate: usize) -> Vec<ResolvedHead> {
        let stored: Vec<(usize, usize)> = self.aggregates[aggregate].heads.iter().copied().collect();
        let mut seen: Vec<(usize, usize)> = Vec::with_capacity(stored.len());
        let mut resolved = Vec::with_capacity(stored.len());
        for (read, head) in stored {
            let head = self.find(read, head);
            if seen.contains(&(read, head)) {
                continue;
            }
            seen.push((read, head));
            let seed = self.seed(read, head);
            resolved.push(ResolvedHead {
                read,
                seed: head,
                distance_left: seed.distance_left,
                distance_right: seed.distance_right,
            });
        }
        resolved.sort_by_key(|head| (head.read, head.seed));
        resolved
    }
}
