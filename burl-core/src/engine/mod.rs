//! Clustering engine orchestration.
//!
//! Seeds are folded bottom-up through the snarl decomposition: each
//! occupied graph node is clustered locally, node summaries are merged left
//! to right along their chains, nested snarls and chains collapse one level
//! at a time, and the root pass finalises the bookkeeping. The union-find
//! structures built along the way are then flattened into the returned
//! cluster lists.

pub(crate) mod chain;
pub(crate) mod linear;
pub(crate) mod root;
pub(crate) mod snarl;


use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::{
    aggregate::{ChainChild, ChildMap, ChildPayload, MAX_READS, NetAggregate, sort_children},
    error::{ClusterError, Result},
    net::{NetKind, NodeId},
    oracle::{DistanceOracle, SequenceGraph},
    seed::{Cluster, GraphPos, NodeFacts, Seed},
    state::ClusterState,
};

/// Clusters alignment seeds through a snarl decomposition.
///
/// The clusterer borrows a read-only [`DistanceOracle`] and
/// [`SequenceGraph`]; neither is mutated, so one instance may serve
/// concurrent clustering calls dispatched from an external thread pool.
///
/// Two seeds of one read end up in the same cluster exactly when they are
/// connected by a chain of that read's seeds in which every consecutive
/// pair lies within the read distance limit.
#[derive(Debug, Clone, Copy)]
pub struct SeedClusterer<'a, O, G> {
    oracle: &'a O,
    graph: &'a G,
}

/// Per-depth work lists while walking the decomposition bottom-up.
#[derive(Default)]
struct Level {
    /// Chains at this depth, mapped to their seed and snarl children.
    chain_children: ChildMap,
    /// Occupied nodes acting as their own chain at this depth.
    trivial_chains: Vec<usize>,
}

impl<'a, O: DistanceOracle, G: SequenceGraph> SeedClusterer<'a, O, G> {
    /// Creates a clusterer over the given oracle and graph.
    #[must_use]
    pub const fn new(oracle: &'a O, graph: &'a G) -> Self {
        Self { oracle, graph }
    }

    /// Clusters one read's seeds under `read_distance_limit`.
    ///
    /// The seed sequence is neither reordered nor copied; only the seeds'
    /// scratch fields and fact caches are written. Zero seeds yield zero
    /// clusters.
    ///
    /// # Errors
    /// Returns [`ClusterError::UnknownNode`] when a seed names a node that
    /// neither the graph nor the decomposition knows.
    #[instrument(
        name = "cluster.read",
        err,
        skip(self, seeds),
        fields(seeds = seeds.len(), read_distance_limit),
    )]
    pub fn cluster_seeds(
        &self,
        seeds: &mut [Seed],
        read_distance_limit: usize,
    ) -> Result<Vec<Cluster>> {
        if seeds.is_empty() {
            return Ok(Vec::new());
        }
        let mut state = ClusterState::new(vec![seeds], read_distance_limit, 0);
        self.cluster_levels(&mut state)?;
        Ok(flatten_read(&mut state, 0, None))
    }

    /// Clusters the seeds of a paired fragment: each read under
    /// `read_distance_limit`, and all seeds jointly under
    /// `fragment_distance_limit`.
    ///
    /// Passing `0` as the fragment limit disables fragment clustering and
    /// yields an empty fragment list. Per-read clusters index into their
    /// read's sequence; fragment clusters index into the concatenation of
    /// all reads' sequences in the order given.
    ///
    /// # Errors
    /// Returns [`ClusterError::FragmentLimitTooSmall`] when a non-zero
    /// fragment limit is below the read limit,
    /// [`ClusterError::TooManyReads`] for more than two reads, and
    /// [`ClusterError::UnknownNode`] for seeds on unknown nodes.
    #[instrument(
        name = "cluster.fragment",
        err,
        skip(self, all_seeds),
        fields(reads = all_seeds.len(), read_distance_limit, fragment_distance_limit),
    )]
    pub fn cluster_fragment(
        &self,
        all_seeds: &mut [Vec<Seed>],
        read_distance_limit: usize,
        fragment_distance_limit: usize,
    ) -> Result<(Vec<Vec<Cluster>>, Vec<Cluster>)> {
        if all_seeds.len() > MAX_READS {
            return Err(ClusterError::TooManyReads {
                got: all_seeds.len(),
            });
        }
        if fragment_distance_limit != 0 && fragment_distance_limit < read_distance_limit {
            return Err(ClusterError::FragmentLimitTooSmall {
                read_limit: read_distance_limit,
                fragment_limit: fragment_distance_limit,
            });
        }
        if all_seeds.iter().all(Vec::is_empty) {
            return Ok((vec![Vec::new(); all_seeds.len()], Vec::new()));
        }

        let seeds: Vec<&mut [Seed]> = all_seeds
            .iter_mut()
            .map(|read| read.as_mut_slice())
            .collect();
        let mut state = ClusterState::new(seeds, read_distance_limit, fragment_distance_limit);
        self.cluster_levels(&mut state)?;

        let (fragment_clusters, fragment_index) = if state.fragment_enabled() {
            flatten_fragment(&mut state)
        } else {
            (Vec::new(), HashMap::new())
        };
        let index = state.fragment_enabled().then_some(&fragment_index);
        let per_read = (0..state.read_count())
            .map(|read| flatten_read(&mut state, read, index))
            .collect();
        Ok((per_read, fragment_clusters))
    }

    /// Walks the decomposition from the deepest occupied level to the root.
    fn cluster_levels(&self, state: &mut ClusterState<'_>) -> Result<()> {
        let mut levels = self.assign_seed_levels(state)?;
        debug!(levels = levels.len(), "seed grouping complete");
        for depth in (1..levels.len()).rev() {
            let mut level = std::mem::take(&mut levels[depth]);
            let mut snarl_children: HashMap<usize, Vec<usize>> = HashMap::new();

            for aggregate in level.trivial_chains {
                self.cluster_node(state, aggregate);
                self.attach_chain(state, aggregate, &mut snarl_children);
            }
            for (chain_idx, mut list) in level.chain_children.take() {
                sort_children(&mut list.children, self.oracle);
                self.cluster_chain(state, chain_idx, &list.children, list.only_seeds);
                self.attach_chain(state, chain_idx, &mut snarl_children);
            }

            let mut snarls: Vec<(usize, Vec<usize>)> = snarl_children.into_iter().collect();
            snarls.sort_by_key(|(snarl, _)| *snarl);
            for (snarl_idx, mut children) in snarls {
                children.sort_unstable();
                self.cluster_snarl(state, snarl_idx, &children);
                self.attach_snarl(state, snarl_idx, &mut levels);
            }
        }
        self.cluster_root(state);
        Ok(())
    }

    /// Groups seeds by graph node and assigns every occupied node to its
    /// containing chain (or to its own trivial chain), organised by depth.
    fn assign_seed_levels(&self, state: &mut ClusterState<'_>) -> Result<Vec<Level>> {
        for read in 0..state.read_count() {
            for seed in 0..state.all_seeds[read].len() {
                self.ensure_facts(state, read, seed)?;
                let node = state.seed(read, seed).pos().node;
                state
                    .node_to_seeds
                    .entry(node)
                    .or_default()
                    .push((read, seed));
            }
        }

        let mut occupied: Vec<(NodeId, Vec<(usize, usize)>)> = state
            .node_to_seeds
            .iter()
            .map(|(node, seeds)| (*node, seeds.clone()))
            .collect();
        occupied.sort_by_key(|(node, _)| *node);

        let mut levels: Vec<Level> = Vec::new();
        for (node, on_node) in occupied {
            let node_net = self
                .oracle
                .node_net(node)
                .ok_or(ClusterError::UnknownNode { node })?;
            let (read0, seed0) = on_node[0];
            let Some(facts) = state.seed(read0, seed0).facts() else {
                continue;
            };
            if facts.is_trivial_chain {
                let depth = self.oracle.depth(node_net);
                let aggregate = state.push_aggregate(NetAggregate::for_node(node_net, &facts));
                level_at(&mut levels, depth).trivial_chains.push(aggregate);
            } else {
                let chain = facts.parent;
                let depth = self.oracle.depth(chain);
                let chain_idx =
                    state.ensure_aggregate(chain, || NetAggregate::for_chain(chain, self.oracle));
                for (read, seed) in on_node {
                    let seed_facts = state.seed(read, seed).facts().unwrap_or(facts);
                    let offset = chain_offset(&seed_facts, state.seed(read, seed).pos());
                    level_at(&mut levels, depth).chain_children.add_child(
                        chain_idx,
                        ChainChild {
                            net: node_net,
                            payload: ChildPayload::Seed { read, seed },
                            component: seed_facts.chain_component,
                            offset,
                        },
                    );
                }
            }
        }
        Ok(levels)
    }

    /// Fills a seed's decomposition-fact cache from the oracle and graph
    /// when the caller did not supply it.
    fn ensure_facts(&self, state: &mut ClusterState<'_>, read: usize, seed: usize) -> Result<NodeFacts> {
        if let Some(facts) = state.seed(read, seed).facts() {
            return Ok(facts);
        }
        let node = state.seed(read, seed).pos().node;
        let net = self
            .oracle
            .node_net(node)
            .ok_or(ClusterError::UnknownNode { node })?;
        let node_length = match self.graph.node_length(node) {
            Some(length) => length,
            None => self.oracle.minimum_length(net),
        };
        let parent = self.oracle.parent(net);
        let facts = NodeFacts {
            node_length,
            root_component: self.oracle.root_component(net),
            prefix_sum: self.oracle.prefix_sum(node),
            chain_component: self.oracle.chain_component(node),
            is_reversed_in_chain: self.oracle.is_reversed_in_chain(node),
            is_trivial_chain: parent.kind() != NetKind::Chain,
            parent,
        };
        state.seed_mut(read, seed).set_facts(facts);
        Ok(facts)
    }

    /// Clusters the seeds sitting on one graph node (a trivial chain).
    fn cluster_node(&self, state: &mut ClusterState<'_>, aggregate: usize) {
        let node = state.aggregates[aggregate].net.id();
        let length = state.aggregates[aggregate].min_length;
        let Some(on_node) = state.node_to_seeds.get(&node).cloned() else {
            return;
        };
        let items: Vec<(usize, usize, usize)> = on_node
            .into_iter()
            .map(|(read, seed)| {
                let offset = forward_offset(state.seed(read, seed));
                (read, seed, offset)
            })
            .collect();
        linear::cluster_linear(
            state,
            aggregate,
            &items,
            length,
            |&(read, seed, offset)| linear::LinearItem { read, seed, offset },
        );
    }

    /// Hands a finished chain (or trivial chain) to its parent: a snarl's
    /// child list, or the root.
    fn attach_chain(
        &self,
        state: &mut ClusterState<'_>,
        aggregate: usize,
        snarl_children: &mut HashMap<usize, Vec<usize>>,
    ) {
        let net = state.aggregates[aggregate].net;
        debug_assert!(
            state.aggregates[aggregate].is_trivial_chain || net.kind() == NetKind::Chain,
            "only chains and trivial-chain nodes reach a snarl or the root"
        );
        let parent = self.oracle.parent(net);
        match parent.kind() {
            NetKind::Root => state.root_children.push(aggregate),
            NetKind::Snarl => {
                let snarl_idx =
                    state.ensure_aggregate(parent, || NetAggregate::for_snarl(parent, self.oracle));
                snarl_children.entry(snarl_idx).or_default().push(aggregate);
            }
            NetKind::Chain | NetKind::Node => {
                debug_assert!(false, "a chain's parent must be a snarl or the root");
            }
        }
    }

    /// Hands a finished snarl to its parent chain's child list at the
    /// parent's depth, or to the root for a top-level snarl.
    fn attach_snarl(&self, state: &mut ClusterState<'_>, aggregate: usize, levels: &mut [Level]) {
        let net = state.aggregates[aggregate].net;
        let parent = self.oracle.parent(net);
        if parent.kind() == NetKind::Root {
            state.root_children.push(aggregate);
            return;
        }
        debug_assert!(parent.kind() == NetKind::Chain, "a snarl's parent must be a chain");
        let depth = self.oracle.depth(parent);
        let chain_idx =
            state.ensure_aggregate(parent, || NetAggregate::for_chain(parent, self.oracle));
        let snarl = &state.aggregates[aggregate];
        let child = ChainChild {
            net,
            payload: ChildPayload::Aggregate(aggregate),
            component: snarl.component_start,
            offset: snarl.offset_left,
        };
        if let Some(level) = levels.get_mut(depth) {
            level.chain_children.add_child(chain_idx, child);
        } else {
            debug_assert!(false, "snarl parent depth must be shallower than the snarl");
        }
    }
}

/// Chain coordinate of a seed: the node's prefix sum plus the seed's offset
/// oriented along the chain.
fn chain_offset(facts: &NodeFacts, pos: GraphPos) -> usize {
    let span = facts.node_length.saturating_sub(1);
    let forward = if pos.is_reverse {
        span.saturating_sub(pos.offset)
    } else {
        pos.offset
    };
    let along_chain = if facts.is_reversed_in_chain {
        span.saturating_sub(forward)
    } else {
        forward
    };
    facts.prefix_sum.saturating_add(along_chain)
}

/// Offset of a seed along its node's forward strand.
fn forward_offset(seed: &Seed) -> usize {
    let pos = seed.pos();
    if pos.is_reverse {
        let span = seed
            .facts()
            .map_or(0, |facts| facts.node_length.saturating_sub(1));
        span.saturating_sub(pos.offset)
    } else {
        pos.offset
    }
}

fn level_at(levels: &mut Vec<Level>, depth: usize) -> &mut Level {
    if levels.len() <= depth {
        levels.resize_with(depth + 1, Level::default);
    }
    &mut levels[depth]
}

/// Resolves one read's union-find into output clusters, in first-seen
/// member order.
fn flatten_read(
    state: &mut ClusterState<'_>,
    read: usize,
    fragment_index: Option<&HashMap<usize, usize>>,
) -> Vec<Cluster> {
    let universe = state.all_seeds[read]
        .iter()
        .map(|seed| seed.source() + 1)
        .max()
        .unwrap_or(0);
    let groups = state.read_union_find[read].groups();
    let mut clusters = Vec::with_capacity(groups.len());
    for group in groups {
        let fragment = fragment_index.map(|index| {
            let global = state.global_index(read, group[0]);
            let root = state.fragment_union_find.find(global);
            index.get(&root).copied().unwrap_or(0)
        });
        let sources: Vec<usize> = group
            .iter()
            .map(|&seed| state.seed(read, seed).source())
            .collect();
        clusters.push(Cluster::from_members(group, fragment, &sources, universe));
    }
    clusters
}

/// Resolves the fragment-wide union-find into clusters over global seed
/// indices, returning the clusters plus a map from fragment root to
/// cluster index.
fn flatten_fragment(state: &mut ClusterState<'_>) -> (Vec<Cluster>, HashMap<usize, usize>) {
    let universe = state
        .all_seeds
        .iter()
        .flat_map(|read| read.iter())
        .map(|seed| seed.source() + 1)
        .max()
        .unwrap_or(0);
    let groups = state.fragment_union_find.groups();
    let mut index = HashMap::with_capacity(groups.len());
    let mut clusters = Vec::with_capacity(groups.len());
    for (position, group) in groups.into_iter().enumerate() {
        let root = state.fragment_union_find.find(group[0]);
        index.insert(root, position);
        let sources: Vec<usize> = group
            .iter()
            .map(|&global| {
                let (read, seed) = split_global(state, global);
                state.seed(read, seed).source()
            })
            .collect();
        clusters.push(Cluster::from_members(group, None, &sources, universe));
    }
    (clusters, index)
}

/// Splits a fragment-wide seed index back into (read, index).
fn split_global(state: &ClusterState<'_>, global: usize) -> (usize, usize) {
    for read in (0..state.read_count()).rev() {
        let base = state.seed_count_prefix_sum[read];
        if global >= base {
            return (read, global - base);
        }
    }
    (0, global)
}
