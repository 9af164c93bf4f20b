//! Scene compilation and the oracle implementation over it.

use std::collections::{HashMap, HashSet};

use burl_core::{
    DistanceOracle, GraphPos, NetHandle, NetKind, NodeId, Seed, SequenceGraph, Side, SnarlPosition,
    distance::UNREACHABLE,
};

use crate::{
    error::SceneError,
    spec::{ChainElement, SceneSpec, SeedSpec, SnarlChild},
};

fn node_net(node: NodeId) -> NetHandle {
    NetHandle::new(NetKind::Node, node)
}

fn chain_net(chain: u64) -> NetHandle {
    NetHandle::new(NetKind::Chain, chain)
}

fn snarl_net(snarl: u64) -> NetHandle {
    NetHandle::new(NetKind::Snarl, snarl)
}

fn child_net(child: SnarlChild) -> NetHandle {
    match child {
        SnarlChild::Node { id } => node_net(id),
        SnarlChild::Chain { id } => chain_net(id),
    }
}

/// A compiled scene: an in-memory decomposition answering every oracle
/// query, plus the seeds described alongside it.
#[derive(Clone, Debug)]
pub struct Scene {
    name: String,
    node_lengths: HashMap<u64, usize>,
    node_parent: HashMap<u64, NetHandle>,
    node_prefix: HashMap<u64, usize>,
    node_component: HashMap<u64, usize>,
    node_reversed: HashSet<u64>,
    chain_parent: HashMap<u64, NetHandle>,
    chain_min_length: HashMap<u64, usize>,
    chain_end_component: HashMap<u64, usize>,
    looping_chains: HashSet<u64>,
    snarl_parent: HashMap<u64, NetHandle>,
    snarl_min_length: HashMap<u64, usize>,
    snarl_positions: HashMap<u64, SnarlPosition>,
    snarl_bounds: HashMap<u64, (u64, u64)>,
    child_distances: HashMap<(u64, NetHandle, Side, NetHandle, Side), usize>,
    bound_distances: HashMap<(u64, NetHandle, Side, Side), usize>,
    depths: HashMap<NetHandle, usize>,
    root_components: HashMap<NetHandle, usize>,
    ranks: HashMap<NetHandle, usize>,
    reads: Vec<Vec<SeedSpec>>,
}

impl Scene {
    /// Parses and compiles a JSON scene description.
    ///
    /// # Errors
    /// Returns [`SceneError::Parse`] for malformed JSON and any compilation
    /// error for an inconsistent decomposition.
    pub fn from_json(input: &str) -> Result<Self, SceneError> {
        let spec: SceneSpec = serde_json::from_str(input)?;
        Self::compile(spec)
    }

    /// Compiles a parsed description, deriving prefix sums, components,
    /// nesting depths, and root components, and validating every
    /// cross-reference.
    ///
    /// # Errors
    /// Returns a [`SceneError`] naming the first inconsistency found.
    pub fn compile(spec: SceneSpec) -> Result<Self, SceneError> {
        let mut scene = Self {
            name: spec.name.clone().unwrap_or_else(|| "scene".to_owned()),
            node_lengths: HashMap::new(),
            node_parent: HashMap::new(),
            node_prefix: HashMap::new(),
            node_component: HashMap::new(),
            node_reversed: HashSet::new(),
            chain_parent: HashMap::new(),
            chain_min_length: HashMap::new(),
            chain_end_component: HashMap::new(),
            looping_chains: HashSet::new(),
            snarl_parent: HashMap::new(),
            snarl_min_length: HashMap::new(),
            snarl_positions: HashMap::new(),
            snarl_bounds: HashMap::new(),
            child_distances: HashMap::new(),
            bound_distances: HashMap::new(),
            depths: HashMap::new(),
            root_components: HashMap::new(),
            ranks: HashMap::new(),
            reads: spec.reads.clone(),
        };

        for node in &spec.nodes {
            if scene.node_lengths.insert(node.id, node.length).is_some() {
                return Err(SceneError::DuplicateNode { node: node.id });
            }
            scene
                .root_components
                .insert(node_net(node.id), node.root_component);
        }
        for snarl in &spec.snarls {
            if scene
                .snarl_min_length
                .insert(snarl.id, snarl.min_length)
                .is_some()
            {
                return Err(SceneError::DuplicateSnarl { snarl: snarl.id });
            }
        }
        for chain in &spec.chains {
            if scene.chain_min_length.contains_key(&chain.id) {
                return Err(SceneError::DuplicateChain { chain: chain.id });
            }
            scene.walk_chain(chain)?;
        }
        for snarl in &spec.snarls {
            scene.adopt_snarl_children(snarl)?;
        }
        scene.resolve_depths_and_components()?;
        scene.validate_seeds()?;
        Ok(scene)
    }

    /// Walks one chain's children, assigning coordinates and components
    /// and placing the snarls it passes.
    fn walk_chain(&mut self, chain: &crate::spec::ChainSpec) -> Result<(), SceneError> {
        if !matches!(chain.children.first(), Some(ChainElement::Node { .. }))
            || !matches!(chain.children.last(), Some(ChainElement::Node { .. }))
        {
            return Err(SceneError::MalformedChain { chain: chain.id });
        }

        let mut cursor = 0;
        let mut component = 0;
        let mut last_end = 0;
        let mut last_node: Option<u64> = None;
        let mut pending_snarl: Option<u64> = None;
        for (rank, element) in chain.children.iter().enumerate() {
            match *element {
                ChainElement::Node { id, reversed } => {
                    let length = self
                        .node_lengths
                        .get(&id)
                        .copied()
                        .ok_or(SceneError::UnknownNode { node: id })?;
                    if self.node_parent.insert(id, chain_net(chain.id)).is_some() {
                        return Err(SceneError::ClaimedTwice { what: "node", id });
                    }
                    self.node_prefix.insert(id, cursor);
                    self.node_component.insert(id, component);
                    if reversed {
                        self.node_reversed.insert(id);
                    }
                    self.ranks.insert(node_net(id), rank);
                    last_end = cursor + length.saturating_sub(1);
                    if let Some(snarl) = pending_snarl.take() {
                        let position = self
                            .snarl_positions
                            .get_mut(&snarl)
                            .ok_or(SceneError::UnknownSnarl {
                                chain: chain.id,
                                snarl,
                            })?;
                        position.right_offset = cursor;
                        position.end_component = component;
                        if let Some(bounds) = self.snarl_bounds.get_mut(&snarl) {
                            bounds.1 = id;
                        }
                    }
                    cursor = last_end + 1;
                    last_node = Some(id);
                }
                ChainElement::Snarl { id } => {
                    let Some(start) = last_node else {
                        return Err(SceneError::MalformedChain { chain: chain.id });
                    };
                    if pending_snarl.is_some() {
                        return Err(SceneError::MalformedChain { chain: chain.id });
                    }
                    let min_length = self
                        .snarl_min_length
                        .get(&id)
                        .copied()
                        .ok_or(SceneError::UnknownSnarl {
                            chain: chain.id,
                            snarl: id,
                        })?;
                    if self.snarl_parent.insert(id, chain_net(chain.id)).is_some() {
                        return Err(SceneError::ClaimedTwice { what: "snarl", id });
                    }
                    self.snarl_positions.insert(
                        id,
                        SnarlPosition {
                            left_offset: last_end,
                            right_offset: last_end,
                            start_component: component,
                            end_component: component,
                        },
                    );
                    self.snarl_bounds.insert(id, (start, start));
                    self.ranks.insert(snarl_net(id), rank);
                    pending_snarl = Some(id);
                    cursor = last_end.saturating_add(min_length);
                    last_node = None;
                }
                ChainElement::Break => {
                    if last_node.is_none() || pending_snarl.is_some() {
                        return Err(SceneError::MisplacedBreak { chain: chain.id });
                    }
                    component += 1;
                    cursor = 0;
                    last_node = None;
                }
            }
        }
        if pending_snarl.is_some() {
            return Err(SceneError::MalformedChain { chain: chain.id });
        }

        self.chain_min_length.insert(chain.id, cursor);
        self.chain_end_component.insert(chain.id, component);
        if chain.looping {
            self.looping_chains.insert(chain.id);
        }
        self.root_components
            .insert(chain_net(chain.id), chain.root_component);
        Ok(())
    }

    /// Claims a snarl's children and records its internal distances.
    fn adopt_snarl_children(&mut self, snarl: &crate::spec::SnarlSpec) -> Result<(), SceneError> {
        if !self.snarl_parent.contains_key(&snarl.id) {
            return Err(SceneError::UnplacedSnarl { snarl: snarl.id });
        }
        let parent = snarl_net(snarl.id);
        let mut children: HashSet<NetHandle> = HashSet::new();
        for &child in &snarl.children {
            match child {
                SnarlChild::Node { id } => {
                    if !self.node_lengths.contains_key(&id) {
                        return Err(SceneError::UnknownNode { node: id });
                    }
                    if self.node_parent.insert(id, parent).is_some() {
                        return Err(SceneError::ClaimedTwice { what: "node", id });
                    }
                }
                SnarlChild::Chain { id } => {
                    if !self.chain_min_length.contains_key(&id) {
                        return Err(SceneError::UnknownChain {
                            snarl: snarl.id,
                            chain: id,
                        });
                    }
                    if self.chain_parent.insert(id, parent).is_some() {
                        return Err(SceneError::ClaimedTwice { what: "chain", id });
                    }
                }
            }
            children.insert(child_net(child));
        }
        for distance in &snarl.distances {
            let from = child_net(distance.from);
            let to = child_net(distance.to);
            if !children.contains(&from) || !children.contains(&to) {
                return Err(SceneError::ForeignDistance { snarl: snarl.id });
            }
            let from_side = Side::from(distance.from_side);
            let to_side = Side::from(distance.to_side);
            self.child_distances
                .insert((snarl.id, from, from_side, to, to_side), distance.distance);
            self.child_distances
                .insert((snarl.id, to, to_side, from, from_side), distance.distance);
        }
        for bound in &snarl.bound_distances {
            let child = child_net(bound.child);
            if !children.contains(&child) {
                return Err(SceneError::ForeignDistance { snarl: snarl.id });
            }
            self.bound_distances.insert(
                (
                    snarl.id,
                    child,
                    Side::from(bound.child_side),
                    Side::from(bound.snarl_side),
                ),
                bound.distance,
            );
        }
        Ok(())
    }

    /// Derives nesting depths and root components for every declared net,
    /// rejecting cyclic nesting.
    fn resolve_depths_and_components(&mut self) -> Result<(), SceneError> {
        let nets: Vec<NetHandle> = self
            .node_lengths
            .keys()
            .map(|&id| node_net(id))
            .chain(self.chain_min_length.keys().map(|&id| chain_net(id)))
            .chain(self.snarl_min_length.keys().map(|&id| snarl_net(id)))
            .collect();
        for net in nets {
            let mut visiting = HashSet::new();
            let depth = self.resolve_depth(net, &mut visiting)?;
            self.depths.insert(net, depth);
            let component = self.resolve_root_component(net);
            self.root_components.insert(net, component);
        }
        Ok(())
    }

    fn stored_parent(&self, net: NetHandle) -> NetHandle {
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

    fn resolve_depth(
        &self,
        net: NetHandle,
        visiting: &mut HashSet<NetHandle>,
    ) -> Result<usize, SceneError> {
        if let Some(&depth) = self.depths.get(&net) {
            return Ok(depth);
        }
        if !visiting.insert(net) {
            return Err(SceneError::CyclicNesting);
        }
        let parent = self.stored_parent(net);
        let depth = match parent.kind() {
            NetKind::Root => 1,
            NetKind::Snarl => self.resolve_depth(parent, visiting)? + 1,
            NetKind::Chain | NetKind::Node => self.resolve_depth(parent, visiting)?,
        };
        visiting.remove(&net);
        Ok(depth)
    }

    fn resolve_root_component(&self, net: NetHandle) -> usize {
        let mut current = net;
        loop {
            let parent = self.stored_parent(current);
            if parent.kind() == NetKind::Root {
                return self.root_components.get(&current).copied().unwrap_or(0);
            }
            current = parent;
        }
    }

    fn validate_seeds(&self) -> Result<(), SceneError> {
        for read in &self.reads {
            for seed in read {
                let length = self
                    .node_lengths
                    .get(&seed.node)
                    .copied()
                    .ok_or(SceneError::UnknownNode { node: seed.node })?;
                if seed.offset >= length {
                    return Err(SceneError::SeedOutOfBounds {
                        node: seed.node,
                        offset: seed.offset,
                        length,
                    });
                }
            }
        }
        Ok(())
    }

    /// Display name of the scene.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of reads described by the scene.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.len()
    }

    /// Builds fresh per-read seed sequences for one clustering call.
    #[must_use]
    pub fn seeds(&self) -> Vec<Vec<Seed>> {
        self.reads
            .iter()
            .map(|read| {
                read.iter()
                    .map(|seed| {
                        Seed::new(
                            GraphPos::new(seed.node, seed.reversed, seed.offset),
                            seed.source,
                        )
                    })
                    .collect()
            })
            .collect()
    }

    fn rank_of(&self, net: NetHandle) -> usize {
        self.ranks.get(&net).copied().unwrap_or(net.id() as usize)
    }
}

impl DistanceOracle for Scene {
    fn node_net(&self, node: NodeId) -> Option<NetHandle> {
        self.node_lengths.contains_key(&node).then(|| node_net(node))
    }

    fn parent(&self, net: NetHandle) -> NetHandle {
        self.stored_parent(net)
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

    fn forward_loop(&self, _node: NodeId) -> usize {
        UNREACHABLE
    }

    fn reverse_loop(&self, _node: NodeId) -> usize {
        UNREACHABLE
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

impl SequenceGraph for Scene {
    fn node_length(&self, node: NodeId) -> Option<usize> {
        self.node_lengths.get(&node).copied()
    }
}
