//! Seed and cluster records: the engine's input and output units.

use fixedbitset::FixedBitSet;

use crate::{
    distance::UNREACHABLE,
    net::{NetHandle, NodeId},
};

/// A position on the variation graph: a node, an orientation, and a base
/// offset along that orientation.
///
/// # Examples
/// ```
/// use burl_core::GraphPos;
///
/// let pos = GraphPos::new(12, false, 5);
/// assert_eq!(pos.node, 12);
/// assert_eq!(pos.offset, 5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GraphPos {
    /// The graph node the position lies on.
    pub node: NodeId,
    /// Whether the position reads along the node's reverse strand.
    pub is_reverse: bool,
    /// Base offset from the start of the chosen strand.
    pub offset: usize,
}

impl GraphPos {
    /// Creates a graph position.
    #[must_use]
    pub const fn new(node: NodeId, is_reverse: bool, offset: usize) -> Self {
        Self {
            node,
            is_reverse,
            offset,
        }
    }
}

/// Cached decomposition facts for a seed's containing node.
///
/// Minimizer indexes typically precompute these per node so that clustering
/// avoids one oracle round-trip per seed; when absent the engine fills them
/// from the oracle and graph on first use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeFacts {
    /// Sequence length of the node.
    pub node_length: usize,
    /// Connected component of the node's top-level ancestor.
    pub root_component: usize,
    /// Chain-local coordinate of the node's first position.
    pub prefix_sum: usize,
    /// Chain component the node belongs to.
    pub chain_component: usize,
    /// Whether the node runs backwards relative to its chain.
    pub is_reversed_in_chain: bool,
    /// Whether the node sits directly inside a snarl (or the root) rather
    /// than a chain, acting as a chain of its own.
    pub is_trivial_chain: bool,
    /// The node's parent in the decomposition tree.
    pub parent: NetHandle,
}

/// One minimizer occurrence placed on the graph.
///
/// Seeds are owned by the caller and supplied as an ordered sequence per
/// read; the engine never reorders or copies the sequence. The two scratch
/// distances are rewritten repeatedly while clustering proceeds upward and
/// carry no meaning once a decomposition level has been consumed.
#[derive(Clone, Debug)]
pub struct Seed {
    pos: GraphPos,
    source: usize,
    facts: Option<NodeFacts>,
    pub(crate) distance_left: usize,
    pub(crate) distance_right: usize,
}

impl Seed {
    /// Creates a seed with no cached decomposition facts.
    ///
    /// # Examples
    /// ```
    /// use burl_core::{GraphPos, Seed};
    ///
    /// let seed = Seed::new(GraphPos::new(4, false, 10), 0);
    /// assert_eq!(seed.pos().node, 4);
    /// assert!(seed.facts().is_none());
    /// ```
    #[must_use]
    pub const fn new(pos: GraphPos, source: usize) -> Self {
        Self {
            pos,
            source,
            facts: None,
            distance_left: UNREACHABLE,
            distance_right: UNREACHABLE,
        }
    }

    /// Creates a seed carrying precomputed decomposition facts.
    #[must_use]
    pub const fn with_facts(pos: GraphPos, source: usize, facts: NodeFacts) -> Self {
        Self {
            pos,
            source,
            facts: Some(facts),
            distance_left: UNREACHABLE,
            distance_right: UNREACHABLE,
        }
    }

    /// Returns the seed's graph position.
    #[must_use]
    #[rustfmt::skip]
    pub const fn pos(&self) -> GraphPos { self.pos }

    /// Returns the index of the seed's source minimizer.
    #[must_use]
    #[rustfmt::skip]
    pub const fn source(&self) -> usize { self.source }

    /// Returns the cached decomposition facts, if present.
    #[must_use]
    #[rustfmt::skip]
    pub const fn facts(&self) -> Option<NodeFacts> { self.facts }

    pub(crate) fn set_facts(&mut self, facts: NodeFacts) {
        self.facts = Some(facts);
    }
}

/// One cluster of seeds, emitted after the engine finishes.
///
/// A cluster is a derived, immutable view: it is never maintained
/// incrementally during the traversal.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    seeds: Vec<usize>,
    fragment: Option<usize>,
    score: f64,
    coverage: f64,
    present: FixedBitSet,
}

impl Cluster {
    /// Builds a cluster from its member seed indices and their source
    /// minimizer ids. `source_universe` is the number of distinct source
    /// slots for the read (or fragment) the cluster belongs to; every
    /// member's source id must be below it.
    pub(crate) fn from_members(
        seeds: Vec<usize>,
        fragment: Option<usize>,
        sources: &[usize],
        source_universe: usize,
    ) -> Self {
        let mut present = FixedBitSet::with_capacity(source_universe);
        for &source in sources {
            debug_assert!(source < source_universe);
            present.insert(source);
        }
        let distinct = present.count_ones(..);
        let score = distinct as f64;
        let coverage = if source_universe == 0 {
            0.0
        } else {
            score / source_universe as f64
        };
        Self {
            seeds,
            fragment,
            score,
            coverage,
            present,
        }
    }

    /// Indices of the member seeds, in input order.
    ///
    /// Per-read clusters index into that read's seed sequence; fragment
    /// clusters index into the concatenation of all reads' sequences.
    #[must_use]
    #[rustfmt::skip]
    pub fn seeds(&self) -> &[usize] { &self.seeds }

    /// Index of the fragment-level cluster containing this read cluster,
    /// when fragment clustering ran.
    #[must_use]
    #[rustfmt::skip]
    pub const fn fragment(&self) -> Option<usize> { self.fragment }

    /// Number of distinct source minimizers represented, as a score.
    #[must_use]
    #[rustfmt::skip]
    pub const fn score(&self) -> f64 { self.score }

    /// Fraction of the read's source minimizers represented.
    #[must_use]
    #[rustfmt::skip]
    pub const fn coverage(&self) -> f64 { self.coverage }

    /// Bitset marking which source minimizers are present.
    #[must_use]
    #[rustfmt::skip]
    pub const fn present(&self) -> &FixedBitSet { &self.present }
}
