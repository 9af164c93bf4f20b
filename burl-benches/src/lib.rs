//! Benchmark support: synthetic scenes for the clustering engine.
//!
//! The generators build linear-chain scenes of configurable size with
//! deterministic, seeded random seed placements, so benchmark runs are
//! reproducible across machines.

use burl_providers_scene::{ChainElement, ChainSpec, NodeSpec, SceneSpec, SeedSpec};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Builds a scene holding one top-level chain of `node_count` directly
/// adjacent nodes, each `node_length` bases long, with no seeds.
#[must_use]
pub fn linear_scene(node_count: usize, node_length: usize) -> SceneSpec {
    let nodes = (0..node_count)
        .map(|index| NodeSpec {
            id: index as u64 + 1,
            length: node_length,
            root_component: 0,
        })
        .collect();
    let children = (0..node_count)
        .map(|index| ChainElement::Node {
            id: index as u64 + 1,
            reversed: false,
        })
        .collect();
    SceneSpec {
        name: Some("synthetic".to_owned()),
        nodes,
        chains: vec![ChainSpec {
            id: 1,
            looping: false,
            root_component: 0,
            children,
        }],
        snarls: Vec::new(),
        reads: Vec::new(),
    }
}

/// Generates `seed_count` seeds uniformly placed over the nodes of a
/// [`linear_scene`], deterministically from `rng_seed`.
#[must_use]
pub fn random_read(
    rng_seed: u64,
    node_count: usize,
    node_length: usize,
    seed_count: usize,
) -> Vec<SeedSpec> {
    let mut rng = SmallRng::seed_from_u64(rng_seed);
    (0..seed_count)
        .map(|source| SeedSpec {
            node: rng.gen_range(1..=node_count as u64),
            reversed: false,
            offset: rng.gen_range(0..node_length),
            source,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use burl_providers_scene::Scene;

    use super::{linear_scene, random_read};

    #[test]
    fn synthetic_scenes_compile() {
        let mut spec = linear_scene(16, 32);
        spec.reads = vec![random_read(7, 16, 32, 100)];
        let scene = Scene::compile(spec).expect("synthetic scene must compile");
        assert_eq!(scene.read_count(), 1);
        assert_eq!(scene.seeds()[0].len(), 100);
    }

    #[test]
    fn random_reads_are_deterministic() {
        let first = random_read(42, 8, 16, 50);
        let second = random_read(42, 8, 16, 50);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!((a.node, a.offset, a.source), (b.node, b.offset, b.source));
        }
    }
}
