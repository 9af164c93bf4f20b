//! Integration tests: scene compilation and end-to-end clustering.

use burl_core::{DistanceOracle, NetHandle, NetKind, SeedClusterer, Side};
use burl_providers_scene::{
    BoundDistanceSpec, ChainElement, ChainSpec, ChildDistanceSpec, NodeSpec, Scene, SceneError,
    SceneSpec, SeedSpec, SideSpec, SnarlChild, SnarlSpec,
};
use rstest::rstest;

fn node(id: u64, length: usize) -> NodeSpec {
    NodeSpec {
        id,
        length,
        root_component: 0,
    }
}

/// Two 10 bp nodes around a snarl holding two 7 bp trivial nodes whose
/// facing bounds sit 4 bases apart.
fn bubble_spec() -> SceneSpec {
    SceneSpec {
        name: Some("bubble".to_owned()),
        nodes: vec![node(1, 10), node(2, 10), node(10, 7), node(11, 7)],
        chains: vec![ChainSpec {
            id: 1,
            looping: false,
            root_component: 0,
            children: vec![
                ChainElement::Node {
                    id: 1,
                    reversed: false,
                },
                ChainElement::Snarl { id: 1 },
                ChainElement::Node {
                    id: 2,
                    reversed: false,
                },
            ],
        }],
        snarls: vec![SnarlSpec {
            id: 1,
            min_length: 5,
            children: vec![SnarlChild::Node { id: 10 }, SnarlChild::Node { id: 11 }],
            distances: vec![ChildDistanceSpec {
                from: SnarlChild::Node { id: 10 },
                from_side: SideSpec::Right,
                to: SnarlChild::Node { id: 11 },
                to_side: SideSpec::Left,
                distance: 4,
            }],
            bound_distances: vec![
                BoundDistanceSpec {
                    child: SnarlChild::Node { id: 10 },
                    child_side: SideSpec::Left,
                    snarl_side: SideSpec::Left,
                    distance: 1,
                },
                BoundDistanceSpec {
                    child: SnarlChild::Node { id: 11 },
                    child_side: SideSpec::Right,
                    snarl_side: SideSpec::Right,
                    distance: 1,
                },
            ],
        }],
        reads: vec![vec![
            SeedSpec {
                node: 10,
                reversed: false,
                offset: 3,
                source: 0,
            },
            SeedSpec {
                node: 11,
                reversed: false,
                offset: 3,
                source: 1,
            },
        ]],
    }
}

#[test]
fn derives_chain_coordinates_from_the_walk() {
    let scene = Scene::compile(bubble_spec()).expect("bubble scene must compile");
    let chain = NetHandle::new(NetKind::Chain, 1);
    let snarl = NetHandle::new(NetKind::Snarl, 1);

    assert_eq!(scene.prefix_sum(1), 0);
    // Node 2 starts one snarl crossing after node 1's last base.
    assert_eq!(scene.prefix_sum(2), 14);
    assert_eq!(scene.chain_minimum_length(chain), 24);

    let position = scene.snarl_position(snarl);
    assert_eq!(position.left_offset, 9);
    assert_eq!(position.right_offset, 14);
    assert_eq!(scene.snarl_bound(snarl, Side::Left), 1);
    assert_eq!(scene.snarl_bound(snarl, Side::Right), 2);

    // Nesting: trivial nodes sit one level below the top chain.
    assert_eq!(scene.depth(chain), 1);
    assert_eq!(scene.depth(NetHandle::new(NetKind::Node, 10)), 2);
    assert_eq!(scene.parent(NetHandle::new(NetKind::Node, 10)), snarl);
}

#[rstest]
#[case::within_limit(10, 1)]
#[case::one_short(9, 2)]
fn clusters_seeds_through_the_compiled_scene(#[case] limit: usize, #[case] expected: usize) {
    let scene = Scene::compile(bubble_spec()).expect("bubble scene must compile");
    let clusterer = SeedClusterer::new(&scene, &scene);
    let mut reads = scene.seeds();
    let clusters = clusterer
        .cluster_seeds(&mut reads[0], limit)
        .expect("clustering must succeed");
    assert_eq!(clusters.len(), expected);
}

#[test]
fn parses_a_scene_from_json() {
    let input = r#"{
        "name": "tiny",
        "nodes": [{"id": 1, "length": 20}],
        "reads": [[
            {"node": 1, "offset": 2, "source": 0},
            {"node": 1, "offset": 5, "source": 1}
        ]]
    }"#;
    let scene = Scene::from_json(input).expect("JSON scene must parse");
    assert_eq!(scene.name(), "tiny");
    assert_eq!(scene.read_count(), 1);

    let clusterer = SeedClusterer::new(&scene, &scene);
    let mut reads = scene.seeds();
    let clusters = clusterer
        .cluster_seeds(&mut reads[0], 5)
        .expect("clustering must succeed");
    assert_eq!(clusters.len(), 1);
}

#[test]
fn rejects_duplicate_nodes() {
    let spec = SceneSpec {
        nodes: vec![node(1, 10), node(1, 12)],
        ..SceneSpec::default()
    };
    let err = Scene::compile(spec).expect_err("duplicate node must be rejected");
    assert!(matches!(err, SceneError::DuplicateNode { node: 1 }));
}

#[test]
fn rejects_chains_that_do_not_end_with_a_node() {
    let mut spec = bubble_spec();
    spec.chains[0].children.pop();
    let err = Scene::compile(spec).expect_err("trailing snarl must be rejected");
    assert!(matches!(err, SceneError::MalformedChain { chain: 1 }));
}

#[test]
fn rejects_breaks_next_to_snarls() {
    let mut spec = bubble_spec();
    spec.chains[0].children.insert(2, ChainElement::Break);
    let err = Scene::compile(spec).expect_err("break after snarl must be rejected");
    assert!(matches!(err, SceneError::MisplacedBreak { chain: 1 }));
}

#[test]
fn rejects_distances_between_foreign_children() {
    let mut spec = bubble_spec();
    spec.snarls[0].distances.push(ChildDistanceSpec {
        from: SnarlChild::Node { id: 1 },
        from_side: SideSpec::Left,
        to: SnarlChild::Node { id: 11 },
        to_side: SideSpec::Left,
        distance: 1,
    });
    let err = Scene::compile(spec).expect_err("foreign distance must be rejected");
    assert!(matches!(err, SceneError::ForeignDistance { snarl: 1 }));
}

#[test]
fn rejects_seeds_beyond_their_node() {
    let spec = SceneSpec {
        nodes: vec![node(1, 10)],
        reads: vec![vec![SeedSpec {
            node: 1,
            reversed: false,
            offset: 10,
            source: 0,
        }]],
        ..SceneSpec::default()
    };
    let err = Scene::compile(spec).expect_err("out-of-bounds seed must be rejected");
    assert!(matches!(
        err,
        SceneError::SeedOutOfBounds {
            node: 1,
            offset: 10,
            length: 10
        }
    ));
}

#[test]
fn rejects_unplaced_snarls() {
    let mut spec = bubble_spec();
    spec.chains[0].children = vec![ChainElement::Node {
        id: 1,
        reversed: false,
    }];
    let err = Scene::compile(spec).expect_err("unplaced snarl must be rejected");
    assert!(matches!(err, SceneError::UnplacedSnarl { snarl: 1 }));
}
