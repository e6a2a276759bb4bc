extern crate ngraph3d;
extern crate rand;
extern crate rand_chacha;

use ngraph3d::graph::ConstraintGraph;
use ngraph3d::object::{ContainerId, DefaultBodyHandle, DefaultBodySet, Particle};
use ngraph3d::utils::union_find::{self, UnionFindSet};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CONTACTS: ContainerId = ContainerId(0);

type Graph = ConstraintGraph<DefaultBodyHandle, usize>;

fn rebuild(
    graph: &mut Graph,
    bodies: &mut DefaultBodySet<f32>,
    pairs: &[(DefaultBodyHandle, DefaultBodyHandle)],
) {
    graph.initialize_graph(bodies);

    for (i, (a, b)) in pairs.iter().enumerate() {
        let _ = graph
            .add_constraint(CONTACTS, i, (Some(*a), Some(*b)))
            .unwrap();
    }

    graph.update_islands(bodies);
}

#[test]
fn six_particles_split_then_merge() {
    let mut bodies = DefaultBodySet::new();
    let p: Vec<_> = (0..6)
        .map(|_| bodies.insert(Particle::new_dynamic()))
        .collect();
    let mut graph = Graph::new();

    rebuild(&mut graph, &mut bodies, &[(p[0], p[1]), (p[3], p[4])]);

    assert_eq!(graph.num_islands(), 4);
    assert_eq!(graph.particle_island(p[0]), Some(0));
    assert_eq!(graph.particle_island(p[1]), Some(0));
    assert_eq!(graph.particle_island(p[2]), Some(1));
    assert_eq!(graph.particle_island(p[3]), Some(2));
    assert_eq!(graph.particle_island(p[4]), Some(2));
    assert_eq!(graph.particle_island(p[5]), Some(3));
    assert_eq!(graph.island(1).dynamic_particles(), &[p[2]]);
    assert!(graph.island(1).edges().is_empty());

    rebuild(
        &mut graph,
        &mut bodies,
        &[(p[0], p[1]), (p[3], p[4]), (p[1], p[3])],
    );

    assert_eq!(graph.num_islands(), 3);
    let island = graph.particle_island(p[0]).unwrap();
    let mut members = graph.island(island).dynamic_particles().to_vec();
    members.sort();
    assert_eq!(members, vec![p[0], p[1], p[3], p[4]]);
    assert_eq!(graph.island(island).edges().len(), 3);
    assert!(!graph.island(island).is_persistent());
}

#[test]
fn random_partitions_match_connected_components() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);

    for _ in 0..10 {
        let mut bodies = DefaultBodySet::<f32>::new();
        let dynamic: Vec<_> = (0..60)
            .map(|_| bodies.insert(Particle::new_dynamic()))
            .collect();
        let statics: Vec<_> = (0..5)
            .map(|_| bodies.insert(Particle::new_static()))
            .collect();
        let all: Vec<_> = dynamic.iter().chain(statics.iter()).copied().collect();

        let mut pairs = Vec::new();

        for _ in 0..50 {
            let a = all[rng.gen_range(0..all.len())];
            let b = all[rng.gen_range(0..all.len())];

            if a != b {
                pairs.push((a, b));
            }
        }

        let mut graph = Graph::new();
        rebuild(&mut graph, &mut bodies, &pairs);

        let position = |h: &DefaultBodyHandle| dynamic.iter().position(|d| d == h);
        let mut sets: Vec<_> = (0..dynamic.len()).map(UnionFindSet::new).collect();

        for (a, b) in &pairs {
            if let (Some(i), Some(j)) = (position(a), position(b)) {
                union_find::union(i, j, &mut sets);
            }
        }

        let mut count = vec![0; dynamic.len()];

        for island in graph.islands() {
            for handle in island.dynamic_particles() {
                count[position(handle).unwrap()] += 1;
            }

            for anchor in island.anchors() {
                assert!(statics.contains(anchor));
            }
        }

        assert!(count.iter().all(|c| *c == 1));

        for i in 0..dynamic.len() {
            for j in 0..dynamic.len() {
                let same_island = graph.particle_island(dynamic[i]) == graph.particle_island(dynamic[j]);
                let same_component = union_find::find(i, &mut sets) == union_find::find(j, &mut sets);
                assert_eq!(same_island, same_component);
            }
        }

        for handle in &statics {
            assert_eq!(graph.particle_island(*handle), None);
        }

        for (k, (a, b)) in pairs.iter().enumerate() {
            let expected = graph.particle_island(*a).or_else(|| graph.particle_island(*b));
            assert_eq!(graph.constraint_island(CONTACTS, k), expected);
        }
    }
}

#[test]
fn repeated_updates_keep_island_identity() {
    let mut bodies = DefaultBodySet::<f32>::new();
    let ground = bodies.insert(Particle::new_static());
    let a = bodies.insert(Particle::new_dynamic());
    let b = bodies.insert(Particle::new_dynamic());
    let c = bodies.insert(Particle::new_dynamic());
    let pairs = [(ground, a), (a, b), (ground, c)];
    let mut graph = Graph::new();

    rebuild(&mut graph, &mut bodies, &pairs);
    assert!(graph.islands().iter().all(|island| !island.is_persistent()));

    rebuild(&mut graph, &mut bodies, &pairs);
    assert_eq!(graph.num_islands(), 2);

    for (i, island) in graph.islands().iter().enumerate() {
        assert!(island.is_persistent());
        assert_eq!(island.previous_index(), Some(i));
        assert_eq!(island.anchors(), &[ground]);
    }
}

#[test]
fn repeated_calls_are_idempotent() {
    let mut graph = Graph::new();
    let mut bodies = DefaultBodySet::<f32>::new();
    let a = bodies.insert(Particle::new_dynamic());
    let b = bodies.insert(Particle::new_dynamic());

    let _ = graph.add_particle(a);
    let _ = graph.add_particle(a);
    assert_eq!(graph.num_nodes(), 1);

    let _ = graph.add_constraint(CONTACTS, 0, (Some(a), Some(b))).unwrap();
    let _ = graph.add_constraint(CONTACTS, 1, (Some(b), None)).unwrap();
    assert_eq!((graph.num_nodes(), graph.num_edges()), (2, 2));

    assert!(graph.remove_constraint(CONTACTS, 0, (Some(a), Some(b))));
    assert_eq!((graph.num_nodes(), graph.num_edges()), (2, 1));
    assert!(!graph.remove_constraint(CONTACTS, 0, (Some(a), Some(b))));
    assert_eq!((graph.num_nodes(), graph.num_edges()), (2, 1));
}

#[test]
#[should_panic]
fn missing_body_is_fatal() {
    let mut bodies = DefaultBodySet::<f32>::new();
    let a = bodies.insert(Particle::new_dynamic());
    let mut graph = Graph::new();

    let _ = graph.add_particle(a);
    let _ = bodies.remove(a);
    graph.update_islands(&mut bodies);
}
