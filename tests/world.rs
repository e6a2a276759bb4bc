extern crate ngraph3d;

use std::collections::HashSet;

use ngraph3d::graph::SleepState;
use ngraph3d::math::Velocity;
use ngraph3d::object::{
    Body, ContainerId, DefaultBodyHandle, DefaultBodySet, DefaultConstraintSet, Particle,
    SleepMaterial,
};
use ngraph3d::solver::{ColorSchedule, GraphParameters, LevelingMode};
use ngraph3d::world::GraphWorld;

const CONTACTS: ContainerId = ContainerId(0);
const JOINTS: ContainerId = ContainerId(1);

type World = GraphWorld<f32, DefaultBodyHandle, usize>;

fn assert_buckets_disjoint(
    schedule: &ColorSchedule<usize>,
    constraints: &DefaultConstraintSet<DefaultBodyHandle>,
    bodies: &DefaultBodySet<f32>,
) {
    schedule.for_each_bucket(|_, _, bucket| {
        let mut seen = HashSet::new();

        for handle in bucket {
            let entry = constraints.get(*handle).unwrap();

            for body in Some(entry.body1).iter().chain(entry.body2.iter()) {
                if bodies.get(*body).unwrap().is_dynamic() {
                    assert!(seen.insert(*body));
                }
            }
        }
    });
}

#[test]
fn step_schedules_every_awake_constraint() {
    let mut bodies = DefaultBodySet::new();
    let ground = bodies.insert(Particle::new_static());
    let boxes: Vec<_> = (0..10)
        .map(|_| bodies.insert(Particle::new_dynamic()))
        .collect();

    let mut contacts = DefaultConstraintSet::new(CONTACTS);
    let _ = contacts.insert(ground, Some(boxes[0]));
    let _ = contacts.insert(ground, Some(boxes[5]));

    for i in 0..9 {
        if i != 4 {
            let _ = contacts.insert(boxes[i], Some(boxes[i + 1]));
        }
    }

    let mut joints = DefaultConstraintSet::new(JOINTS);
    let _ = joints.insert(boxes[2], None);

    let mut world = World::new();
    world.counters.enable();
    world.step(&mut bodies, &[&contacts, &joints]);

    assert_eq!(world.graph().num_islands(), 2);
    assert_eq!(world.counters.graph().nislands, 2);
    assert_eq!(world.counters.graph().nedges, contacts.len() + joints.len());

    let schedule = world.schedule(CONTACTS).unwrap();
    assert_eq!(schedule.len(), contacts.len());
    assert_buckets_disjoint(schedule, &contacts, &bodies);

    // Stacks of five boxes resting on the ground.
    assert_eq!(schedule.num_levels(), 5);
    assert_eq!(world.schedule(JOINTS).unwrap().len(), 1);
}

#[test]
fn sleeping_islands_leave_the_schedule() {
    let mut bodies = DefaultBodySet::new();
    let mut resting = Particle::new_dynamic();
    resting.set_sleep_material(Some(SleepMaterial::new(0.1, 0.1, 1)));
    let a = bodies.insert(resting.clone());
    let b = bodies.insert(resting);
    let c = bodies.insert(Particle::new_dynamic());
    let d = bodies.insert(Particle::new_dynamic());
    bodies.get_mut(c).unwrap().set_velocity(Velocity::linear(1.0, 0.0, 0.0));

    let mut contacts = DefaultConstraintSet::new(CONTACTS);
    let _ = contacts.insert(a, Some(b));
    let _ = contacts.insert(c, Some(d));

    let mut world = World::new();

    world.step(&mut bodies, &[&contacts]);
    assert_eq!(world.schedule(CONTACTS).unwrap().len(), 2);

    world.step(&mut bodies, &[&contacts]);
    assert!(bodies.get(a).unwrap().is_sleeping());
    assert_eq!(world.counters.graph().nsleeping_islands, 1);
    assert_eq!(world.schedule(CONTACTS).unwrap().len(), 1);

    world.step(&mut bodies, &[&contacts]);
    assert!(world.graph().island(0).is_sleeping());
    assert_eq!(world.schedule(CONTACTS).unwrap().len(), 1);
}

#[test]
fn disabled_sleeping_keeps_islands_awake() {
    let mut bodies = DefaultBodySet::new();
    let mut resting = Particle::new_dynamic();
    resting.set_sleep_material(Some(SleepMaterial::new(0.1, 0.1, 0)));
    let a = bodies.insert(resting);

    let contacts = DefaultConstraintSet::<DefaultBodyHandle>::new(CONTACTS);
    let params = GraphParameters::default().with_sleeping(false);
    let mut world = World::with_parameters(params);

    for _ in 0..5 {
        world.step(&mut bodies, &[&contacts]);
    }

    assert!(!bodies.get(a).unwrap().is_sleeping());
    assert_eq!(world.counters.graph().nsleeping_islands, 0);
}

#[test]
fn bodies_inserted_after_the_first_step_join_the_graph() {
    let mut bodies = DefaultBodySet::new();
    let early = bodies.insert(Particle::new_dynamic());
    let contacts = DefaultConstraintSet::<DefaultBodyHandle>::new(CONTACTS);
    let mut world = World::new();

    world.step(&mut bodies, &[&contacts]);

    let late = bodies.insert(Particle::new_dynamic());
    world.step(&mut bodies, &[&contacts]);

    let island = world.graph().particle_island(late).unwrap();
    assert_ne!(world.graph().particle_island(early), Some(island));
    assert_eq!(world.graph().island(island).dynamic_particles(), &[late]);

    // The default sleep counter threshold is 20.
    for _ in 0..19 {
        world.step(&mut bodies, &[&contacts]);
    }

    assert!(bodies.get(early).unwrap().is_sleeping());
    assert!(!bodies.get(late).unwrap().is_sleeping());

    world.step(&mut bodies, &[&contacts]);

    let island = world.graph().particle_island(late).unwrap();
    assert_eq!(world.graph().island(island).sleep_state(), SleepState::Asleep);
    assert!(bodies.get(late).unwrap().is_sleeping());
    assert_eq!(world.counters.graph().nsleeping_islands, 2);
}

#[test]
fn removed_bodies_leave_the_graph() {
    let mut bodies = DefaultBodySet::new();
    let a = bodies.insert(Particle::new_dynamic());
    let b = bodies.insert(Particle::new_dynamic());
    let c = bodies.insert(Particle::new_dynamic());

    let mut contacts = DefaultConstraintSet::new(CONTACTS);
    let _ = contacts.insert(a, Some(b));
    let bc = contacts.insert(b, Some(c));

    let mut world = World::new();
    world.step(&mut bodies, &[&contacts]);
    assert_eq!(world.graph().num_islands(), 1);

    let _ = bodies.remove(c);
    let _ = contacts.remove(bc);
    world.step(&mut bodies, &[&contacts]);

    assert_eq!(world.graph().node_index(c), None);
    assert_eq!(world.graph().num_nodes(), 2);
    assert_eq!(world.graph().num_islands(), 1);
    assert_eq!(world.schedule(CONTACTS).unwrap().len(), 1);
}

#[test]
fn oriented_constraints_drive_directed_levels() {
    let mut bodies = DefaultBodySet::new();
    let ground = bodies.insert(Particle::new_static());
    let a = bodies.insert(Particle::new_dynamic());
    let b = bodies.insert(Particle::new_dynamic());
    let c = bodies.insert(Particle::new_dynamic());

    let mut contacts = DefaultConstraintSet::new(CONTACTS);
    let _ = contacts.insert_oriented(ground, a);
    let _ = contacts.insert_oriented(a, b);
    let _ = contacts.insert_oriented(b, c);

    let params = GraphParameters::default().with_leveling(LevelingMode::DirectedGraph);
    let mut world = World::with_parameters(params);
    world.step(&mut bodies, &[&contacts]);

    // A constraint takes the level of its deepest body, so level 0 stays empty.
    let schedule = world.schedule(CONTACTS).unwrap();
    assert_eq!(schedule.num_levels(), 4);
    assert_eq!(schedule.num_colors(0), 0);

    let mut per_level = vec![0; schedule.num_levels()];
    schedule.for_each_bucket(|level, _, bucket| per_level[level] += bucket.len());
    assert_eq!(per_level, vec![0, 1, 1, 1]);
}
