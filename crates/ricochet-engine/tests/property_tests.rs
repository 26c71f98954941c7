//! Scenario tests for the documented world, movement, spatial and collision
//! properties, driven through the public API.

use std::cell::RefCell;
use std::rc::Rc;

use ricochet_engine::prelude::*;

type PhaseLog = Rc<RefCell<Vec<CollisionPhase>>>;

fn pairwise() -> CollisionSettings {
    CollisionSettings {
        broad_phase: BroadPhase::Pairwise,
        ..CollisionSettings::default()
    }
}

fn record_phases(world: &mut World, first: &str, second: &str) -> PhaseLog {
    let log: PhaseLog = Rc::default();
    let l = Rc::clone(&log);
    let mut callbacks = world
        .remove_resource::<CollisionCallbacks>()
        .unwrap_or_default();
    callbacks.on(first, second, move |_, _, _, phase| l.borrow_mut().push(phase));
    world.insert_resource(callbacks);
    log
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

#[test]
fn destroyed_entity_never_reappears_in_queries() {
    let mut world = World::new();
    let e = world.spawn(
        EntityTemplate::new()
            .with(Transform::default())
            .with(Collider::circle(1.0))
            .with_tag("enemy"),
    );
    world.destroy_entity(e);
    world.update(0.016);

    assert!(!world.query_by_tag("enemy").contains(&e));
    for kind in ComponentKind::ALL {
        assert!(!world.entities_with(kind).contains(&e));
    }
}

#[test]
fn destroying_twice_fires_detach_once() {
    let detaches = Rc::new(RefCell::new(0));
    let d = Rc::clone(&detaches);
    let mut world = World::new();
    let e = world.spawn(
        EntityTemplate::new().with(ScriptedBehavior::new().with_on_detach(move |_| *d.borrow_mut() += 1)),
    );
    assert!(world.destroy_entity(e));
    assert!(!world.destroy_entity(e));
    assert_eq!(*detaches.borrow(), 1);
}

#[test]
fn query_intersection_ignores_argument_order() {
    let mut world = World::new();
    let a_only = world.spawn(EntityTemplate::new().with(Transform::default()));
    let both = world.spawn(
        EntityTemplate::new()
            .with(Transform::default())
            .with(Physics::new()),
    );
    let b_only = world.spawn(EntityTemplate::new().with(Physics::new()));

    let ab = world.query(&[ComponentKind::Transform, ComponentKind::Physics]);
    let ba = world.query(&[ComponentKind::Physics, ComponentKind::Transform]);
    assert_eq!(ab, vec![both]);
    assert_eq!(ab, ba);
    assert!(!ab.contains(&a_only) && !ab.contains(&b_only));
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

#[test]
fn movement_is_frame_rate_independent() {
    let run = |steps: u32, dt: f64| {
        let mut world = World::new();
        world.add_system(MovementSystem::default());
        let e = world.spawn(
            EntityTemplate::new()
                .with(Transform::new(0.0, 0.0))
                .with(Physics::new().with_velocity(100.0, 0.0)),
        );
        for _ in 0..steps {
            world.update(dt);
        }
        world.get::<Transform>(e).map(|t| t.x).unwrap_or(f64::NAN)
    };
    assert_eq!(run(2, 0.5), 100.0);
    assert!((run(4, 0.25) - 100.0).abs() < 1e-9);
}

#[test]
fn bound_bounce_halves_and_reverses() {
    let bounds = Bounds::new(0.0, 0.0, 500.0, 500.0);
    let mut t = Transform::new(0.0, 100.0);
    let mut p = Physics::new()
        .with_velocity(-80.0, 0.0)
        .with_bounce_xy(0.5, 0.5)
        .with_bounds(bounds);
    integrate(&mut t, &mut p, 0.1, 1e-3);
    assert_eq!(p.vx, 40.0);

    let mut t = Transform::new(0.0, 100.0);
    let mut p = Physics::new().with_velocity(-80.0, 0.0).with_bounds(bounds);
    integrate(&mut t, &mut p, 0.1, 1e-3);
    assert_eq!(p.vx, 0.0);
}

// ---------------------------------------------------------------------------
// Spatial grid
// ---------------------------------------------------------------------------

#[test]
fn grid_neighbours_share_a_cell_and_removal_is_clean() {
    let mut grid = SpatialGrid::new(200.0, 200.0, 20.0);
    let placements = [(1u64, 15.0, 15.0, 8.0), (2, 25.0, 25.0, 4.0), (3, 150.0, 150.0, 5.0)];
    for &(id, x, y, r) in &placements {
        grid.insert(EntityId::from_raw(id), x, y, r);
    }
    for &(id, ..) in &placements {
        let me = EntityId::from_raw(id);
        let nearby = grid.nearby(me);
        assert!(!nearby.contains(&me));
        for other in nearby {
            let shares = grid
                .cells_of(me)
                .iter()
                .any(|c| grid.cells_of(other).contains(c));
            assert!(shares);
        }
    }
    assert_eq!(grid.nearby(EntityId::from_raw(1)), vec![EntityId::from_raw(2)]);

    let occupied = grid.cells_of(EntityId::from_raw(1)).to_vec();
    assert!(grid.remove(EntityId::from_raw(1)));
    for cell in occupied {
        if let Some(bucket) = grid.bucket(cell) {
            assert!(!bucket.contains(&EntityId::from_raw(1)));
            assert!(!bucket.is_empty());
        }
    }
}

// ---------------------------------------------------------------------------
// Collision
// ---------------------------------------------------------------------------

#[test]
fn check_collision_is_symmetric_and_closed() {
    let mut world = World::new();
    let a = world.spawn(
        EntityTemplate::new()
            .with(Transform::new(0.0, 0.0))
            .with(Collider::circle(5.0)),
    );
    let b = world.spawn(
        EntityTemplate::new()
            .with(Transform::new(10.0, 0.0))
            .with(Collider::circle(5.0)),
    );
    assert!(check_collision(&world, a, b));
    assert_eq!(check_collision(&world, a, b), check_collision(&world, b, a));
}

#[test]
fn pair_lifecycle_over_three_overlapping_frames() {
    let mut world = World::new();
    world.add_system(CollisionSystem::new(300, pairwise()));
    let log = record_phases(&mut world, "ship", "rock");
    let ship = world.spawn(
        EntityTemplate::new()
            .with(Transform::new(-100.0, 0.0))
            .with(Collider::circle(5.0))
            .with_tag("ship"),
    );
    world.spawn(
        EntityTemplate::new()
            .with(Transform::new(0.0, 0.0))
            .with(Collider::circle(5.0))
            .with_tag("rock"),
    );

    world.update(0.016);
    assert!(log.borrow().is_empty());

    if let Some(t) = world.get_mut::<Transform>(ship) {
        t.x = -6.0;
    }
    for _ in 0..3 {
        world.update(0.016);
    }
    if let Some(t) = world.get_mut::<Transform>(ship) {
        t.x = -100.0;
    }
    world.update(0.016);

    let log = log.borrow();
    let count = |phase: CollisionPhase| log.iter().filter(|&&p| p == phase).count();
    assert_eq!(count(CollisionPhase::Start), 1);
    assert_eq!(count(CollisionPhase::Stay), 3);
    assert_eq!(count(CollisionPhase::End), 1);
    assert_eq!(log.first(), Some(&CollisionPhase::Start));
    assert_eq!(log.last(), Some(&CollisionPhase::End));
}

#[test]
fn player_hits_static_target() {
    let mut world = World::new();
    let log = record_phases(&mut world, "player", "target");
    let player = world.spawn(
        EntityTemplate::new()
            .with(Transform::new(0.0, 0.0))
            .with(Collider::circle(20.0))
            .with(Physics::new().with_mass(1.0))
            .with_tag("player"),
    );
    let target = world.spawn(
        EntityTemplate::new()
            .with(Transform::new(25.0, 0.0))
            .with(Collider::circle(10.0))
            .with_tag("target"),
    );

    let stats = collision_pass(&mut world, &CollisionSettings::default());
    assert_eq!(stats.colliding, 1);
    let pairs = world.resource::<CollisionPairs>().cloned().unwrap_or_default();
    assert!(pairs.is_colliding(player, target));
    assert_eq!(*log.borrow(), vec![CollisionPhase::Start, CollisionPhase::Stay]);
    assert_eq!(world.get::<Transform>(target).map(|t| t.position()), Some((25.0, 0.0)));
    assert_eq!(world.get::<Transform>(player).map(|t| t.position()), Some((0.0, 0.0)));
}

#[test]
fn mid_pass_destroy_does_not_disturb_remaining_pairs() {
    let mut world = World::new();
    let mut callbacks = CollisionCallbacks::new();
    callbacks.on("bullet", "rock", |world, bullet, rock, phase| {
        if phase == CollisionPhase::Start {
            world.destroy_entity(bullet);
            world.destroy_entity(rock);
        }
    });
    world.insert_resource(callbacks);
    let spawn = |world: &mut World, x: f64, tag: &str| {
        world.spawn(
            EntityTemplate::new()
                .with(Transform::new(x, 0.0))
                .with(Collider::circle(4.0))
                .with_tag(tag),
        )
    };
    spawn(&mut world, 0.0, "bullet");
    spawn(&mut world, 5.0, "rock");
    let far_bullet = spawn(&mut world, 100.0, "bullet");
    let far_rock = spawn(&mut world, 105.0, "rock");

    collision_pass(&mut world, &pairwise());
    assert_eq!(world.entity_count(), 0);
    assert!(!world.is_alive(far_bullet) && !world.is_alive(far_rock));
    assert!(world.resource::<CollisionPairs>().is_some_and(|p| p.is_empty()));
}
