//! Entity lifecycle scenarios driven through the public API only.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ricochet_ecs::prelude::*;

#[test]
fn destroyed_entity_leaves_every_index() {
    let mut world = World::new();
    let e = world.spawn(
        EntityTemplate::new()
            .with(Transform::new(0.0, 0.0))
            .with(Physics::new())
            .with(Collider::circle(3.0))
            .with(Renderer::circle(3.0))
            .with(Lifetime::new(0.0, 0.0, 100.0))
            .with(ScriptedBehavior::new())
            .with_tag("player")
            .with_tag("ship"),
    );
    let other = world.spawn(EntityTemplate::new().with(Transform::default()).with_tag("ship"));

    world.destroy_entity(e);

    for kind in ComponentKind::ALL {
        assert!(!world.query(&[kind]).contains(&e), "{kind} still lists {e}");
        assert!(!world.entities_with(kind).contains(&e));
    }
    assert!(world.query_by_tag("player").is_empty());
    assert_eq!(world.query_by_tag("ship").into_iter().collect::<Vec<_>>(), vec![other]);
    assert_eq!(world.indexed_kind_count(), 1);
    assert_eq!(world.tag_count(), 1);
}

#[test]
fn replacing_a_component_keeps_one_per_kind() {
    let mut world = World::new();
    let e = world.create_entity();
    world.attach(e, Physics::new().with_mass(2.0));
    world.attach(e, Physics::new().with_mass(5.0));
    assert_eq!(world.components().len(ComponentKind::Physics), 1);
    assert_eq!(world.get::<Physics>(e).map(|p| p.mass()), Some(5.0));
}

#[test]
fn detached_component_can_move_to_another_entity() {
    let mut world = World::new();
    let a = world.create_entity();
    let b = world.create_entity();
    world.attach(a, Transform::new(3.0, 4.0));
    let t = world.detach::<Transform>(a);
    assert!(t.as_ref().is_some_and(|t| t.owner().is_none()));
    if let Some(t) = t {
        world.attach(b, t);
    }
    assert_eq!(world.get::<Transform>(b).and_then(|t| t.owner()), Some(b));
    assert_eq!(world.query(&[ComponentKind::Transform]), vec![b]);
}

#[test]
fn system_lifecycle_hooks_see_the_world() {
    struct Spawner {
        spawned: Rc<Cell<Option<EntityId>>>,
    }
    impl System for Spawner {
        fn name(&self) -> &str {
            "spawner"
        }
        fn on_attach(&mut self, world: &mut World) {
            let e = world.create_entity();
            world.add_tag(e, "spawned_by_system");
            self.spawned.set(Some(e));
        }
        fn on_detach(&mut self, world: &mut World) {
            if let Some(e) = self.spawned.get() {
                world.destroy_entity(e);
            }
        }
        fn update(&mut self, _: &mut World, _: &[EntityId], _: f64) {}
    }

    let mut world = World::new();
    let spawned = Rc::new(Cell::new(None));
    let id = world.add_system(Spawner {
        spawned: Rc::clone(&spawned),
    });
    assert_eq!(world.query_by_tag("spawned_by_system").len(), 1);

    world.remove_system(id);
    assert!(world.query_by_tag("spawned_by_system").is_empty());
    assert_eq!(world.entity_count(), 0);
}

#[test]
fn out_of_frame_producers_only_enqueue() {
    let mut world = World::new();
    let seen_during_frame = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&seen_during_frame);
    world.add_system(FnSystem::new(
        "observer",
        0,
        &[ComponentKind::Transform],
        move |_, entities, _| seen.borrow_mut().push(entities.len()),
    ));

    let sender = world.command_sender();
    let timer_sender = sender.clone();
    for i in 0..3 {
        timer_sender.spawn(
            EntityTemplate::new()
                .with(Transform::new(f64::from(i), 0.0))
                .with_tag("asteroid"),
        );
    }

    world.update(0.016);
    world.update(0.016);

    assert_eq!(*seen_during_frame.borrow(), vec![0, 3]);
    assert_eq!(world.query_by_tag("asteroid").len(), 3);
}

#[test]
fn commands_sent_while_applying_wait_for_next_frame() {
    let mut world = World::new();
    let sender = world.command_sender();
    let inner = sender.clone();
    let e = world.create_entity();
    world.attach(
        e,
        ScriptedBehavior::new().with_on_detach(move |_| {
            inner.spawn(EntityTemplate::new().with_tag("debris"));
        }),
    );

    sender.destroy(e);
    let first = world.apply_commands();
    assert_eq!(first.success_count, 1);
    assert!(world.query_by_tag("debris").is_empty());
    assert_eq!(world.pending_commands(), 1);

    world.apply_commands();
    assert_eq!(world.query_by_tag("debris").len(), 1);
}

#[test]
fn clear_then_reuse_world() {
    let mut world = World::new();
    world.add_system(ScriptSystem::new());
    for _ in 0..5 {
        world.spawn(EntityTemplate::new().with(Transform::default()));
    }
    world.clear();
    assert_eq!(world.entity_count(), 0);
    assert_eq!(world.system_count(), 0);

    let e = world.create_entity();
    assert!(world.is_alive(e));
    assert_eq!(e.to_raw(), 6, "ids keep counting after clear");
}
