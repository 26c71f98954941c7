//! Property tests for world bookkeeping.
//!
//! Random sequences of create/destroy/attach/detach/tag operations are applied
//! to a world, and after every sequence the reverse indices must agree with
//! the forward maps and contain no destroyed entity.

use std::collections::BTreeSet;

use proptest::prelude::*;
use ricochet_ecs::prelude::*;

const TAGS: [&str; 4] = ["player", "enemy", "bullet", "pickup"];

#[derive(Debug, Clone)]
enum WorldOp {
    Create,
    Destroy(usize),
    Attach(usize, ComponentKind),
    Detach(usize, ComponentKind),
    AddTag(usize, usize),
    RemoveTag(usize, usize),
}

fn kind_strategy() -> impl Strategy<Value = ComponentKind> {
    (0..ComponentKind::ALL.len()).prop_map(|i| ComponentKind::ALL[i])
}

fn op_strategy() -> impl Strategy<Value = WorldOp> {
    prop_oneof![
        3 => Just(WorldOp::Create),
        1 => (0..64usize).prop_map(WorldOp::Destroy),
        3 => (0..64usize, kind_strategy()).prop_map(|(i, k)| WorldOp::Attach(i, k)),
        1 => (0..64usize, kind_strategy()).prop_map(|(i, k)| WorldOp::Detach(i, k)),
        2 => (0..64usize, 0..TAGS.len()).prop_map(|(i, t)| WorldOp::AddTag(i, t)),
        1 => (0..64usize, 0..TAGS.len()).prop_map(|(i, t)| WorldOp::RemoveTag(i, t)),
    ]
}

fn sample(kind: ComponentKind) -> Component {
    match kind {
        ComponentKind::Transform => Transform::new(1.0, 2.0).into(),
        ComponentKind::Physics => Physics::new().into(),
        ComponentKind::Collider => Collider::circle(4.0).into(),
        ComponentKind::Renderer => Renderer::circle(4.0).into(),
        ComponentKind::Lifetime => Lifetime::new(0.0, 0.0, 50.0).into(),
        ComponentKind::ScriptedBehavior => ScriptedBehavior::new().into(),
    }
}

fn pick(created: &[EntityId], i: usize) -> Option<EntityId> {
    created.get(i % created.len().max(1)).copied()
}

fn apply(world: &mut World, created: &mut Vec<EntityId>, op: WorldOp) {
    match op {
        WorldOp::Create => created.push(world.create_entity()),
        WorldOp::Destroy(i) => {
            if let Some(e) = pick(created, i) {
                world.destroy_entity(e);
            }
        }
        WorldOp::Attach(i, kind) => {
            if let Some(e) = pick(created, i) {
                world.attach_component(e, sample(kind));
            }
        }
        WorldOp::Detach(i, kind) => {
            if let Some(e) = pick(created, i) {
                world.detach_component(e, kind);
            }
        }
        WorldOp::AddTag(i, t) => {
            if let Some(e) = pick(created, i) {
                world.add_tag(e, TAGS[t]);
            }
        }
        WorldOp::RemoveTag(i, t) => {
            if let Some(e) = pick(created, i) {
                world.remove_tag(e, TAGS[t]);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn reverse_indices_match_forward_maps(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut world = World::new();
        let mut created = Vec::new();
        for op in ops {
            apply(&mut world, &mut created, op);
        }

        let alive: BTreeSet<EntityId> = world.entities().into_iter().collect();
        let mut indexed_kinds = 0;
        for kind in ComponentKind::ALL {
            let holders = world.entities_with(kind);
            if !holders.is_empty() {
                indexed_kinds += 1;
            }
            for &e in &holders {
                prop_assert!(alive.contains(&e), "{e} indexed under {kind} after destroy");
                prop_assert!(world.has(e, kind));
            }
            for &e in &alive {
                prop_assert_eq!(world.has(e, kind), holders.contains(&e));
            }
            prop_assert_eq!(holders.len(), world.components().len(kind));
        }
        prop_assert_eq!(indexed_kinds, world.indexed_kind_count());

        let mut non_empty_tags = 0;
        for tag in TAGS {
            let members = world.query_by_tag(tag);
            if !members.is_empty() {
                non_empty_tags += 1;
            }
            for e in &members {
                prop_assert!(alive.contains(e));
                prop_assert!(world.has_tag(*e, tag));
            }
            for &e in &alive {
                prop_assert_eq!(world.has_tag(e, tag), members.contains(&e));
            }
        }
        prop_assert_eq!(non_empty_tags, world.tag_count());

        for &e in &created {
            if !alive.contains(&e) {
                prop_assert!(world.kinds_of(e).is_empty());
                prop_assert!(world.tags_of(e).is_empty());
            }
        }
    }

    #[test]
    fn query_equals_brute_force_filter(
        ops in prop::collection::vec(op_strategy(), 1..60),
        mask in 0u8..64,
    ) {
        let mut world = World::new();
        let mut created = Vec::new();
        for op in ops {
            apply(&mut world, &mut created, op);
        }

        let kinds: Vec<ComponentKind> = ComponentKind::ALL
            .into_iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, k)| k)
            .collect();

        let expected: Vec<EntityId> = world
            .entities()
            .into_iter()
            .filter(|&e| kinds.iter().all(|&k| world.has(e, k)))
            .collect();
        let mut reversed = kinds.clone();
        reversed.reverse();

        prop_assert_eq!(world.query(&kinds), expected.clone());
        prop_assert_eq!(world.query(&reversed), expected);
    }
}
