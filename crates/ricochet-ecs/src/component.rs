//! Component kinds, the erased [`Component`] value and per-kind arenas.
//!
//! The component model is closed: [`ComponentKind`] enumerates every kind the
//! world can store, and each kind has one arena in the [`ComponentStore`].
//! Typed access goes through [`ComponentData`], which ties a Rust type to its
//! kind and its arena.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::{Collider, Lifetime, Physics, Renderer, ScriptedBehavior, Transform};
use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// ComponentKind
// ---------------------------------------------------------------------------

/// Identifier for a component kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Transform,
    Physics,
    Collider,
    Renderer,
    Lifetime,
    ScriptedBehavior,
}

impl ComponentKind {
    /// Every kind, in declaration order.
    pub const ALL: [ComponentKind; 6] = [
        ComponentKind::Transform,
        ComponentKind::Physics,
        ComponentKind::Collider,
        ComponentKind::Renderer,
        ComponentKind::Lifetime,
        ComponentKind::ScriptedBehavior,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Transform => "transform",
            ComponentKind::Physics => "physics",
            ComponentKind::Collider => "collider",
            ComponentKind::Renderer => "renderer",
            ComponentKind::Lifetime => "lifetime",
            ComponentKind::ScriptedBehavior => "scripted_behavior",
        }
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A component value of any kind. Used where the kind is only known at
/// runtime: templates, commands and detach results.
#[derive(Debug, Clone)]
pub enum Component {
    Transform(Transform),
    Physics(Physics),
    Collider(Collider),
    Renderer(Renderer),
    Lifetime(Lifetime),
    ScriptedBehavior(ScriptedBehavior),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Transform(_) => ComponentKind::Transform,
            Component::Physics(_) => ComponentKind::Physics,
            Component::Collider(_) => ComponentKind::Collider,
            Component::Renderer(_) => ComponentKind::Renderer,
            Component::Lifetime(_) => ComponentKind::Lifetime,
            Component::ScriptedBehavior(_) => ComponentKind::ScriptedBehavior,
        }
    }

    /// The owning entity recorded on the wrapped value.
    pub fn owner(&self) -> Option<EntityId> {
        match self {
            Component::Transform(c) => c.owner(),
            Component::Physics(c) => c.owner(),
            Component::Collider(c) => c.owner(),
            Component::Renderer(c) => c.owner(),
            Component::Lifetime(c) => c.owner(),
            Component::ScriptedBehavior(c) => c.owner(),
        }
    }
}

// ---------------------------------------------------------------------------
// ComponentData
// ---------------------------------------------------------------------------

/// A Rust type that is one of the built-in component kinds.
///
/// Arenas are only mutated through the world's attach and detach helpers.
pub trait ComponentData: Clone + 'static {
    const KIND: ComponentKind;

    fn owner(&self) -> Option<EntityId>;

    #[doc(hidden)]
    fn set_owner(&mut self, owner: Option<EntityId>);

    /// Runs after the component is stored on `owner`.
    fn on_attach(&mut self, _owner: EntityId) {}

    /// Runs after the component is taken off `owner`, before the back
    /// reference is cleared.
    fn on_detach(&mut self, _owner: EntityId) {}

    fn into_component(self) -> Component;

    fn from_component(component: Component) -> Option<Self>;

    fn arena(store: &ComponentStore) -> &HashMap<EntityId, Self>;

    #[doc(hidden)]
    fn arena_mut(store: &mut ComponentStore) -> &mut HashMap<EntityId, Self>;
}

macro_rules! component_data {
    ($ty:ident, $field:ident) => {
        impl ComponentData for $ty {
            const KIND: ComponentKind = ComponentKind::$ty;

            fn owner(&self) -> Option<EntityId> {
                self.owner
            }

            fn set_owner(&mut self, owner: Option<EntityId>) {
                self.owner = owner;
            }

            fn into_component(self) -> Component {
                Component::$ty(self)
            }

            fn from_component(component: Component) -> Option<Self> {
                match component {
                    Component::$ty(c) => Some(c),
                    _ => None,
                }
            }

            fn arena(store: &ComponentStore) -> &HashMap<EntityId, Self> {
                &store.$field
            }

            fn arena_mut(store: &mut ComponentStore) -> &mut HashMap<EntityId, Self> {
                &mut store.$field
            }
        }

        impl From<$ty> for Component {
            fn from(value: $ty) -> Self {
                Component::$ty(value)
            }
        }
    };
}

component_data!(Transform, transforms);
component_data!(Physics, physics);
component_data!(Collider, colliders);
component_data!(Renderer, renderers);
component_data!(Lifetime, lifetimes);

impl ComponentData for ScriptedBehavior {
    const KIND: ComponentKind = ComponentKind::ScriptedBehavior;

    fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    fn set_owner(&mut self, owner: Option<EntityId>) {
        self.owner = owner;
    }

    fn on_attach(&mut self, owner: EntityId) {
        self.fire_attach(owner);
    }

    fn on_detach(&mut self, owner: EntityId) {
        self.fire_detach(owner);
    }

    fn into_component(self) -> Component {
        Component::ScriptedBehavior(self)
    }

    fn from_component(component: Component) -> Option<Self> {
        match component {
            Component::ScriptedBehavior(c) => Some(c),
            _ => None,
        }
    }

    fn arena(store: &ComponentStore) -> &HashMap<EntityId, Self> {
        &store.scripts
    }

    fn arena_mut(store: &mut ComponentStore) -> &mut HashMap<EntityId, Self> {
        &mut store.scripts
    }
}

impl From<ScriptedBehavior> for Component {
    fn from(value: ScriptedBehavior) -> Self {
        Component::ScriptedBehavior(value)
    }
}

// ---------------------------------------------------------------------------
// ComponentStore
// ---------------------------------------------------------------------------

/// One arena per component kind, keyed by owning entity.
#[derive(Debug, Default)]
pub struct ComponentStore {
    transforms: HashMap<EntityId, Transform>,
    physics: HashMap<EntityId, Physics>,
    colliders: HashMap<EntityId, Collider>,
    renderers: HashMap<EntityId, Renderer>,
    lifetimes: HashMap<EntityId, Lifetime>,
    scripts: HashMap<EntityId, ScriptedBehavior>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<C: ComponentData>(&self, entity: EntityId) -> Option<&C> {
        C::arena(self).get(&entity)
    }

    pub(crate) fn get_mut<C: ComponentData>(&mut self, entity: EntityId) -> Option<&mut C> {
        C::arena_mut(self).get_mut(&entity)
    }

    pub(crate) fn insert<C: ComponentData>(&mut self, entity: EntityId, component: C) {
        C::arena_mut(self).insert(entity, component);
    }

    pub(crate) fn remove<C: ComponentData>(&mut self, entity: EntityId) -> Option<C> {
        C::arena_mut(self).remove(&entity)
    }

    /// Whether `entity` holds a component of `kind`.
    pub fn contains(&self, entity: EntityId, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::Transform => self.transforms.contains_key(&entity),
            ComponentKind::Physics => self.physics.contains_key(&entity),
            ComponentKind::Collider => self.colliders.contains_key(&entity),
            ComponentKind::Renderer => self.renderers.contains_key(&entity),
            ComponentKind::Lifetime => self.lifetimes.contains_key(&entity),
            ComponentKind::ScriptedBehavior => self.scripts.contains_key(&entity),
        }
    }

    /// Number of stored components of `kind`.
    pub fn len(&self, kind: ComponentKind) -> usize {
        match kind {
            ComponentKind::Transform => self.transforms.len(),
            ComponentKind::Physics => self.physics.len(),
            ComponentKind::Collider => self.colliders.len(),
            ComponentKind::Renderer => self.renderers.len(),
            ComponentKind::Lifetime => self.lifetimes.len(),
            ComponentKind::ScriptedBehavior => self.scripts.len(),
        }
    }

    /// Total components across all arenas.
    pub fn total(&self) -> usize {
        ComponentKind::ALL.iter().map(|&k| self.len(k)).sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityAllocator;

    #[test]
    fn component_reports_its_kind() {
        assert_eq!(
            Component::from(Transform::new(0.0, 0.0)).kind(),
            ComponentKind::Transform
        );
        assert_eq!(
            Component::from(Collider::circle(1.0)).kind(),
            ComponentKind::Collider
        );
        assert_eq!(
            Component::from(ScriptedBehavior::new()).kind(),
            ComponentKind::ScriptedBehavior
        );
    }

    #[test]
    fn from_component_rejects_other_kinds() {
        let c = Component::from(Physics::new());
        assert!(Transform::from_component(c.clone()).is_none());
        assert!(Physics::from_component(c).is_some());
    }

    #[test]
    fn store_insert_contains_remove() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.allocate();
        let mut store = ComponentStore::new();
        store.insert(e, Transform::new(1.0, 2.0));
        assert!(store.contains(e, ComponentKind::Transform));
        assert!(!store.contains(e, ComponentKind::Physics));
        assert_eq!(store.get::<Transform>(e).map(|t| t.x), Some(1.0));
        assert_eq!(store.total(), 1);
        assert!(store.remove::<Transform>(e).is_some());
        assert_eq!(store.len(ComponentKind::Transform), 0);
    }

    #[test]
    fn kind_names_are_stable() {
        let names: Vec<_> = ComponentKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            vec![
                "transform",
                "physics",
                "collider",
                "renderer",
                "lifetime",
                "scripted_behavior"
            ]
        );
    }
}
