//! Systems and their ordering.
//!
//! A [`System`] declares a priority and the component kinds it requires. Each
//! frame the world resolves that requirement into a snapshot of matching
//! entities and hands it to [`System::update`]. Systems run in ascending
//! priority; equal priorities keep insertion order.
//!
//! # Example
//!
//! ```
//! use ricochet_ecs::prelude::*;
//!
//! let mut world = World::new();
//! world.add_system(FnSystem::new(
//!     "drift",
//!     10,
//!     &[ComponentKind::Transform],
//!     |world, entities, dt| {
//!         for &e in entities {
//!             if let Some(t) = world.get_mut::<Transform>(e) {
//!                 t.x += dt;
//!             }
//!         }
//!     },
//! ));
//!
//! let e = world.create_entity();
//! world.attach(e, Transform::new(0.0, 0.0));
//! world.update(1.0);
//! assert_eq!(world.get::<Transform>(e).map(|t| t.x), Some(1.0));
//! ```

use std::fmt;

use crate::component::ComponentKind;
use crate::components::ScriptedBehavior;
use crate::entity::EntityId;
use crate::world::World;

// ---------------------------------------------------------------------------
// SystemId
// ---------------------------------------------------------------------------

/// Handle returned by [`World::add_system`](crate::world::World::add_system).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub(crate) u64);

// ---------------------------------------------------------------------------
// System trait
// ---------------------------------------------------------------------------

/// A per-frame processor.
///
/// Systems hold no world reference. The world is passed into the lifecycle
/// hooks and into every update call.
pub trait System {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Lower runs earlier. Read once when the system is added.
    fn priority(&self) -> i32 {
        0
    }

    /// Component kinds an entity must hold to be passed to `update`. Empty
    /// means every live entity.
    fn requires(&self) -> &[ComponentKind] {
        &[]
    }

    /// Called once when the system is added to a world.
    fn on_attach(&mut self, _world: &mut World) {}

    /// Called once when the system is removed from a world.
    fn on_detach(&mut self, _world: &mut World) {}

    /// Process one frame. `entities` is a snapshot taken right before the
    /// call; entries may be destroyed while the system runs, so check
    /// [`World::is_alive`](crate::world::World::is_alive) or rely on component
    /// lookups returning `None`.
    fn update(&mut self, world: &mut World, entities: &[EntityId], dt: f64);
}

// ---------------------------------------------------------------------------
// FnSystem
// ---------------------------------------------------------------------------

type SystemFn = Box<dyn FnMut(&mut World, &[EntityId], f64)>;

/// A system built from a closure.
pub struct FnSystem {
    name: String,
    priority: i32,
    requires: Vec<ComponentKind>,
    func: SystemFn,
}

impl FnSystem {
    pub fn new(
        name: &str,
        priority: i32,
        requires: &[ComponentKind],
        func: impl FnMut(&mut World, &[EntityId], f64) + 'static,
    ) -> Self {
        Self {
            name: name.to_owned(),
            priority,
            requires: requires.to_vec(),
            func: Box::new(func),
        }
    }
}

impl fmt::Debug for FnSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSystem")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("requires", &self.requires)
            .finish()
    }
}

impl System for FnSystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn requires(&self) -> &[ComponentKind] {
        &self.requires
    }

    fn update(&mut self, world: &mut World, entities: &[EntityId], dt: f64) {
        (self.func)(world, entities, dt);
    }
}

// ---------------------------------------------------------------------------
// ScriptSystem
// ---------------------------------------------------------------------------

/// Default priority of [`ScriptSystem`]: after input, before movement.
pub const SCRIPT_PRIORITY: i32 = 50;

/// Runs every [`ScriptedBehavior`] script once per frame.
///
/// Scripts of one entity run in name order. If a script destroys its own
/// entity, the remaining scripts of that entity are skipped.
#[derive(Debug)]
pub struct ScriptSystem {
    priority: i32,
}

impl ScriptSystem {
    pub fn new() -> Self {
        Self {
            priority: SCRIPT_PRIORITY,
        }
    }

    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for ScriptSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ScriptSystem {
    fn name(&self) -> &str {
        "scripts"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn requires(&self) -> &[ComponentKind] {
        &[ComponentKind::ScriptedBehavior]
    }

    fn update(&mut self, world: &mut World, entities: &[EntityId], dt: f64) {
        for &entity in entities {
            let Some(scripts) = world.get::<ScriptedBehavior>(entity).map(|s| s.snapshot()) else {
                continue;
            };
            for (_name, script) in scripts {
                if !world.is_alive(entity) {
                    break;
                }
                script(world, entity, dt);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

pub(crate) struct RegisteredSystem {
    pub(crate) id: SystemId,
    seq: u64,
    priority: i32,
    pub(crate) system: Box<dyn System>,
}

/// Ordered system list. Kept sorted by `(priority, insertion sequence)`.
#[derive(Default)]
pub(crate) struct Schedule {
    entries: Vec<RegisteredSystem>,
    next_id: u64,
}

impl Schedule {
    pub(crate) fn allocate_id(&mut self) -> SystemId {
        self.next_id += 1;
        SystemId(self.next_id)
    }

    /// Insert an entry with a previously allocated id. Ids grow with every
    /// allocation, so the id doubles as the insertion sequence.
    pub(crate) fn insert(&mut self, id: SystemId, system: Box<dyn System>) {
        let priority = system.priority();
        self.entries.push(RegisteredSystem {
            id,
            seq: id.0,
            priority,
            system,
        });
        self.sort();
    }

    /// Merge entries back in (used after a frame pass).
    pub(crate) fn extend(&mut self, entries: Vec<RegisteredSystem>) {
        self.entries.extend(entries);
        self.sort();
    }

    fn sort(&mut self) {
        self.entries.sort_by_key(|e| (e.priority, e.seq));
    }

    /// Remove one entry without disturbing the order of the others.
    pub(crate) fn remove(&mut self, id: SystemId) -> Option<Box<dyn System>> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx).system)
    }

    pub(crate) fn take_all(&mut self) -> Vec<RegisteredSystem> {
        std::mem::take(&mut self.entries)
    }

    pub(crate) fn ids(&self) -> Vec<SystemId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub(crate) fn contains(&self, id: SystemId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.system.name().to_owned())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
