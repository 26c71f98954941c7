//! Ricochet ECS -- entity registry, component arenas and system scheduler for
//! a 2D arcade game.
//!
//! Entities are opaque, never-reused ids. Components come from a closed set of
//! kinds ([`ComponentKind`](component::ComponentKind)); each kind has its own
//! arena plus a reverse index from kind to holders. Systems run once per frame
//! in ascending priority, each over a snapshot of its component query.
//!
//! # Quick Start
//!
//! ```
//! use ricochet_ecs::prelude::*;
//!
//! let mut world = World::new();
//! let ship = world.create_entity();
//! world.attach(ship, Transform::new(0.0, 0.0));
//! world.attach(ship, Physics::new().with_velocity(100.0, 0.0));
//! world.add_tag(ship, "player");
//!
//! let moving = world.query(&[ComponentKind::Transform, ComponentKind::Physics]);
//! assert_eq!(moving, vec![ship]);
//! assert!(world.query_by_tag("player").contains(&ship));
//!
//! world.destroy_entity(ship);
//! assert!(world.query(&[ComponentKind::Transform]).is_empty());
//! ```

#![deny(unsafe_code)]

pub mod command;
pub mod component;
pub mod components;
pub mod entity;
pub mod system;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while applying queued commands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The entity was destroyed or never allocated.
    #[error("entity {entity} does not exist (destroyed or never allocated)")]
    DeadEntity { entity: entity::EntityId },

    /// The entity holds no component of the requested kind.
    #[error("entity {entity} has no {kind} component")]
    MissingComponent {
        entity: entity::EntityId,
        kind: component::ComponentKind,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::command::{ApplyReport, Command, CommandSender, EntityTemplate};
    pub use crate::component::{Component, ComponentData, ComponentKind, ComponentStore};
    pub use crate::components::{
        Bounds, Canvas, Collider, ColliderHook, ColliderHooks, Color, DrawHook, Lifetime,
        Physics, Renderer, ScriptFn, ScriptHook, ScriptedBehavior, Shape, Transform, Visual,
        MIN_MASS,
    };
    pub use crate::entity::{EntityAllocator, EntityId};
    pub use crate::system::{FnSystem, ScriptSystem, System, SystemId, SCRIPT_PRIORITY};
    pub use crate::world::{DestroyListener, SystemTiming, UpdateReport, World};
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
