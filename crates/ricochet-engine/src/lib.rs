//! Ricochet Engine -- gameplay systems and frame driver for a 2D arcade game.
//!
//! This crate builds on [`ricochet_ecs`] to provide movement integration,
//! circle collision with start/stay/end pair tracking, a uniform-grid
//! broad phase, edge-triggered input, projectile pruning, a read-only render
//! contract, scenes, spawn timers and the [`Engine`](engine::Engine) that
//! ties them together.
//!
//! # Quick Start
//!
//! ```
//! use ricochet_engine::prelude::*;
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.on_collision("ball", "brick", |world, _ball, brick, phase| {
//!     if phase == CollisionPhase::Start {
//!         world.destroy_entity(brick);
//!     }
//! });
//! engine.load_scene(7, |world, _ctx| {
//!     world.spawn(EntityTemplate::new()
//!         .with(Transform::new(100.0, 100.0))
//!         .with(Physics::new().with_velocity(120.0, 0.0))
//!         .with(Collider::circle(5.0))
//!         .with_tag("ball"));
//!     world.spawn(EntityTemplate::new()
//!         .with(Transform::new(112.0, 100.0))
//!         .with(Collider::circle(5.0))
//!         .with_tag("brick"));
//! });
//!
//! engine.update(1.0 / 60.0);
//! assert!(engine.world().query_by_tag("brick").is_empty());
//! ```

#![deny(unsafe_code)]

pub mod collision;
pub mod config;
pub mod engine;
pub mod input;
pub mod lifetime;
pub mod logging;
pub mod movement;
pub mod render;
pub mod scene;
pub mod spatial;
pub mod spawner;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use ricochet_ecs;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use ricochet_ecs::prelude::*;

    pub use crate::collision::{
        check_collision, circles_overlap, collision_pass, BroadPhase, CollisionCallbacks,
        CollisionPairs, CollisionPhase, CollisionSettings, CollisionStats, CollisionSystem,
        install_destroy_purge, PairKey, COLLISION_SYSTEM_NAME, PAIR_PURGE_LISTENER,
    };
    pub use crate::config::{ConfigError, EngineConfig, SystemPriorities};
    pub use crate::engine::{BuiltinSystems, Engine, FrameDiagnostics};
    pub use crate::input::{Button, InputEvent, InputState, InputSystem, INPUT_SYSTEM_NAME};
    pub use crate::lifetime::{LifetimeSystem, PruneArea, LIFETIME_SYSTEM_NAME};
    pub use crate::movement::{integrate, MovementSystem, MOVEMENT_SYSTEM_NAME};
    pub use crate::render::{collect_render_items, draw, RenderItem, RenderOrder};
    pub use crate::scene::{load_scene, SceneContext, SceneLoad};
    pub use crate::spatial::{CellKey, SpatialGrid};
    pub use crate::spawner::{SpawnFactory, SpawnTimer};
}
