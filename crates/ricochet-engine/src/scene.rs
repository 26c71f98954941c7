//! Scene loading.
//!
//! A scene is a setup function that populates an empty world. Loading one
//! destroys every entity (systems and resources stay), flushes commands
//! queued for the old scene, and then calls the setup function.

use serde::{Deserialize, Serialize};
use tracing::debug;

use ricochet_ecs::prelude::*;

/// Game-level facts a scene setup needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneContext {
    pub width: f64,
    pub height: f64,
    /// Seed for any randomness the scene or its spawners use.
    pub seed: u64,
}

impl SceneContext {
    pub fn new(width: f64, height: f64, seed: u64) -> Self {
        Self { width, height, seed }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width * 0.5, self.height * 0.5)
    }
}

/// What happened while loading a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneLoad {
    /// Entities destroyed from the previous scene.
    pub destroyed: usize,
    /// Commands queued for the previous scene, applied and then cleared away.
    pub flushed_commands: usize,
    /// Entities alive after setup.
    pub spawned: usize,
}

/// Replace the world's contents with a new scene.
///
/// Pending commands are applied before the old entities are removed so that
/// any spawns they contain are removed with them.
pub fn load_scene(
    world: &mut World,
    context: &SceneContext,
    setup: impl FnOnce(&mut World, &SceneContext),
) -> SceneLoad {
    let report = world.apply_commands();
    let destroyed = world.destroy_all_entities();
    // detach hooks may have queued more work for the old scene
    let late = world.apply_commands();
    let late_destroyed = world.destroy_all_entities();

    setup(world, context);

    let load = SceneLoad {
        destroyed: destroyed + late_destroyed,
        flushed_commands: report.total() + late.total(),
        spawned: world.entity_count(),
    };
    debug!(
        destroyed = load.destroyed,
        flushed = load.flushed_commands,
        spawned = load.spawned,
        "scene loaded"
    );
    load
}
