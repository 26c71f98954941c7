//! Frame driver.
//!
//! The [`Engine`] owns a [`World`] with the built-in systems registered at
//! their configured priorities:
//!
//! | system     | default priority | requires                  |
//! |------------|------------------|---------------------------|
//! | input      | 0                | -                         |
//! | scripts    | 50               | `ScriptedBehavior`        |
//! | movement   | 100              | `Transform + Physics`     |
//! | lifetime   | 200              | `Transform + Lifetime`    |
//! | collision  | 300              | `Transform + Collider`    |
//!
//! Each frame runs every system in that order and then drains the command
//! queue. [`Engine::update`] runs exactly one frame with the given delta;
//! [`Engine::advance`] feeds wall-clock time into a fixed-step accumulator.
//!
//! # Example
//!
//! ```
//! use ricochet_engine::config::EngineConfig;
//! use ricochet_engine::engine::Engine;
//! use ricochet_ecs::prelude::*;
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.load_scene(1, |world, _ctx| {
//!     world.spawn(EntityTemplate::new()
//!         .with(Transform::new(0.0, 0.0))
//!         .with(Physics::new().with_velocity(60.0, 0.0)));
//! });
//!
//! let steps = engine.advance(0.5);
//! assert_eq!(steps, 5);
//! assert_eq!(engine.frame_count(), 5);
//! ```

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use ricochet_ecs::prelude::*;

use crate::collision::{
    CollisionCallbacks, CollisionPairs, CollisionPhase, CollisionSettings, CollisionSystem,
};
use crate::config::EngineConfig;
use crate::input::{InputEvent, InputState, InputSystem};
use crate::lifetime::{LifetimeSystem, PruneArea};
use crate::movement::MovementSystem;
use crate::render::{collect_render_items, draw, RenderItem, RenderOrder};
use crate::scene::{load_scene, SceneContext, SceneLoad};
use crate::spatial::SpatialGrid;
use crate::spawner::SpawnTimer;

// ---------------------------------------------------------------------------
// FrameDiagnostics
// ---------------------------------------------------------------------------

/// Timing and bookkeeping for the last frame.
#[derive(Debug, Clone, Default)]
pub struct FrameDiagnostics {
    /// Wall-clock time per system, in execution order.
    pub system_times: Vec<(String, Duration)>,
    /// Total time for the frame (systems + command apply).
    pub total_time: Duration,
    /// Commands applied at the end of the frame.
    pub commands: ApplyReport,
    /// Live entities after the frame.
    pub entity_count: usize,
}

// ---------------------------------------------------------------------------
// BuiltinSystems
// ---------------------------------------------------------------------------

/// Ids of the systems the engine registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinSystems {
    pub input: SystemId,
    pub scripts: SystemId,
    pub movement: SystemId,
    pub lifetime: SystemId,
    pub collision: SystemId,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// A world plus its built-in systems and frame bookkeeping.
pub struct Engine {
    world: World,
    config: EngineConfig,
    systems: BuiltinSystems,
    context: SceneContext,
    frame_counter: u64,
    accumulator: f64,
    last_diagnostics: FrameDiagnostics,
}

impl Engine {
    /// Build an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(InputState::new());
        world.insert_resource(CollisionCallbacks::new());
        world.insert_resource(CollisionPairs::default());
        world.insert_resource(SpatialGrid::new(config.width, config.height, config.cell_size));

        let p = config.priorities;
        let systems = BuiltinSystems {
            input: world.add_system(InputSystem::new(p.input)),
            scripts: world.add_system(ScriptSystem::with_priority(p.scripts)),
            movement: world.add_system(MovementSystem::new(p.movement, config.friction_epsilon)),
            lifetime: world.add_system(LifetimeSystem::new(p.lifetime, prune_area(&config))),
            collision: world.add_system(CollisionSystem::new(
                p.collision,
                collision_settings(&config),
            )),
        };
        info!(
            width = config.width,
            height = config.height,
            broad_phase = ?config.broad_phase,
            "engine created"
        );

        Self {
            context: SceneContext::new(config.width, config.height, 0),
            world,
            config,
            systems,
            frame_counter: 0,
            accumulator: 0.0,
            last_diagnostics: FrameDiagnostics::default(),
        }
    }

    /// Run one frame with `dt` seconds.
    pub fn update(&mut self, dt: f64) -> &FrameDiagnostics {
        let frame_start = Instant::now();
        let report = self.world.update(dt);
        self.frame_counter += 1;

        self.last_diagnostics = FrameDiagnostics {
            system_times: report
                .systems
                .into_iter()
                .map(|t| (t.name, t.elapsed))
                .collect(),
            total_time: frame_start.elapsed(),
            commands: report.commands,
            entity_count: self.world.entity_count(),
        };
        &self.last_diagnostics
    }

    /// Feed `elapsed` wall-clock seconds and run as many fixed steps as fit,
    /// at most `max_steps_per_frame`. Time beyond the cap is dropped.
    /// Returns the number of frames run.
    pub fn advance(&mut self, elapsed: f64) -> u32 {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulator += elapsed;
        }
        let dt = self.config.fixed_dt;
        let mut steps = 0;
        // tolerance keeps 0.1 / (1/60)-style sums from losing a step to rounding
        let epsilon = dt * 1e-9;
        while self.accumulator + epsilon >= dt && steps < self.config.max_steps_per_frame {
            self.update(dt);
            self.accumulator = (self.accumulator - dt).max(0.0);
            steps += 1;
        }
        if self.accumulator + epsilon >= dt {
            warn!(
                dropped = self.accumulator,
                max_steps = self.config.max_steps_per_frame,
                "frame budget exceeded, dropping simulation time"
            );
            self.accumulator = 0.0;
        }
        steps
    }

    /// Share of a fixed step left in the accumulator, in `[0, 1)`.
    pub fn interpolation_alpha(&self) -> f64 {
        self.accumulator / self.config.fixed_dt
    }

    /// Replace every entity with a new scene seeded by `seed`.
    pub fn load_scene(
        &mut self,
        seed: u64,
        setup: impl FnOnce(&mut World, &SceneContext),
    ) -> SceneLoad {
        self.context = SceneContext::new(self.config.width, self.config.height, seed);
        self.accumulator = 0.0;
        if let Some(input) = self.world.resource_mut::<InputState>() {
            input.reset();
        }
        load_scene(&mut self.world, &self.context, setup)
    }

    /// Change the world extent. The spatial grid and the pruning area follow.
    pub fn resize(&mut self, width: f64, height: f64) {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            warn!(width, height, "ignoring invalid resize");
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.context.width = width;
        self.context.height = height;
        if let Some(grid) = self.world.resource_mut::<SpatialGrid>() {
            grid.resize(width, height);
        }
        self.world.remove_system(self.systems.lifetime);
        self.systems.lifetime = self.world.add_system(LifetimeSystem::new(
            self.config.priorities.lifetime,
            prune_area(&self.config),
        ));
        debug!(width, height, "engine resized");
    }

    // -- gameplay helpers ---------------------------------------------------

    /// Register a tag-pair collision callback.
    pub fn on_collision(
        &mut self,
        first_tag: &str,
        second_tag: &str,
        callback: impl Fn(&mut World, EntityId, EntityId, CollisionPhase) + 'static,
    ) {
        if !self.world.has_resource::<CollisionCallbacks>() {
            self.world.insert_resource(CollisionCallbacks::new());
        }
        if let Some(callbacks) = self.world.resource_mut::<CollisionCallbacks>() {
            callbacks.on(first_tag, second_tag, callback);
        }
    }

    /// Queue an input event for the next frame.
    pub fn push_input(&mut self, event: InputEvent) {
        if let Some(input) = self.world.resource_mut::<InputState>() {
            input.push_event(event);
        }
    }

    /// A spawn timer bound to this engine's command queue and current scene.
    pub fn spawn_timer(
        &self,
        interval: f64,
        factory: impl Fn(&mut rand_pcg::Pcg32, &SceneContext) -> EntityTemplate + 'static,
    ) -> SpawnTimer {
        SpawnTimer::new(interval, self.world.command_sender(), self.context, factory)
    }

    pub fn command_sender(&self) -> CommandSender {
        self.world.command_sender()
    }

    /// Draw the current state onto `canvas`. Returns the number of items.
    pub fn render(&self, canvas: &mut dyn Canvas) -> usize {
        draw(&self.world, canvas)
    }

    pub fn render_items(&self, order: RenderOrder) -> Vec<RenderItem> {
        collect_render_items(&self.world, order)
    }

    // -- accessors ----------------------------------------------------------

    /// The number of frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene_context(&self) -> &SceneContext {
        &self.context
    }

    pub fn systems(&self) -> BuiltinSystems {
        self.systems
    }

    /// Diagnostics from the last frame.
    pub fn last_diagnostics(&self) -> &FrameDiagnostics {
        &self.last_diagnostics
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for setup and tests. During play prefer systems
    /// and the command queue.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("world", &self.world)
            .field("frame_counter", &self.frame_counter)
            .field("accumulator", &self.accumulator)
            .finish()
    }
}

fn prune_area(config: &EngineConfig) -> PruneArea {
    PruneArea {
        width: config.width,
        height: config.height,
        margin: config.prune_margin,
    }
}

fn collision_settings(config: &EngineConfig) -> CollisionSettings {
    CollisionSettings {
        broad_phase: config.broad_phase,
        correction_percent: config.correction_percent,
        width: config.width,
        height: config.height,
        cell_size: config.cell_size,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::config::SystemPriorities;
    use crate::input::Button;

    #[test]
    fn builtin_systems_run_in_priority_order() {
        let engine = Engine::default();
        assert_eq!(
            engine.world().system_names(),
            vec!["input", "scripts", "movement", "lifetime", "collision"]
        );
    }

    #[test]
    fn configured_priorities_reorder_systems() {
        let config = EngineConfig {
            priorities: SystemPriorities {
                collision: 150,
                ..SystemPriorities::default()
            },
            ..EngineConfig::default()
        };
        let engine = Engine::new(config);
        assert_eq!(
            engine.world().system_names(),
            vec!["input", "scripts", "movement", "collision", "lifetime"]
        );
    }

    #[test]
    fn update_records_diagnostics() {
        let mut engine = Engine::default();
        engine.world_mut().spawn(EntityTemplate::new().with(Transform::default()));
        let diag = engine.update(0.016);
        assert_eq!(diag.system_times.len(), 5);
        assert_eq!(diag.entity_count, 1);
        assert_eq!(engine.frame_count(), 1);
    }

    #[test]
    fn advance_caps_steps_and_drops_the_excess() {
        let mut engine = Engine::default();
        let steps = engine.advance(1.0);
        assert_eq!(steps, 5);
        assert!(engine.interpolation_alpha() < 1.0);
        assert_eq!(engine.advance(0.0), 0);
    }

    #[test]
    fn advance_keeps_the_remainder() {
        let mut engine = Engine::default();
        assert_eq!(engine.advance(0.01), 0);
        assert_eq!(engine.advance(0.01), 1);
        assert!(engine.interpolation_alpha() > 0.0);
    }

    #[test]
    fn load_scene_resets_input_and_entities() {
        let mut engine = Engine::default();
        engine.push_input(InputEvent::Press(Button::key("Space")));
        engine.update(0.016);
        engine.world_mut().spawn(EntityTemplate::new().with_tag("old"));

        let load = engine.load_scene(99, |world, ctx| {
            assert_eq!(ctx.seed, 99);
            world.spawn(EntityTemplate::new().with_tag("new"));
        });
        assert_eq!(load.destroyed, 1);
        assert_eq!(engine.scene_context().seed, 99);
        let input = engine.world().resource::<InputState>().cloned().unwrap_or_default();
        assert!(!input.is_pressed(&Button::key("Space")));
    }

    #[test]
    fn resize_updates_grid_and_pruning_area() {
        let mut engine = Engine::default();
        let before = engine.systems().lifetime;
        engine.resize(1600.0, 1200.0);
        assert_ne!(engine.systems().lifetime, before);
        assert_eq!(engine.world().system_count(), 5);
        let dims = engine.world().resource::<SpatialGrid>().map(|g| g.dimensions());
        assert_eq!(dims, Some((25, 19)));

        let far = engine.world_mut().spawn(
            EntityTemplate::new()
                .with(Transform::new(1500.0, 100.0))
                .with(Lifetime::new(1500.0, 100.0, 100.0)),
        );
        engine.update(0.016);
        assert!(engine.world().is_alive(far));
    }

    #[test]
    fn invalid_resize_is_ignored() {
        let mut engine = Engine::default();
        engine.resize(0.0, f64::NAN);
        assert_eq!(engine.config().width, 800.0);
    }

    #[test]
    fn on_collision_registers_a_callback() {
        let mut engine = Engine::default();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        engine.on_collision("a", "b", move |_, _, _, phase| {
            if phase == CollisionPhase::Start {
                h.set(h.get() + 1);
            }
        });
        let world = engine.world_mut();
        world.spawn(
            EntityTemplate::new()
                .with(Transform::new(10.0, 10.0))
                .with(Collider::circle(5.0))
                .with_tag("a"),
        );
        world.spawn(
            EntityTemplate::new()
                .with(Transform::new(14.0, 10.0))
                .with(Collider::circle(5.0))
                .with_tag("b"),
        );
        engine.update(0.016);
        engine.update(0.016);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn spawn_timer_output_appears_after_the_next_frame() {
        let mut engine = Engine::default();
        let mut timer = engine.spawn_timer(0.1, |_, _| EntityTemplate::new().with_tag("rock"));
        timer.advance(0.25);
        assert!(engine.world().query_by_tag("rock").is_empty());
        engine.update(0.016);
        assert_eq!(engine.world().query_by_tag("rock").len(), 2);
    }
}
