//! Interval spawn timers.
//!
//! A [`SpawnTimer`] lives outside the world (in the host's timer code, for
//! instance) and is fed elapsed time. Each time its interval elapses it
//! builds an [`EntityTemplate`] with a seeded generator and sends it as a
//! spawn command. It never touches the world: the entity appears when the
//! world next drains its command queue.
//!
//! ```
//! use ricochet_engine::scene::SceneContext;
//! use ricochet_engine::spawner::SpawnTimer;
//! use ricochet_ecs::prelude::*;
//! use rand::Rng;
//!
//! let mut world = World::new();
//! let ctx = SceneContext::new(800.0, 600.0, 42);
//! let mut timer = SpawnTimer::new(0.5, world.command_sender(), ctx, |rng, ctx| {
//!     EntityTemplate::new()
//!         .with(Transform::new(rng.gen_range(0.0..ctx.width), 0.0))
//!         .with_tag("asteroid")
//! });
//!
//! assert_eq!(timer.advance(1.2), 2);
//! assert_eq!(world.query_by_tag("asteroid").len(), 0);
//! world.apply_commands();
//! assert_eq!(world.query_by_tag("asteroid").len(), 2);
//! ```

use std::fmt;
use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use tracing::trace;

use ricochet_ecs::prelude::*;

use crate::scene::SceneContext;

/// Builds one entity per firing.
pub type SpawnFactory = Rc<dyn Fn(&mut Pcg32, &SceneContext) -> EntityTemplate>;

/// Fires a spawn command every `interval` seconds of fed time.
pub struct SpawnTimer {
    interval: f64,
    accumulated: f64,
    paused: bool,
    fired: u64,
    rng: Pcg32,
    context: SceneContext,
    sender: CommandSender,
    factory: SpawnFactory,
}

impl SpawnTimer {
    /// A timer seeded from `context.seed`. A non-positive or non-finite
    /// interval never fires.
    pub fn new(
        interval: f64,
        sender: CommandSender,
        context: SceneContext,
        factory: impl Fn(&mut Pcg32, &SceneContext) -> EntityTemplate + 'static,
    ) -> Self {
        Self {
            interval,
            accumulated: 0.0,
            paused: false,
            fired: 0,
            rng: Pcg32::seed_from_u64(context.seed),
            context,
            sender,
            factory: Rc::new(factory),
        }
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Change the cadence. Time already accumulated is kept.
    pub fn set_interval(&mut self, interval: f64) {
        self.interval = interval;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Total firings since creation.
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Feed `elapsed` seconds. Returns how many spawn commands were sent.
    pub fn advance(&mut self, elapsed: f64) -> usize {
        if self.paused || !(self.interval.is_finite() && self.interval > 0.0) {
            return 0;
        }
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulated += elapsed;
        }
        let mut count = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            self.fire();
            count += 1;
        }
        count
    }

    /// Send one spawn command now, regardless of the interval.
    pub fn fire(&mut self) {
        let template = (self.factory)(&mut self.rng, &self.context);
        self.fired += 1;
        trace!(fired = self.fired, tags = ?template.tags, "spawn timer fired");
        self.sender.spawn(template);
    }

    /// Restart timing and reseed the generator from the context.
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
        self.fired = 0;
        self.rng = Pcg32::seed_from_u64(self.context.seed);
    }
}

impl fmt::Debug for SpawnTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnTimer")
            .field("interval", &self.interval)
            .field("accumulated", &self.accumulated)
            .field("paused", &self.paused)
            .field("fired", &self.fired)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    fn xs(world: &World) -> Vec<f64> {
        world
            .query(&[ComponentKind::Transform])
            .into_iter()
            .filter_map(|e| world.get::<Transform>(e).map(|t| t.x))
            .collect()
    }

    fn random_x_timer(world: &World, seed: u64) -> SpawnTimer {
        SpawnTimer::new(
            1.0,
            world.command_sender(),
            SceneContext::new(100.0, 100.0, seed),
            |rng, ctx| EntityTemplate::new().with(Transform::new(rng.gen_range(0.0..ctx.width), 0.0)),
        )
    }

    #[test]
    fn same_seed_spawns_the_same_positions() {
        let mut a = World::new();
        let mut b = World::new();
        random_x_timer(&a, 9).advance(5.0);
        random_x_timer(&b, 9).advance(5.0);
        a.apply_commands();
        b.apply_commands();
        assert_eq!(xs(&a).len(), 5);
        assert_eq!(xs(&a), xs(&b));
    }

    #[test]
    fn leftover_time_carries_over() {
        let world = World::new();
        let mut timer = random_x_timer(&world, 1);
        assert_eq!(timer.advance(0.6), 0);
        assert_eq!(timer.advance(0.6), 1);
        assert_eq!(timer.advance(0.8), 1);
        assert_eq!(world.pending_commands(), 2);
    }

    #[test]
    fn paused_timer_does_not_accumulate() {
        let world = World::new();
        let mut timer = random_x_timer(&world, 1);
        timer.pause();
        assert_eq!(timer.advance(10.0), 0);
        timer.resume();
        assert_eq!(timer.advance(0.5), 0);
    }

    #[test]
    fn zero_interval_never_fires() {
        let world = World::new();
        let mut timer = random_x_timer(&world, 1);
        timer.set_interval(0.0);
        assert_eq!(timer.advance(100.0), 0);
    }

    #[test]
    fn reset_replays_the_sequence() {
        let mut world = World::new();
        let mut timer = random_x_timer(&world, 3);
        timer.advance(2.0);
        world.apply_commands();
        let first = xs(&world);
        world.destroy_all_entities();
        timer.reset();
        timer.advance(2.0);
        world.apply_commands();
        assert_eq!(xs(&world), first);
    }
}
