//! Projectile pruning.
//!
//! [`LifetimeSystem`] measures how far each `Transform + Lifetime` entity is
//! from its recorded origin and destroys it once that exceeds the travel
//! budget, or once it leaves the world rectangle by more than the margin.

use tracing::debug;

use ricochet_ecs::prelude::*;

/// Name under which the lifetime system is registered.
pub const LIFETIME_SYSTEM_NAME: &str = "lifetime";

/// World rectangle `[0, width] x [0, height]` grown by `margin` on each side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PruneArea {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PruneArea {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= -self.margin
            && x <= self.width + self.margin
            && y >= -self.margin
            && y <= self.height + self.margin
    }
}

/// Destroys entities whose [`Lifetime`] has run out or that left the play
/// area.
#[derive(Debug, Clone)]
pub struct LifetimeSystem {
    priority: i32,
    area: PruneArea,
}

impl LifetimeSystem {
    pub fn new(priority: i32, area: PruneArea) -> Self {
        Self { priority, area }
    }

    pub fn area(&self) -> PruneArea {
        self.area
    }
}

impl System for LifetimeSystem {
    fn name(&self) -> &str {
        LIFETIME_SYSTEM_NAME
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn requires(&self) -> &[ComponentKind] {
        &[ComponentKind::Transform, ComponentKind::Lifetime]
    }

    fn update(&mut self, world: &mut World, entities: &[EntityId], _dt: f64) {
        let mut pruned = 0usize;
        for &entity in entities {
            let Some((x, y)) = world.get::<Transform>(entity).map(Transform::position) else {
                continue;
            };
            let Some(lifetime) = world.get_mut::<Lifetime>(entity) else {
                continue;
            };
            lifetime.traveled = (x - lifetime.origin_x).hypot(y - lifetime.origin_y);
            if lifetime.expired() || !self.area.contains(x, y) {
                world.destroy_entity(entity);
                pruned += 1;
            }
        }
        if pruned > 0 {
            debug!(pruned, "lifetime pruning");
        }
    }
}
