//! Movement integration.
//!
//! Every frame the [`MovementSystem`] advances each entity holding both a
//! [`Transform`] and a [`Physics`] component:
//!
//! 1. position += velocity * dt (explicit Euler),
//! 2. velocity *= (1 - friction)^dt, snapping tiny components to zero,
//! 3. rotation += angular velocity * dt,
//! 4. clamp into the physics bounds, reflecting or killing velocity per axis.
//!
//! Friction decay is frame-rate independent: two steps of `dt/2` decay the
//! velocity exactly as much as one step of `dt`.

use ricochet_ecs::prelude::*;

/// Name under which the movement system is registered.
pub const MOVEMENT_SYSTEM_NAME: &str = "movement";

/// Default snap threshold for decaying velocity components.
pub const DEFAULT_FRICTION_EPSILON: f64 = 1e-3;

// ---------------------------------------------------------------------------
// Integration step
// ---------------------------------------------------------------------------

/// Advance one body by `dt` seconds.
pub fn integrate(transform: &mut Transform, physics: &mut Physics, dt: f64, friction_epsilon: f64) {
    transform.x += physics.vx * dt;
    transform.y += physics.vy * dt;

    let friction = physics.friction();
    if friction > 0.0 {
        let decay = (1.0 - friction).powf(dt);
        physics.vx *= decay;
        physics.vy *= decay;
        if physics.vx.abs() < friction_epsilon {
            physics.vx = 0.0;
        }
        if physics.vy.abs() < friction_epsilon {
            physics.vy = 0.0;
        }
    }

    if physics.angular_velocity != 0.0 {
        transform.rotation += physics.angular_velocity * dt;
    }

    if let Some(bounds) = physics.bounds() {
        let (vx, bounce_x) = (physics.vx, physics.bounce_x());
        let (vy, bounce_y) = (physics.vy, physics.bounce_y());
        (transform.x, physics.vx) = clamp_axis(transform.x, vx, bounds.min_x, bounds.max_x, bounce_x);
        (transform.y, physics.vy) = clamp_axis(transform.y, vy, bounds.min_y, bounds.max_y, bounce_y);
    }
}

/// Clamp one axis. Returns the new position and velocity.
fn clamp_axis(pos: f64, vel: f64, min: f64, max: f64, bounce: f64) -> (f64, f64) {
    if pos < min {
        (min, if bounce > 0.0 { vel.abs() * bounce } else { 0.0 })
    } else if pos > max {
        (max, if bounce > 0.0 { -vel.abs() * bounce } else { 0.0 })
    } else {
        (pos, vel)
    }
}

// ---------------------------------------------------------------------------
// MovementSystem
// ---------------------------------------------------------------------------

/// Applies [`integrate`] to every `Transform + Physics` entity.
#[derive(Debug, Clone)]
pub struct MovementSystem {
    priority: i32,
    friction_epsilon: f64,
}

impl MovementSystem {
    pub fn new(priority: i32, friction_epsilon: f64) -> Self {
        Self {
            priority,
            friction_epsilon,
        }
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new(100, DEFAULT_FRICTION_EPSILON)
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        MOVEMENT_SYSTEM_NAME
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn requires(&self) -> &[ComponentKind] {
        &[ComponentKind::Transform, ComponentKind::Physics]
    }

    fn update(&mut self, world: &mut World, entities: &[EntityId], dt: f64) {
        for &entity in entities {
            let Some(mut physics) = world.get::<Physics>(entity).cloned() else {
                continue;
            };
            let Some(transform) = world.get_mut::<Transform>(entity) else {
                continue;
            };
            integrate(transform, &mut physics, dt, self.friction_epsilon);
            if let Some(slot) = world.get_mut::<Physics>(entity) {
                *slot = physics;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
