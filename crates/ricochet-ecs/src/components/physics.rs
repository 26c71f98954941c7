//! Velocity, friction, restitution, bounds and mass.
//!
//! Every setter clamps into the documented range instead of rejecting input:
//! friction and bounce live in `[0, 1]`, mass is floored at [`MIN_MASS`], and
//! bounds given with min/max swapped are normalised. Deserialized bodies go
//! through the same setters.
//!
//! A mass of `f64::INFINITY` makes a body immovable: its inverse mass is 0,
//! so collision response never changes its velocity or position.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Smallest finite mass a body can have. Keeps `1 / mass` finite.
pub const MIN_MASS: f64 = 1e-4;

/// Axis-aligned rectangle an entity's position is confined to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Build bounds, swapping any axis whose min exceeds its max.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// Whether `(x, y)` lies inside the rectangle (edges included).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Physical state integrated by the movement system and used by collision
/// response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PhysicsDef")]
pub struct Physics {
    /// Horizontal velocity in units per second.
    pub vx: f64,
    /// Vertical velocity in units per second.
    pub vy: f64,
    /// Rotational velocity in radians per second.
    pub angular_velocity: f64,
    friction: f64,
    bounce_x: f64,
    bounce_y: f64,
    bounds: Option<Bounds>,
    mass: f64,
    #[serde(skip)]
    pub(crate) owner: Option<EntityId>,
}

impl Physics {
    /// A unit-mass body at rest with no friction, bounce or bounds.
    pub fn new() -> Self {
        Self {
            vx: 0.0,
            vy: 0.0,
            angular_velocity: 0.0,
            friction: 0.0,
            bounce_x: 0.0,
            bounce_y: 0.0,
            bounds: None,
            mass: 1.0,
            owner: None,
        }
    }

    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: f64) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_friction(mut self, friction: f64) -> Self {
        self.set_friction(friction);
        self
    }

    /// Same restitution on both axes.
    pub fn with_bounce(mut self, bounce: f64) -> Self {
        self.set_bounce(bounce, bounce);
        self
    }

    pub fn with_bounce_xy(mut self, bounce_x: f64, bounce_y: f64) -> Self {
        self.set_bounce(bounce_x, bounce_y);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.set_mass(mass);
        self
    }

    // -- accessors ----------------------------------------------------------

    /// The entity this body is attached to, if any.
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn bounce_x(&self) -> f64 {
        self.bounce_x
    }

    pub fn bounce_y(&self) -> f64 {
        self.bounce_y
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// `1 / mass`; 0 for an immovable body.
    pub fn inverse_mass(&self) -> f64 {
        1.0 / self.mass
    }

    pub fn is_immovable(&self) -> bool {
        self.mass == f64::INFINITY
    }

    /// The stronger of the two per-axis bounce coefficients.
    pub fn restitution(&self) -> f64 {
        self.bounce_x.max(self.bounce_y)
    }

    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    // -- clamping setters ---------------------------------------------------

    pub fn set_velocity(&mut self, vx: f64, vy: f64) {
        self.vx = vx;
        self.vy = vy;
    }

    pub fn set_friction(&mut self, friction: f64) {
        self.friction = clamp_unit(friction);
    }

    pub fn set_bounce(&mut self, bounce_x: f64, bounce_y: f64) {
        self.bounce_x = clamp_unit(bounce_x);
        self.bounce_y = clamp_unit(bounce_y);
    }

    pub fn set_bounds(&mut self, bounds: Option<Bounds>) {
        self.bounds = bounds;
    }

    /// NaN and non-positive masses become [`MIN_MASS`]; `+inf` is kept and
    /// marks the body immovable.
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = if mass == f64::INFINITY {
            mass
        } else if mass > MIN_MASS {
            mass
        } else {
            MIN_MASS
        };
    }
}

/// Wire form of [`Physics`]. Converted through the clamping setters.
///
/// JSON has no infinity, so an immovable body serializes its mass as `null`
/// and `null` reads back as immovable.
#[derive(Deserialize)]
struct PhysicsDef {
    #[serde(default)]
    vx: f64,
    #[serde(default)]
    vy: f64,
    #[serde(default)]
    angular_velocity: f64,
    #[serde(default)]
    friction: f64,
    #[serde(default)]
    bounce_x: f64,
    #[serde(default)]
    bounce_y: f64,
    #[serde(default)]
    bounds: Option<Bounds>,
    #[serde(default = "unit_mass")]
    mass: Option<f64>,
}

fn unit_mass() -> Option<f64> {
    Some(1.0)
}

impl From<PhysicsDef> for Physics {
    fn from(def: PhysicsDef) -> Self {
        let mut physics = Physics::new()
            .with_velocity(def.vx, def.vy)
            .with_angular_velocity(def.angular_velocity)
            .with_friction(def.friction)
            .with_bounce_xy(def.bounce_x, def.bounce_y)
            .with_mass(def.mass.unwrap_or(f64::INFINITY));
        physics.set_bounds(def.bounds.map(|b| Bounds::new(b.min_x, b.min_y, b.max_x, b.max_y)));
        physics
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp into `[0, 1]`; NaN becomes 0.
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friction_and_bounce_are_clamped() {
        let p = Physics::new().with_friction(1.5).with_bounce_xy(-0.3, 2.0);
        assert_eq!(p.friction(), 1.0);
        assert_eq!(p.bounce_x(), 0.0);
        assert_eq!(p.bounce_y(), 1.0);
    }

    #[test]
    fn nan_coefficients_clamp_to_zero() {
        let p = Physics::new().with_friction(f64::NAN).with_bounce(f64::NAN);
        assert_eq!(p.friction(), 0.0);
        assert_eq!(p.restitution(), 0.0);
    }

    #[test]
    fn mass_is_floored() {
        assert_eq!(Physics::new().with_mass(0.0).mass(), MIN_MASS);
        assert_eq!(Physics::new().with_mass(-5.0).mass(), MIN_MASS);
        assert_eq!(Physics::new().with_mass(f64::NAN).mass(), MIN_MASS);
        assert_eq!(Physics::new().with_mass(f64::NEG_INFINITY).mass(), MIN_MASS);
        assert_eq!(Physics::new().with_mass(3.0).mass(), 3.0);
        assert!(Physics::new().with_mass(0.0).inverse_mass().is_finite());
    }

    #[test]
    fn infinite_mass_is_immovable() {
        let wall = Physics::new().with_mass(f64::INFINITY);
        assert!(wall.is_immovable());
        assert_eq!(wall.inverse_mass(), 0.0);
        assert!(!Physics::new().with_mass(1e12).is_immovable());
    }

    #[test]
    fn deserialized_bodies_are_clamped() {
        let json = r#"{
            "vx": 3.0, "vy": 0.0, "angular_velocity": 0.0,
            "friction": 7.0, "bounce_x": -3.0, "bounce_y": 0.5,
            "bounds": { "min_x": 10.0, "min_y": 0.0, "max_x": 0.0, "max_y": 5.0 },
            "mass": 0.0
        }"#;
        let p: Physics = serde_json::from_str(json).unwrap();
        assert_eq!(p.vx, 3.0);
        assert_eq!(p.friction(), 1.0);
        assert_eq!(p.bounce_x(), 0.0);
        assert_eq!(p.bounce_y(), 0.5);
        assert_eq!(p.mass(), MIN_MASS);
        assert!(p.inverse_mass().is_finite());
        assert_eq!(p.bounds(), Some(Bounds::new(0.0, 0.0, 10.0, 5.0)));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let p: Physics = serde_json::from_str(r#"{ "vx": 2.0 }"#).unwrap();
        assert_eq!(p, Physics::new().with_velocity(2.0, 0.0));
    }

    #[test]
    fn immovable_mass_survives_json() {
        let wall = Physics::new().with_mass(f64::INFINITY);
        let json = serde_json::to_string(&wall).unwrap();
        assert!(json.contains(r#""mass":null"#));
        let back: Physics = serde_json::from_str(&json).unwrap();
        assert!(back.is_immovable());
    }

    #[test]
    fn reversed_bounds_are_normalised() {
        let b = Bounds::new(10.0, 20.0, 0.0, 5.0);
        assert_eq!(b, Bounds::new(0.0, 5.0, 10.0, 20.0));
        assert!(b.contains(10.0, 20.0));
        assert!(!b.contains(10.1, 20.0));
    }

    #[test]
    fn restitution_is_the_larger_axis() {
        let p = Physics::new().with_bounce_xy(0.2, 0.7);
        assert_eq!(p.restitution(), 0.7);
    }
}
