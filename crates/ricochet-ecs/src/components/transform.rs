//! Position, rotation and uniform scale.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Where an entity sits in the 2D world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Horizontal position in world units.
    pub x: f64,
    /// Vertical position in world units.
    pub y: f64,
    /// Rotation in radians.
    pub rotation: f64,
    /// Uniform scale factor.
    pub scale: f64,
    #[serde(skip)]
    pub(crate) owner: Option<EntityId>,
}

impl Transform {
    /// A transform at `(x, y)` with no rotation and unit scale.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            rotation: 0.0,
            scale: 1.0,
            owner: None,
        }
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// The entity this transform is attached to, if any.
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Euclidean distance to a point.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transform_has_unit_scale() {
        let t = Transform::new(3.0, 4.0);
        assert_eq!(t.position(), (3.0, 4.0));
        assert_eq!(t.rotation, 0.0);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.owner(), None);
    }

    #[test]
    fn distance_is_euclidean() {
        let t = Transform::new(0.0, 0.0);
        assert!((t.distance_to(3.0, 4.0) - 5.0).abs() < 1e-12);
    }
}
