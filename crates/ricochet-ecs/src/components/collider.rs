//! Collision shape, layer filtering and per-collider phase hooks.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::world::World;

/// Geometric shape of a collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Circle { radius: f64 },
    Rectangle { width: f64, height: f64 },
}

impl Shape {
    /// Radius of the smallest circle centred on the shape that encloses it.
    pub fn bounding_radius(&self) -> f64 {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Rectangle { width, height } => 0.5 * width.hypot(height),
        }
    }
}

/// Hook invoked with `(world, this_entity, other_entity)`.
pub type ColliderHook = Rc<dyn Fn(&mut World, EntityId, EntityId)>;

/// Optional per-phase notifications delivered directly to a collider.
#[derive(Clone, Default)]
pub struct ColliderHooks {
    pub on_start: Option<ColliderHook>,
    pub on_stay: Option<ColliderHook>,
    pub on_end: Option<ColliderHook>,
}

impl fmt::Debug for ColliderHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColliderHooks")
            .field("on_start", &self.on_start.is_some())
            .field("on_stay", &self.on_stay.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

/// Collision participation for an entity.
///
/// `collides_with` lists the layers this collider reacts to. The relation is
/// not required to be symmetric; the collision engine accepts a pair if
/// either side lists the other's layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collider {
    pub shape: Shape,
    pub offset_x: f64,
    pub offset_y: f64,
    pub layer: u32,
    pub collides_with: Vec<u32>,
    /// Triggers produce callbacks but no physical response.
    pub trigger: bool,
    #[serde(skip)]
    pub hooks: ColliderHooks,
    #[serde(skip)]
    pub(crate) owner: Option<EntityId>,
}

impl Collider {
    /// A circle on layer 0 that collides with layer 0.
    pub fn circle(radius: f64) -> Self {
        Self::with_shape(Shape::Circle {
            radius: radius.max(0.0),
        })
    }

    /// A rectangle on layer 0 that collides with layer 0.
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self::with_shape(Shape::Rectangle {
            width: width.max(0.0),
            height: height.max(0.0),
        })
    }

    fn with_shape(shape: Shape) -> Self {
        Self {
            shape,
            offset_x: 0.0,
            offset_y: 0.0,
            layer: 0,
            collides_with: vec![0],
            trigger: false,
            hooks: ColliderHooks::default(),
            owner: None,
        }
    }

    pub fn with_offset(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    pub fn with_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_collides_with(mut self, layers: impl IntoIterator<Item = u32>) -> Self {
        self.collides_with = layers.into_iter().collect();
        self
    }

    pub fn as_trigger(mut self) -> Self {
        self.trigger = true;
        self
    }

    pub fn on_start(mut self, hook: impl Fn(&mut World, EntityId, EntityId) + 'static) -> Self {
        self.hooks.on_start = Some(Rc::new(hook));
        self
    }

    pub fn on_stay(mut self, hook: impl Fn(&mut World, EntityId, EntityId) + 'static) -> Self {
        self.hooks.on_stay = Some(Rc::new(hook));
        self
    }

    pub fn on_end(mut self, hook: impl Fn(&mut World, EntityId, EntityId) + 'static) -> Self {
        self.hooks.on_end = Some(Rc::new(hook));
        self
    }

    /// The entity this collider is attached to, if any.
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Circle radius, or `None` for non-circular shapes.
    pub fn radius(&self) -> Option<f64> {
        match self.shape {
            Shape::Circle { radius } => Some(radius),
            Shape::Rectangle { .. } => None,
        }
    }

    pub fn bounding_radius(&self) -> f64 {
        self.shape.bounding_radius()
    }

    /// Whether this collider lists `other`'s layer.
    pub fn accepts(&self, other: &Collider) -> bool {
        self.collides_with.contains(&other.layer)
    }

    /// Layer compatibility checked from both sides.
    pub fn layers_compatible(&self, other: &Collider) -> bool {
        self.accepts(other) || other.accepts(self)
    }
}
