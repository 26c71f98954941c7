//! The built-in component kinds.

pub mod collider;
pub mod lifetime;
pub mod physics;
pub mod renderer;
pub mod script;
pub mod transform;

pub use collider::{Collider, ColliderHook, ColliderHooks, Shape};
pub use lifetime::Lifetime;
pub use physics::{Bounds, Physics, MIN_MASS};
pub use renderer::{Canvas, Color, DrawHook, Renderer, Visual};
pub use script::{ScriptFn, ScriptHook, ScriptedBehavior};
pub use transform::Transform;
