//! Visual description consumed by an external renderer.
//!
//! The ECS never draws. A renderer implements [`Canvas`] and reads
//! [`Renderer`] + [`Transform`](super::Transform) pairs; a renderer component
//! may carry a custom [`DrawHook`] that replaces the default shape drawing.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// RGBA colour, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(digits.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 17;
                }
                Some(Self::rgb(out[0], out[1], out[2]))
            }
            6 | 8 => {
                let r = channel(digits.get(0..2)?)?;
                let g = channel(digits.get(2..4)?)?;
                let b = channel(digits.get(4..6)?)?;
                let a = match digits.len() {
                    8 => channel(digits.get(6..8)?)?,
                    _ => 255,
                };
                Some(Self::rgba(r, g, b, a))
            }
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// What to draw for an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Visual {
    Circle { radius: f64 },
    Rectangle { width: f64, height: f64 },
    /// Closed polygon; points are relative to the transform origin.
    Polygon { points: Vec<(f64, f64)> },
    /// One frame of a sprite sheet, looked up by index.
    Sprite { sheet: String, frame: u32 },
}

/// Drawing surface implemented by the external renderer.
///
/// Coordinates are world positions; `rotation` is in radians and `scale`
/// multiplies the shape's size.
pub trait Canvas {
    fn circle(&mut self, x: f64, y: f64, radius: f64, color: Color);
    fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64, rotation: f64, color: Color);
    fn polygon(&mut self, x: f64, y: f64, points: &[(f64, f64)], rotation: f64, color: Color);
    fn sprite(&mut self, x: f64, y: f64, sheet: &str, frame: u32, rotation: f64, scale: f64);
}

/// Replacement draw routine: `(canvas, x, y, rotation, scale)`.
pub type DrawHook = Rc<dyn Fn(&mut dyn Canvas, f64, f64, f64, f64)>;

/// Render description attached to an entity.
#[derive(Clone, Serialize, Deserialize)]
pub struct Renderer {
    pub visual: Visual,
    pub color: Color,
    pub visible: bool,
    /// Lower values draw first.
    pub z_index: i32,
    #[serde(skip)]
    pub custom_draw: Option<DrawHook>,
    #[serde(skip)]
    pub(crate) owner: Option<EntityId>,
}

impl Renderer {
    pub fn new(visual: Visual) -> Self {
        Self {
            visual,
            color: Color::WHITE,
            visible: true,
            z_index: 0,
            custom_draw: None,
            owner: None,
        }
    }

    pub fn circle(radius: f64) -> Self {
        Self::new(Visual::Circle { radius })
    }

    pub fn rectangle(width: f64, height: f64) -> Self {
        Self::new(Visual::Rectangle { width, height })
    }

    pub fn sprite(sheet: &str, frame: u32) -> Self {
        Self::new(Visual::Sprite {
            sheet: sheet.to_owned(),
            frame,
        })
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn with_custom_draw(
        mut self,
        hook: impl Fn(&mut dyn Canvas, f64, f64, f64, f64) + 'static,
    ) -> Self {
        self.custom_draw = Some(Rc::new(hook));
        self
    }

    /// The entity this renderer is attached to, if any.
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("visual", &self.visual)
            .field("color", &self.color)
            .field("visible", &self.visible)
            .field("z_index", &self.z_index)
            .field("custom_draw", &self.custom_draw.is_some())
            .field("owner", &self.owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_colours() {
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(Color::from_hex("0f0"), Some(Color::rgb(0, 255, 0)));
        assert_eq!(
            Color::from_hex("#11223344"),
            Some(Color::rgba(0x11, 0x22, 0x33, 0x44))
        );
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn builder_sets_fields() {
        let r = Renderer::circle(4.0)
            .with_color(Color::BLACK)
            .with_z_index(3)
            .hidden();
        assert_eq!(r.visual, Visual::Circle { radius: 4.0 });
        assert_eq!(r.color, Color::BLACK);
        assert_eq!(r.z_index, 3);
        assert!(!r.visible);
        assert!(r.custom_draw.is_none());
    }
}
