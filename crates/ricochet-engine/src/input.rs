//! Edge-triggered input state.
//!
//! The platform layer translates native events into [`InputEvent`]s and
//! queues them on the [`InputState`] resource at any time. Nothing changes
//! until the [`InputSystem`] runs at the start of the next frame: it clears
//! the one-frame edge sets and the wheel accumulator, then folds every queued
//! event in arrival order. Gameplay systems running later in the same frame
//! see a consistent picture.
//!
//! ```
//! use ricochet_engine::input::{Button, InputEvent, InputState, InputSystem};
//! use ricochet_ecs::prelude::*;
//!
//! let mut world = World::new();
//! world.add_system(InputSystem::default());
//! if let Some(input) = world.resource_mut::<InputState>() {
//!     input.push_event(InputEvent::Press(Button::key("Space")));
//! }
//! world.update(1.0 / 60.0);
//! let input = world.resource::<InputState>().unwrap();
//! assert!(input.just_pressed(&Button::key("Space")));
//! ```

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::trace;

use ricochet_ecs::prelude::*;

/// Name under which the input system is registered.
pub const INPUT_SYSTEM_NAME: &str = "input";

/// A key or pointer button.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    /// Keyboard key by its platform name (`"ArrowLeft"`, `"Space"`, ...).
    Key(String),
    /// Pointer button by index, 0 being the primary button.
    Pointer(u8),
}

impl Button {
    pub fn key(name: &str) -> Self {
        Button::Key(name.to_owned())
    }
}

/// One raw event from the input provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    Press(Button),
    Release(Button),
    PointerMove { x: f64, y: f64 },
    Wheel { delta: f64 },
}

/// Per-world input snapshot. Lives in the world as a resource.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pressed: BTreeSet<Button>,
    just_pressed: BTreeSet<Button>,
    just_released: BTreeSet<Button>,
    pointer: (f64, f64),
    wheel_delta: f64,
    queue: VecDeque<InputEvent>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next frame.
    pub fn push_event(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_pressed(&self, button: &Button) -> bool {
        self.pressed.contains(button)
    }

    /// Went down this frame.
    pub fn just_pressed(&self, button: &Button) -> bool {
        self.just_pressed.contains(button)
    }

    /// Went up this frame.
    pub fn just_released(&self, button: &Button) -> bool {
        self.just_released.contains(button)
    }

    pub fn pressed(&self) -> impl Iterator<Item = &Button> {
        self.pressed.iter()
    }

    /// Last known pointer position.
    pub fn pointer(&self) -> (f64, f64) {
        self.pointer
    }

    /// Wheel movement accumulated this frame.
    pub fn wheel_delta(&self) -> f64 {
        self.wheel_delta
    }

    /// Start a new frame: drop edge state, then apply queued events.
    pub fn begin_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.wheel_delta = 0.0;
        while let Some(event) = self.queue.pop_front() {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: InputEvent) {
        trace!(event = ?event, "input event");
        match event {
            InputEvent::Press(button) => {
                if self.pressed.insert(button.clone()) {
                    self.just_pressed.insert(button);
                }
            }
            InputEvent::Release(button) => {
                if self.pressed.remove(&button) {
                    self.just_released.insert(button);
                }
            }
            InputEvent::PointerMove { x, y } => self.pointer = (x, y),
            InputEvent::Wheel { delta } => self.wheel_delta += delta,
        }
    }

    /// Forget everything, including held buttons (focus loss).
    pub fn reset(&mut self) {
        *self = Self {
            pointer: self.pointer,
            ..Self::default()
        };
    }
}

/// Advances [`InputState`] once per frame. Registered with the lowest
/// priority so every other system sees this frame's input.
#[derive(Debug, Clone)]
pub struct InputSystem {
    priority: i32,
}

impl InputSystem {
    pub fn new(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new(0)
    }
}

impl System for InputSystem {
    fn name(&self) -> &str {
        INPUT_SYSTEM_NAME
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn on_attach(&mut self, world: &mut World) {
        if !world.has_resource::<InputState>() {
            world.insert_resource(InputState::new());
        }
    }

    fn update(&mut self, world: &mut World, _entities: &[EntityId], _dt: f64) {
        if let Some(input) = world.resource_mut::<InputState>() {
            input.begin_frame();
        }
    }
}
