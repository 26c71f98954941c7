//! Engine configuration.
//!
//! Tuning values that gameplay code may want to change without recompiling
//! (world extent, grid cell size, friction snap epsilon, positional
//! correction, system priorities) live in [`EngineConfig`]. Configuration is
//! read from JSON; every field has a default, so a partial document is valid.
//!
//! ```
//! use ricochet_engine::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "width": 1024, "cell_size": 32 }"#).unwrap();
//! assert_eq!(config.width, 1024.0);
//! assert_eq!(config.height, 600.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collision::BroadPhase;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors produced while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// SystemPriorities
// ---------------------------------------------------------------------------

/// Priorities of the built-in systems. Lower runs earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemPriorities {
    pub input: i32,
    pub scripts: i32,
    pub movement: i32,
    pub lifetime: i32,
    pub collision: i32,
}

impl Default for SystemPriorities {
    fn default() -> Self {
        Self {
            input: 0,
            scripts: 50,
            movement: 100,
            lifetime: 200,
            collision: 300,
        }
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Configuration for an [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// World width in world units.
    pub width: f64,
    /// World height in world units.
    pub height: f64,
    /// Side length of one spatial grid cell.
    pub cell_size: f64,
    /// Velocity components below this magnitude snap to zero under friction.
    pub friction_epsilon: f64,
    /// Share of the overlap depth removed per frame, in `[0, 1]`.
    pub correction_percent: f64,
    pub broad_phase: BroadPhase,
    /// How far outside the world bounds a projectile may travel before it is
    /// pruned.
    pub prune_margin: f64,
    /// Fixed step used by [`Engine::advance`](crate::engine::Engine::advance).
    pub fixed_dt: f64,
    /// Upper bound on fixed steps run by one `advance` call.
    pub max_steps_per_frame: u32,
    pub priorities: SystemPriorities,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            cell_size: 64.0,
            friction_epsilon: 1e-3,
            correction_percent: 0.5,
            broad_phase: BroadPhase::Grid,
            prune_margin: 50.0,
            fixed_dt: 1.0 / 60.0,
            max_steps_per_frame: 5,
            priorities: SystemPriorities::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that have no sensible interpretation and clamp the ones
    /// that do.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("cell_size", self.cell_size)?;
        positive("fixed_dt", self.fixed_dt)?;
        if self.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid {
                field: "max_steps_per_frame",
                reason: "must be at least 1".to_owned(),
            });
        }
        if !self.prune_margin.is_finite() {
            return Err(ConfigError::Invalid {
                field: "prune_margin",
                reason: format!("must be finite, got {}", self.prune_margin),
            });
        }

        self.correction_percent = if self.correction_percent.is_nan() {
            0.0
        } else {
            self.correction_percent.clamp(0.0, 1.0)
        };
        if self.friction_epsilon.is_nan() || self.friction_epsilon < 0.0 {
            self.friction_epsilon = 0.0;
        }
        self.prune_margin = self.prune_margin.max(0.0);
        Ok(self)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be positive and finite, got {value}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
