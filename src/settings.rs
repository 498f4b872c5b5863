//! Dropper tuning and audio toggles
//!
//! Loaded from a JSON file at startup. Nothing here is written back to disk.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::DropError;
use crate::sim::FruitKind;

/// Tuning for the dropper and fruit queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropperConfig {
    /// Left travel limit of the dropper
    pub min_x: f32,
    /// Right travel limit of the dropper
    pub max_x: f32,
    /// Pointer-follow smoothing rate (1/s)
    pub move_speed: f32,
    /// Height the fruit is held at
    pub dropper_y: f32,
    /// Depth the fruit is held at
    pub fruit_z: f32,
    /// Minimum seconds between two releases
    pub drop_delay: f32,
    /// Minimum seconds a drag must last before its release drops a fruit
    pub min_drag_duration: f32,
    /// Number of upcoming fruits kept in the queue
    pub queue_len: usize,
    /// Kinds the queue picks from
    pub spawn_kinds: Vec<FruitKind>,
}

impl Default for DropperConfig {
    fn default() -> Self {
        Self {
            min_x: DROPPER_MIN_X,
            max_x: DROPPER_MAX_X,
            move_speed: MOVE_SPEED,
            dropper_y: DROPPER_Y,
            fruit_z: FRUIT_Z,
            drop_delay: DROP_DELAY,
            min_drag_duration: MIN_DRAG_DURATION,
            queue_len: QUEUE_LEN,
            spawn_kinds: FruitKind::DROPPABLE.to_vec(),
        }
    }
}

impl DropperConfig {
    /// Reject configs the drop cycle cannot run with
    pub fn validate(&self) -> Result<(), DropError> {
        let invalid = |msg: String| Err(DropError::InvalidConfig(msg));

        if !self.min_x.is_finite() || !self.max_x.is_finite() {
            return invalid(format!(
                "travel limits must be finite (min_x={}, max_x={})",
                self.min_x, self.max_x
            ));
        }
        if self.min_x > self.max_x {
            return invalid(format!("min_x {} is greater than max_x {}", self.min_x, self.max_x));
        }
        if !self.move_speed.is_finite() || self.move_speed < 0.0 {
            return invalid(format!("move_speed must be >= 0, got {}", self.move_speed));
        }
        let duration_ok = |d: f32| d.is_finite() && d >= 0.0;
        if !duration_ok(self.drop_delay) || !duration_ok(self.min_drag_duration) {
            return invalid(format!(
                "durations must be >= 0 (drop_delay={}, min_drag_duration={})",
                self.drop_delay, self.min_drag_duration
            ));
        }
        if self.queue_len == 0 {
            return invalid("queue_len must be at least 1".to_string());
        }
        if self.spawn_kinds.is_empty() {
            return invalid("spawn_kinds must not be empty".to_string());
        }
        Ok(())
    }

    /// Clamp a horizontal position into the travel limits
    #[inline]
    pub fn clamp_x(&self, x: f32) -> f32 {
        x.clamp(self.min_x, self.max_x)
    }
}

/// Music and sound effect switches from the pause menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioToggles {
    pub music: bool,
    pub sfx: bool,
}

impl Default for AudioToggles {
    fn default() -> Self {
        Self {
            music: true,
            sfx: true,
        }
    }
}

/// Everything read from the settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dropper: DropperConfig,
    pub audio: AudioToggles,
}

impl Settings {
    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, DropError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.dropper.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DropError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings ({})", e);
                Self::default()
            }
        }
    }
}
