//! Fruit Dropper - a drop-and-merge arcade game core
//!
//! Core modules:
//! - `sim`: Drop cycle (dropper, fruit queue, settle detection, tick loop)
//! - `settings`: Tuning and audio toggles loaded from JSON
//! - `menu`: Pause and main menu actions
//! - `error`: Crate error type

pub mod error;
pub mod menu;
pub mod settings;
pub mod sim;

pub use error::DropError;
pub use settings::{AudioToggles, DropperConfig, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Dropper travel limits (world units)
    pub const DROPPER_MIN_X: f32 = -3.0;
    pub const DROPPER_MAX_X: f32 = 3.0;
    /// Height of the dropper above the container floor
    pub const DROPPER_Y: f32 = 4.0;
    /// Depth of held/dropped fruit (keeps them in front of the dropper sprite)
    pub const FRUIT_Z: f32 = -1.0;

    /// Smoothing rate for following the pointer (1/s)
    pub const MOVE_SPEED: f32 = 15.0;

    /// Minimum time between two releases (seconds)
    pub const DROP_DELAY: f32 = 0.2;
    /// Minimum hold time before a release counts as a drop (seconds)
    pub const MIN_DRAG_DURATION: f32 = 0.1;

    /// Upcoming fruits kept in the queue (including the held one)
    pub const QUEUE_LEN: usize = 3;
}

/// Move `current` toward `target` with frame-rate independent exponential smoothing.
///
/// After `dt` seconds the remaining distance shrinks by `exp(-rate * dt)`, so the
/// result never overshoots the target.
#[inline]
pub fn smooth_toward(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    if !(dt > 0.0) || !dt.is_finite() {
        return current;
    }
    let alpha = 1.0 - (-rate.max(0.0) * dt).exp();
    if !alpha.is_finite() {
        return current;
    }
    current + (target - current) * alpha
}
