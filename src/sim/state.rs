//! Drop cycle state types
//!
//! `Session` is the game-wide context handed to every per-tick call. The
//! controller owns the rest.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::queue::FruitKind;
use super::world::BodyHandle;

/// Where the current fruit is in its drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceState {
    /// Riding the dropper, following input
    Holding,
    /// Let go; physics moves it
    Released,
    /// Touched the floor or another fruit
    Settled,
}

/// The fruit currently on (or just dropped from) the dropper
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePiece {
    pub kind: FruitKind,
    pub handle: BodyHandle,
    /// Horizontal position while held (last held position once released)
    pub x: f32,
    /// Fixed height the fruit is held at
    pub y: f32,
    /// Fixed depth the fruit is held at
    pub z: f32,
    pub state: PieceState,
}

impl ActivePiece {
    pub fn held(kind: FruitKind, handle: BodyHandle, pos: Vec3) -> Self {
        Self {
            kind,
            handle,
            x: pos.x,
            y: pos.y,
            z: pos.z,
            state: PieceState::Holding,
        }
    }

    #[inline]
    pub fn released(&self) -> bool {
        self.state != PieceState::Holding
    }

    #[inline]
    pub fn settled(&self) -> bool {
        self.state == PieceState::Settled
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// An in-progress press/drag gesture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSession {
    /// Simulation time the press began
    pub started_at: f64,
}

impl DragSession {
    #[inline]
    pub fn elapsed(&self, now: f64) -> f64 {
        now - self.started_at
    }
}

/// Game-wide flags shared with the drop cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Cleared on release, set again once the dropped fruit settles
    pub ready_to_drop: bool,
    /// Run ended; input is ignored
    pub lost: bool,
    /// Pause gate
    pub paused: bool,
    /// Pause menu shown (tracks `paused`)
    pub pause_menu_visible: bool,
    /// Simulation clock in seconds; stops while paused.
    /// f64 so frame-sized steps still register after days of play.
    pub time: f64,
    /// Kind shown in the "next fruit" display
    pub next_preview: Option<FruitKind>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            ready_to_drop: true,
            lost: false,
            paused: false,
            pause_menu_visible: false,
            time: 0.0,
            next_preview: None,
        }
    }

    /// Lost or paused: every drop cycle call is a no-op
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.lost || self.paused
    }

    /// Drop guide line is only drawn while a drop is allowed
    #[inline]
    pub fn guide_visible(&self) -> bool {
        self.ready_to_drop
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.pause_menu_visible = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.pause_menu_visible = false;
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// 0.0 while paused, 1.0 otherwise
    #[inline]
    pub fn time_scale(&self) -> f32 {
        if self.paused { 0.0 } else { 1.0 }
    }

    pub fn mark_lost(&mut self) {
        if !self.lost {
            log::info!("Run lost at t={:.2}s", self.time);
        }
        self.lost = true;
    }
}

/// Things that happened during a tick, for the host to react to (sounds, HUD)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DropEvent {
    Spawned { kind: FruitKind, handle: BodyHandle },
    Released { kind: FruitKind, handle: BodyHandle, x: f32 },
    Settled { kind: FruitKind, handle: BodyHandle },
    SpawnFailed,
}
