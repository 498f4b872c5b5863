//! Per-frame entry point
//!
//! The host calls `tick` once per simulation step, after stepping its own
//! physics. Within a tick the dropper moves first, then a release may happen,
//! then the falling fruit is checked for settling.

use super::controller::DropController;
use super::queue::KindPicker;
use super::state::Session;
use super::world::{OverlapQuery, Spawner};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer/touch x in world space
    pub pointer_x: Option<f32>,
    /// Press/touch began this tick
    pub press: bool,
    /// Press/touch ended this tick
    pub release: bool,
    /// Pointer lost (touch cancelled, window blur)
    pub cancel: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the drop cycle by `dt` seconds
pub fn tick<W, P>(
    controller: &mut DropController<W, P>,
    session: &mut Session,
    input: &TickInput,
    dt: f32,
) where
    W: Spawner + OverlapQuery,
    P: KindPicker,
{
    if input.pause {
        session.toggle_pause();
    }
    // A lost pointer ends the gesture even while frozen
    if input.cancel {
        controller.cancel_drag();
    }

    // Lost or paused: the clock stops and nothing moves
    if session.is_frozen() {
        return;
    }

    session.time += f64::from(dt.max(0.0));
    let now = session.time;

    if input.press && !input.cancel {
        controller.begin_drag(now);
    }

    if input.release {
        controller.end_drag(session, now);
    } else if controller.is_dragging() {
        if let Some(x) = input.pointer_x {
            controller.update_position(session, x, dt);
        }
    }

    controller.poll_settle(session);
}
