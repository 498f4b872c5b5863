//! Collaborators the drop cycle drives: whoever owns bodies and physics
//!
//! The controller never simulates anything itself. It asks a `Spawner` to
//! create, move and let go of fruit bodies, and an `OverlapQuery` to report
//! what a falling fruit is touching.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Contact};
use super::queue::FruitKind;

/// Opaque id of a world object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Creates fruit bodies and hands them between kinematic and simulated control
pub trait Spawner {
    /// Create a held (not simulated) fruit at `pos`
    fn spawn(&mut self, kind: FruitKind, pos: Vec3) -> BodyHandle;

    /// Reposition a held fruit
    fn move_held(&mut self, handle: BodyHandle, pos: Vec3);

    /// Turn simulation on; physics owns the body from here
    fn release(&mut self, handle: BodyHandle);
}

/// Spatial queries over simulated and static bodies
pub trait OverlapQuery {
    /// Current collider bounds, `None` if the body has no collider
    fn bounds(&self, handle: BodyHandle) -> Option<Aabb>;

    /// Every simulated or static body whose collider overlaps `area`
    fn overlapping(&self, area: &Aabb) -> Vec<Contact>;
}
