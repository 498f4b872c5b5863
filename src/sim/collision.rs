//! Overlap geometry and the settle rule
//!
//! A released fruit counts as settled the first time its box overlaps the
//! container floor/walls or a fruit that already landed. Anything else it
//! touches (including its own collider) is ignored.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::BodyHandle;

/// What a world object is, as far as settling is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Container floor or side walls
    Floor,
    /// A fruit
    Piece,
    /// Decorations, sensors, the dropper itself
    Other,
}

impl Category {
    /// Whether touching an object of this category settles a falling fruit
    #[inline]
    pub fn settles_on(self) -> bool {
        matches!(self, Category::Floor | Category::Piece)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box centered on `center` with full extents `size`
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Overlap test; boxes that only touch along an edge count as overlapping
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

/// One object reported by an overlap query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub handle: BodyHandle,
    pub category: Category,
}

/// Settle rule: any contact other than the fruit itself that is floor or fruit
pub fn settles(piece: BodyHandle, contacts: &[Contact]) -> bool {
    contacts
        .iter()
        .filter(|c| c.handle != piece)
        .any(|c| c.category.settles_on())
}
