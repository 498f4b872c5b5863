//! Headless world for the demo binary and tests
//!
//! Not a physics engine: released fruit fall straight down at a fixed speed and
//! stop on the first floor or resting fruit below them. That is enough to drive
//! the drop cycle deterministically without a host engine.

use glam::{Vec2, Vec3};

use super::collision::{Aabb, Category, Contact};
use super::queue::FruitKind;
use super::world::{BodyHandle, OverlapQuery, Spawner};

/// Default fall speed in world units per second
pub const DEFAULT_FALL_SPEED: f32 = 6.0;

/// Tolerance when deciding whether a support is below a falling fruit
const SUPPORT_EPSILON: f32 = 1e-3;

/// A body in the sandbox
#[derive(Debug, Clone)]
pub struct SandboxBody {
    pub handle: BodyHandle,
    /// `Some` for fruit, `None` for static geometry
    pub kind: Option<FruitKind>,
    pub category: Category,
    pub bounds: Aabb,
    /// Fruit only: physics owns the body
    pub simulated: bool,
    /// Fruit only: came to rest on a support
    pub resting: bool,
}

impl SandboxBody {
    #[inline]
    fn is_fruit(&self) -> bool {
        self.kind.is_some()
    }

    /// Held fruit are invisible to overlap queries
    #[inline]
    fn is_queryable(&self) -> bool {
        !self.is_fruit() || self.simulated
    }

    /// Something a falling fruit can land on
    #[inline]
    fn is_support(&self) -> bool {
        match self.kind {
            Some(_) => self.resting,
            None => self.category == Category::Floor,
        }
    }
}

/// Deterministic kinematic world
#[derive(Debug, Clone)]
pub struct SandboxWorld {
    bodies: Vec<SandboxBody>,
    fall_speed: f32,
    next_id: u32,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new(DEFAULT_FALL_SPEED)
    }
}

impl SandboxWorld {
    pub fn new(fall_speed: f32) -> Self {
        Self {
            bodies: Vec::new(),
            fall_speed,
            next_id: 1,
        }
    }

    fn next_handle(&mut self) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        handle
    }

    /// Add a static body
    pub fn add_body(&mut self, category: Category, bounds: Aabb) -> BodyHandle {
        let handle = self.next_handle();
        self.bodies.push(SandboxBody {
            handle,
            kind: None,
            category,
            bounds,
            simulated: false,
            resting: false,
        });
        handle
    }

    /// Add a floor slab whose top surface is at `y`
    pub fn add_floor(&mut self, y: f32, min_x: f32, max_x: f32) -> BodyHandle {
        self.add_body(
            Category::Floor,
            Aabb::new(Vec2::new(min_x, y - 1.0), Vec2::new(max_x, y)),
        )
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&SandboxBody> {
        self.bodies.iter().find(|b| b.handle == handle)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut SandboxBody> {
        self.bodies.iter_mut().find(|b| b.handle == handle)
    }

    /// Fruit that have landed
    pub fn resting_fruit(&self) -> impl Iterator<Item = &SandboxBody> {
        self.bodies.iter().filter(|b| b.is_fruit() && b.resting)
    }

    /// Advance falling fruit by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        let drop = self.fall_speed * dt.max(0.0);

        for i in 0..self.bodies.len() {
            let body = &self.bodies[i];
            if !body.is_fruit() || !body.simulated || body.resting {
                continue;
            }

            let bottom = body.bounds.min.y;
            let moved = body.bounds.translated(Vec2::new(0.0, -drop));

            // Highest support below the fruit that the moved box reaches
            let support_top = self
                .bodies
                .iter()
                .enumerate()
                .filter(|&(j, other)| {
                    j != i
                        && other.is_support()
                        && other.bounds.max.y <= bottom + SUPPORT_EPSILON
                        && moved.intersects(&other.bounds)
                })
                .map(|(_, other)| other.bounds.max.y)
                .reduce(f32::max);

            let body = &mut self.bodies[i];
            match support_top {
                Some(top) => {
                    body.bounds = body.bounds.translated(Vec2::new(0.0, top - bottom));
                    body.resting = true;
                }
                None => body.bounds = moved,
            }
        }
    }
}

impl Spawner for SandboxWorld {
    fn spawn(&mut self, kind: FruitKind, pos: Vec3) -> BodyHandle {
        let handle = self.next_handle();
        let size = Vec2::splat(kind.radius() * 2.0);
        self.bodies.push(SandboxBody {
            handle,
            kind: Some(kind),
            category: Category::Piece,
            bounds: Aabb::from_center_size(pos.truncate(), size),
            simulated: false,
            resting: false,
        });
        handle
    }

    fn move_held(&mut self, handle: BodyHandle, pos: Vec3) {
        if let Some(body) = self.body_mut(handle) {
            if !body.simulated {
                body.bounds = Aabb::from_center_size(pos.truncate(), body.bounds.size());
            }
        }
    }

    fn release(&mut self, handle: BodyHandle) {
        if let Some(body) = self.body_mut(handle) {
            body.simulated = true;
        }
    }
}

impl OverlapQuery for SandboxWorld {
    fn bounds(&self, handle: BodyHandle) -> Option<Aabb> {
        self.body(handle).map(|b| b.bounds)
    }

    fn overlapping(&self, area: &Aabb) -> Vec<Contact> {
        self.bodies
            .iter()
            .filter(|b| b.is_queryable() && b.bounds.intersects(area))
            .map(|b| Contact {
                handle: b.handle,
                category: b.category,
            })
            .collect()
    }
}
