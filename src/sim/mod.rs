//! Drop cycle simulation
//!
//! All gameplay logic lives here. The module owns no physics or rendering:
//! - Bodies and overlap queries come from a host world (`Spawner`, `OverlapQuery`)
//! - The host calls `tick` once per step with explicit input
//! - Seeded RNG only, so runs replay exactly

pub mod collision;
pub mod controller;
pub mod queue;
pub mod sandbox;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::{Aabb, Category, Contact, settles};
pub use controller::DropController;
pub use queue::{FruitKind, FruitQueue, KindPicker, UniformPicker};
pub use sandbox::{SandboxBody, SandboxWorld};
pub use state::{ActivePiece, DragSession, DropEvent, PieceState, Session};
pub use tick::{TickInput, tick};
pub use world::{BodyHandle, OverlapQuery, Spawner};
