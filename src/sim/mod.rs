//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Per-frame motion, no wall-clock scaling
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod input;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::hit_test;
pub use input::{PointerEvent, aim, fire, handle};
pub use spawn::{Edge, SpawnSide, Spawner, offscreen_point, spawn_mine};
pub use state::{
    DestroyCause, Explosion, GameEvent, GameState, Laser, Mine, PlayArea, Ship, Star,
};
pub use tick::{FrameInfo, tick};
