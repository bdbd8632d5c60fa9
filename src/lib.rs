//! Mine Storm - a starfield arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, movement, collisions, game state)
//! - `assets`: Ship and mine symbol templates
//! - `renderer`: WebGPU rendering pipeline
//! - `settings`: Persisted player preferences
//! - `headless`: Scripted sessions without a browser

pub mod assets;
pub mod audio;
pub mod headless;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use assets::{AssetError, SymbolTemplate, Templates};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Mine spawn period in milliseconds
    pub const SPAWN_PERIOD_MS: f64 = 750.0;
    /// Probability that a spawn lands ahead of the ship's heading
    pub const SPAWN_AHEAD_CHANCE: f32 = 0.75;
    /// Depth of the spawn band beyond the play-area edge
    pub const OFFSCREEN_BAND: f32 = 50.0;
    /// Smallest spawn depth, as a fraction of the band
    pub const MIN_OFFSCREEN_FRACTION: f32 = 0.01;

    /// Mine homing speed (units per frame)
    pub const MINE_HOMING_SPEED: f32 = 3.0;
    /// Mine spin per frame (degrees)
    pub const MINE_SPIN_DEG: f32 = 1.0;
    /// Maximum live mines before the oldest is evicted
    pub const MAX_MINES: usize = 30;

    /// Laser speed (units per frame)
    pub const LASER_SPEED: f32 = 7.0;

    /// Proximity hit-test tolerance
    pub const HIT_TOLERANCE: f32 = 30.0;

    /// Explosion growth factor per frame
    pub const EXPLOSION_GROWTH: f32 = 1.3;
    /// Explosions are removed once wider than this
    pub const EXPLOSION_MAX_WIDTH: f32 = 100.0;
    /// Explosion symbol radius at scale 1
    pub const EXPLOSION_RADIUS: f32 = 10.0;

    /// Star symbol radius at scale 1
    pub const STAR_RADIUS: f32 = 5.0;
    /// Star scale range at session start
    pub const STAR_MIN_SCALE: f32 = 0.1;
    pub const STAR_MAX_SCALE: f32 = 1.0;

    /// Parallax factors applied to the mouse vector
    pub const STAR_PARALLAX: f32 = -0.001;
    pub const MINE_PARALLAX: f32 = -0.006;

    /// Ship artwork points up, so the heading is the aim angle plus this
    pub const SHIP_HEADING_OFFSET_DEG: f32 = 90.0;
}

/// Angle of a vector in degrees, in (-180, 180]
#[inline]
pub fn angle_degrees(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}

/// Same direction as `v`, scaled to `length` (zero stays zero)
#[inline]
pub fn with_length(v: Vec2, length: f32) -> Vec2 {
    v.normalize_or_zero() * length
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}
