//! Mine spawning
//!
//! Mines appear just outside the visible rectangle, usually on the side the
//! ship is facing so the player sees them coming.

use glam::Vec2;
use rand::Rng;

use super::state::{GameState, PlayArea};
use crate::angle_degrees;
use crate::consts::*;

/// Play-area edge a spawn point lies beyond
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Right,
    Top,
    Left,
    Bottom,
}

impl Edge {
    /// Edge the aim angle (degrees) points toward.
    ///
    /// The boundary comparisons are deliberately asymmetric: exactly 45°
    /// maps to Bottom, -45° to Top, 135° to Left and -135° to Bottom.
    pub fn facing(angle: f32) -> Self {
        if (0.0..45.0).contains(&angle) || (angle > -45.0 && angle <= 0.0) {
            Edge::Right
        } else if angle > -135.0 && angle <= -45.0 {
            Edge::Top
        } else if (135.0..=180.0).contains(&angle) || (-180.0..-135.0).contains(&angle) {
            Edge::Left
        } else {
            Edge::Bottom
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Edge::Right => Edge::Left,
            Edge::Left => Edge::Right,
            Edge::Top => Edge::Bottom,
            Edge::Bottom => Edge::Top,
        }
    }
}

/// Which side of the ship a spawn lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnSide {
    Ahead,
    Behind,
}

impl SpawnSide {
    /// Ahead with `SPAWN_AHEAD_CHANCE`, otherwise behind
    pub fn roll<R: Rng>(rng: &mut R) -> Self {
        if rng.random::<f32>() < SPAWN_AHEAD_CHANCE {
            SpawnSide::Ahead
        } else {
            SpawnSide::Behind
        }
    }
}

/// Random point beyond `edge`: uniform along the edge, up to
/// OFFSCREEN_BAND outside it
pub fn point_beyond<R: Rng>(edge: Edge, area: PlayArea, rng: &mut R) -> Vec2 {
    // Floor keeps `width + depth` distinct from `width` after f32 rounding
    let depth = OFFSCREEN_BAND * (1.0 - rng.random::<f32>()).max(MIN_OFFSCREEN_FRACTION);
    match edge {
        Edge::Right => Vec2::new(area.width + depth, rng.random::<f32>() * area.height),
        Edge::Left => Vec2::new(-depth, rng.random::<f32>() * area.height),
        Edge::Top => Vec2::new(rng.random::<f32>() * area.width, -depth),
        Edge::Bottom => Vec2::new(rng.random::<f32>() * area.width, area.height + depth),
    }
}

/// Off-screen point for a given aim angle and side
pub fn offscreen_point_on<R: Rng>(
    angle: f32,
    side: SpawnSide,
    area: PlayArea,
    rng: &mut R,
) -> Vec2 {
    let edge = match side {
        SpawnSide::Ahead => Edge::facing(angle),
        SpawnSide::Behind => Edge::facing(angle).opposite(),
    };
    point_beyond(edge, area, rng)
}

/// Off-screen point biased toward the aim angle
pub fn offscreen_point<R: Rng>(angle: f32, area: PlayArea, rng: &mut R) -> Vec2 {
    let side = SpawnSide::roll(rng);
    offscreen_point_on(angle, side, area, rng)
}

/// Spawn one mine off-screen, biased toward the current aim
pub fn spawn_mine(state: &mut GameState) -> u32 {
    let angle = angle_degrees(state.mouse_vector);
    let area = state.area;
    let pos = offscreen_point(angle, area, &mut state.rng);
    let id = state.add_mine(pos);
    log::trace!("Spawned mine {} at ({:.0}, {:.0})", id, pos.x, pos.y);
    id
}

/// Fixed-period spawn clock for hosts without a timer callback
#[derive(Debug, Clone)]
pub struct Spawner {
    period_ms: f64,
    elapsed_ms: f64,
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new(SPAWN_PERIOD_MS)
    }
}

impl Spawner {
    pub fn new(period_ms: f64) -> Self {
        Self {
            period_ms,
            elapsed_ms: 0.0,
        }
    }

    /// Advance the clock; returns how many periods elapsed
    pub fn advance(&mut self, dt_ms: f64) -> u32 {
        self.elapsed_ms += dt_ms;
        let mut due = 0;
        while self.elapsed_ms >= self.period_ms {
            self.elapsed_ms -= self.period_ms;
            due += 1;
        }
        due
    }

    /// Advance the clock and spawn one mine per elapsed period
    pub fn run(&mut self, state: &mut GameState, dt_ms: f64) -> u32 {
        let due = self.advance(dt_ms);
        for _ in 0..due {
            spawn_mine(state);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Templates;
    use crate::settings::Settings;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const AREA: PlayArea = PlayArea {
        width: 800.0,
        height: 600.0,
    };

    #[test]
    fn test_facing_buckets() {
        assert_eq!(Edge::facing(0.0), Edge::Right);
        assert_eq!(Edge::facing(44.9), Edge::Right);
        assert_eq!(Edge::facing(-44.9), Edge::Right);
        assert_eq!(Edge::facing(-90.0), Edge::Top);
        assert_eq!(Edge::facing(90.0), Edge::Bottom);
        assert_eq!(Edge::facing(180.0), Edge::Left);
        assert_eq!(Edge::facing(-170.0), Edge::Left);
    }

    #[test]
    fn test_facing_boundaries_are_literal() {
        assert_eq!(Edge::facing(45.0), Edge::Bottom);
        assert_eq!(Edge::facing(-45.0), Edge::Top);
        assert_eq!(Edge::facing(135.0), Edge::Left);
        assert_eq!(Edge::facing(-135.0), Edge::Bottom);
    }

    #[test]
    fn test_zero_angle_sides() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let ahead = offscreen_point_on(0.0, SpawnSide::Ahead, AREA, &mut rng);
            assert!(ahead.x > AREA.width);
            assert!(ahead.x <= AREA.width + OFFSCREEN_BAND);

            let behind = offscreen_point_on(0.0, SpawnSide::Behind, AREA, &mut rng);
            assert!(behind.x < 0.0);
            assert!(behind.x >= -OFFSCREEN_BAND);
        }
    }

    #[test]
    fn test_ahead_ratio() {
        let mut rng = Pcg32::seed_from_u64(1234);
        let ahead = (0..4000)
            .filter(|_| SpawnSide::roll(&mut rng) == SpawnSide::Ahead)
            .count();
        let ratio = ahead as f32 / 4000.0;
        assert!((ratio - 0.75).abs() < 0.03, "ratio {ratio}");
    }

    #[test]
    fn test_spawner_period() {
        let mut spawner = Spawner::default();
        assert_eq!(spawner.advance(700.0), 0);
        assert_eq!(spawner.advance(100.0), 1);
        assert_eq!(spawner.advance(1500.0), 2);
    }

    #[test]
    fn test_spawn_ignores_population() {
        let templates = Templates::embedded().unwrap();
        let mut state = GameState::new(3, AREA, &templates, &Settings::default());
        for _ in 0..(MAX_MINES + 5) {
            spawn_mine(&mut state);
        }
        assert_eq!(state.mines.len(), MAX_MINES + 5);
        for mine in &state.mines {
            assert!(!state.area.contains(mine.pos));
        }
    }

    proptest! {
        #[test]
        fn prop_point_always_offscreen(angle in -180.0f32..=180.0, seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let p = offscreen_point(angle, AREA, &mut rng);
            prop_assert!(!AREA.contains(p));
            prop_assert!(p.x >= -OFFSCREEN_BAND && p.x <= AREA.width + OFFSCREEN_BAND);
            prop_assert!(p.y >= -OFFSCREEN_BAND && p.y <= AREA.height + OFFSCREEN_BAND);
        }

        #[test]
        fn prop_behind_is_opposite_edge(angle in -180.0f32..=180.0, seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let p = offscreen_point_on(angle, SpawnSide::Behind, AREA, &mut rng);
            match Edge::facing(angle) {
                Edge::Right => prop_assert!(p.x < 0.0),
                Edge::Left => prop_assert!(p.x > AREA.width),
                Edge::Top => prop_assert!(p.y > AREA.height),
                Edge::Bottom => prop_assert!(p.y < 0.0),
            }
        }
    }
}
