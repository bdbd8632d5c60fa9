//! Game state and core simulation types
//!
//! Everything the frame update touches lives in `GameState`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::assets::Templates;
use crate::consts::*;
use crate::settings::Settings;

/// The visible rectangle, in screen units (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl PlayArea {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Inclusive bounds check: [0, width] x [0, height]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// Wrap a point back into the play area.
    ///
    /// Each axis is reduced with a sign-preserving remainder; a negative
    /// result snaps to the far edge instead of wrapping symmetrically, so
    /// x = -3 lands on x = width.
    pub fn wrap(&self, p: Vec2) -> Vec2 {
        Vec2::new(wrap_axis(p.x, self.width), wrap_axis(p.y, self.height))
    }
}

fn wrap_axis(v: f32, max: f32) -> f32 {
    let r = v % max;
    if r < 0.0 { max } else { r }
}

/// The player's ship
#[derive(Debug, Clone)]
pub struct Ship {
    pub pos: Vec2,
    /// Heading in degrees
    pub rotation: f32,
    /// Hit radius from the ship template
    pub radius: f32,
}

/// A background star
#[derive(Debug, Clone)]
pub struct Star {
    pub pos: Vec2,
    pub scale: f32,
}

impl Star {
    /// Bounding width of the star symbol
    pub fn width(&self) -> f32 {
        STAR_RADIUS * 2.0 * self.scale
    }
}

/// A homing mine
#[derive(Debug, Clone)]
pub struct Mine {
    pub id: u32,
    pub pos: Vec2,
    /// Spin in degrees
    pub rotation: f32,
    /// Hit radius from the mine template
    pub radius: f32,
}

/// A laser bolt. Its travel direction lives in `GameState::laser_directions`
/// at the same index.
#[derive(Debug, Clone)]
pub struct Laser {
    pub id: u32,
    pub pos: Vec2,
    /// Orientation in degrees
    pub rotation: f32,
}

/// An expanding explosion ring
#[derive(Debug, Clone)]
pub struct Explosion {
    pub pos: Vec2,
    pub scale: f32,
}

impl Explosion {
    pub fn new(pos: Vec2) -> Self {
        Self { pos, scale: 1.0 }
    }

    /// Bounding width of the explosion symbol
    pub fn width(&self) -> f32 {
        EXPLOSION_RADIUS * 2.0 * self.scale
    }
}

/// What destroyed a mine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyCause {
    ShipCollision,
    LaserHit,
    PopulationCap,
}

/// Things that happened during an update, drained by the front end
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    MineSpawned { id: u32, pos: Vec2 },
    LaserFired { id: u32 },
    MineDestroyed { id: u32, pos: Vec2, cause: DestroyCause },
}

/// Complete game session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub area: PlayArea,
    pub ship: Ship,
    pub stars: Vec<Star>,
    pub mines: Vec<Mine>,
    /// Active explosions
    pub explosions: Vec<Explosion>,
    /// Pointer position relative to the play-area center
    pub mouse_vector: Vec2,
    /// Parallax sensitivity multiplier
    pub sensitivity: f32,
    /// Frames simulated so far
    pub frame_count: u64,
    /// Mines destroyed by any cause
    pub mines_destroyed: u32,
    /// Mines destroyed by lasers
    pub mines_shot: u32,
    /// Pending events since the last drain
    pub events: Vec<GameEvent>,
    /// Lasers and their directions, always the same length
    lasers: Vec<Laser>,
    laser_directions: Vec<Vec2>,
    /// Mine hit radius from the mine template
    mine_radius: f32,
    next_id: u32,
}

impl GameState {
    /// Start a session: ship at the center, starfield scattered over the area
    pub fn new(seed: u64, area: PlayArea, templates: &Templates, settings: &Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        let stars = (0..settings.star_count())
            .map(|_| Star {
                pos: Vec2::new(
                    rng.random::<f32>() * area.width,
                    rng.random::<f32>() * area.height,
                ),
                scale: rng.random_range(STAR_MIN_SCALE..STAR_MAX_SCALE),
            })
            .collect();

        Self {
            seed,
            rng,
            area,
            ship: Ship {
                pos: area.center(),
                rotation: 0.0,
                radius: templates.ship.radius,
            },
            stars,
            mines: Vec::new(),
            explosions: Vec::new(),
            mouse_vector: Vec2::ZERO,
            sensitivity: settings.sensitivity,
            frame_count: 0,
            mines_destroyed: 0,
            mines_shot: 0,
            events: Vec::new(),
            lasers: Vec::new(),
            laser_directions: Vec::new(),
            mine_radius: templates.mine.radius,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place a new mine at `pos`
    pub fn add_mine(&mut self, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.mines.push(Mine {
            id,
            pos,
            rotation: 0.0,
            radius: self.mine_radius,
        });
        self.events.push(GameEvent::MineSpawned { id, pos });
        id
    }

    /// Destroy the mine at `index`, leaving an explosion where it was.
    ///
    /// Every mine removal goes through here so each one gets exactly one
    /// explosion.
    pub fn remove_mine(&mut self, index: usize, cause: DestroyCause) {
        let mine = self.mines.remove(index);
        self.explosions.push(Explosion::new(mine.pos));
        self.mines_destroyed += 1;
        if cause == DestroyCause::LaserHit {
            self.mines_shot += 1;
        }
        log::debug!("Mine {} destroyed ({:?})", mine.id, cause);
        self.events.push(GameEvent::MineDestroyed {
            id: mine.id,
            pos: mine.pos,
            cause,
        });
    }

    /// Lasers in flight
    pub fn lasers(&self) -> &[Laser] {
        &self.lasers
    }

    /// Travel direction of each laser, index-aligned with `lasers()`
    pub fn laser_directions(&self) -> &[Vec2] {
        &self.laser_directions
    }

    /// Add a laser together with its travel direction
    pub fn push_laser(&mut self, pos: Vec2, rotation: f32, direction: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.lasers.push(Laser { id, pos, rotation });
        self.laser_directions.push(direction);
        self.events.push(GameEvent::LaserFired { id });
        id
    }

    /// Move the laser at `index` one step along its direction
    pub fn advance_laser(&mut self, index: usize) -> Vec2 {
        let laser = &mut self.lasers[index];
        laser.pos += self.laser_directions[index];
        laser.pos
    }

    /// Remove the laser at `index` and its direction in one step
    pub fn remove_laser(&mut self, index: usize) -> Laser {
        self.laser_directions.remove(index);
        self.lasers.remove(index)
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> GameState {
        let templates = Templates::embedded().unwrap();
        GameState::new(42, PlayArea::new(800.0, 600.0), &templates, &Settings::default())
    }

    #[test]
    fn test_new_session() {
        let state = test_state();
        assert_eq!(state.ship.pos, Vec2::new(400.0, 300.0));
        assert_eq!(state.stars.len(), Settings::default().star_count());
        assert!(state.mines.is_empty());
        assert!(state.lasers().is_empty());
        for star in &state.stars {
            assert!(state.area.contains(star.pos));
            assert!(star.scale >= STAR_MIN_SCALE && star.scale < STAR_MAX_SCALE);
        }
    }

    #[test]
    fn test_same_seed_same_starfield() {
        let a = test_state();
        let b = test_state();
        for (sa, sb) in a.stars.iter().zip(&b.stars) {
            assert_eq!(sa.pos, sb.pos);
            assert_eq!(sa.scale, sb.scale);
        }
    }

    #[test]
    fn test_wrap_rule() {
        let area = PlayArea::new(800.0, 600.0);
        let p = area.wrap(Vec2::new(805.0, 300.0));
        assert!((p.x - 5.0).abs() < 1e-4);
        assert!(p.x >= 0.0 && p.x < 800.0);

        let p = area.wrap(Vec2::new(-3.0, -1.0));
        assert_eq!(p.x, 800.0);
        assert_eq!(p.y, 600.0);

        let p = area.wrap(Vec2::new(100.0, 600.0));
        assert_eq!(p, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_remove_mine_leaves_explosion() {
        let mut state = test_state();
        state.add_mine(Vec2::new(10.0, 20.0));
        state.add_mine(Vec2::new(30.0, 40.0));
        state.drain_events();

        state.remove_mine(0, DestroyCause::PopulationCap);

        assert_eq!(state.mines.len(), 1);
        assert_eq!(state.explosions.len(), 1);
        assert_eq!(state.explosions[0].pos, Vec2::new(10.0, 20.0));
        assert_eq!(state.mines_destroyed, 1);
        assert_eq!(state.mines_shot, 0);
        assert!(matches!(
            state.drain_events().as_slice(),
            [GameEvent::MineDestroyed { cause: DestroyCause::PopulationCap, .. }]
        ));
    }

    #[test]
    fn test_laser_lists_stay_aligned() {
        let mut state = test_state();
        state.push_laser(Vec2::ZERO, 0.0, Vec2::new(7.0, 0.0));
        state.push_laser(Vec2::ZERO, 90.0, Vec2::new(0.0, 7.0));
        state.push_laser(Vec2::ZERO, 180.0, Vec2::new(-7.0, 0.0));

        let removed = state.remove_laser(1);
        assert_eq!(removed.rotation, 90.0);
        assert_eq!(state.lasers().len(), state.laser_directions().len());
        assert_eq!(state.laser_directions()[1], Vec2::new(-7.0, 0.0));
        assert_eq!(state.advance_laser(1), Vec2::new(-7.0, 0.0));
    }
}
