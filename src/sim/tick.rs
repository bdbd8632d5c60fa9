//! Per-frame simulation update
//!
//! Motion is per frame, not per second: the frame timing passed in is
//! informational only.

use super::collision::hit_test;
use super::state::{DestroyCause, GameState};
use crate::consts::*;
use crate::{with_length, wrap_degrees};

/// Timing info delivered with each animation frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInfo {
    /// Frames delivered so far
    pub count: u64,
    /// Seconds since the loop started
    pub time: f64,
    /// Seconds since the previous frame
    pub delta: f64,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, frame: &FrameInfo) {
    state.frame_count += 1;
    log::trace!(
        "frame {} (t={:.3}s, dt={:.4}s): {} mines, {} lasers",
        frame.count,
        frame.time,
        frame.delta,
        state.mines.len(),
        state.lasers().len()
    );

    update_stars(state);
    update_mines(state);
    update_lasers(state);
    update_explosions(state);
    enforce_mine_cap(state);
}

/// Parallax drift opposite the aim; bigger stars drift faster
fn update_stars(state: &mut GameState) {
    let area = state.area;
    let drift = state.mouse_vector * (STAR_PARALLAX * state.sensitivity);
    for star in &mut state.stars {
        star.pos += drift * star.width();
        star.pos = area.wrap(star.pos);
    }
}

/// Homing and drift for every mine; mines that reach the ship explode.
///
/// Removal happens in place during a forward scan, so the mine shifted into
/// a removed slot is skipped until the next frame.
fn update_mines(state: &mut GameState) {
    let drift = state.mouse_vector * (MINE_PARALLAX * state.sensitivity);
    let ship_pos = state.ship.pos;
    let ship_radius = state.ship.radius;

    let mut i = 0;
    while i < state.mines.len() {
        let mine = &mut state.mines[i];
        mine.pos += with_length(ship_pos - mine.pos, MINE_HOMING_SPEED);
        mine.pos += drift;
        mine.rotation = wrap_degrees(mine.rotation + MINE_SPIN_DEG);

        if hit_test(ship_pos, ship_radius, mine.pos, HIT_TOLERANCE) {
            state.remove_mine(i, DestroyCause::ShipCollision);
        }
        i += 1;
    }
}

/// Advance lasers and resolve their hits against mines.
///
/// Same forward scan as the mines: a laser shifted into a removed slot sits
/// out this frame. The mine test runs even for a laser that just left the
/// area, and the laser is removed only once.
///
/// The mine scan stops at the first hit, so one laser destroys at most one
/// mine per frame even when mines overlap. Testing every mine and destroying
/// each one hit is deliberately narrowed to this.
fn update_lasers(state: &mut GameState) {
    let mut i = 0;
    while i < state.lasers().len() {
        let pos = state.advance_laser(i);

        let mut removed = false;
        if !state.area.contains(pos) {
            state.remove_laser(i);
            removed = true;
        }

        let hit = state
            .mines
            .iter()
            .position(|mine| hit_test(mine.pos, mine.radius, pos, HIT_TOLERANCE));
        if let Some(j) = hit {
            state.remove_mine(j, DestroyCause::LaserHit);
            if !removed {
                state.remove_laser(i);
            }
        }
        i += 1;
    }
}

fn update_explosions(state: &mut GameState) {
    state.explosions.retain_mut(|explosion| {
        explosion.scale *= EXPLOSION_GROWTH;
        explosion.width() <= EXPLOSION_MAX_WIDTH
    });
}

/// Evict the oldest mine once the population exceeds the cap
fn enforce_mine_cap(state: &mut GameState) {
    if state.mines.len() > MAX_MINES {
        state.remove_mine(0, DestroyCause::PopulationCap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Templates;
    use crate::settings::Settings;
    use crate::sim::input::{aim, fire};
    use crate::sim::spawn::spawn_mine;
    use crate::sim::state::{GameEvent, PlayArea, Star};
    use glam::Vec2;
    use proptest::prelude::*;

    fn test_state() -> GameState {
        let templates = Templates::embedded().unwrap();
        let mut state =
            GameState::new(2024, PlayArea::new(800.0, 600.0), &templates, &Settings::default());
        state.stars.clear();
        state
    }

    fn step(state: &mut GameState) {
        let frame = FrameInfo {
            count: state.frame_count,
            time: state.frame_count as f64 / 60.0,
            delta: 1.0 / 60.0,
        };
        tick(state, &frame);
    }

    fn destroyed_causes(state: &mut GameState) -> Vec<DestroyCause> {
        state
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::MineDestroyed { cause, .. } => Some(cause),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_star_wrap() {
        let mut state = test_state();
        state.stars.push(Star {
            pos: Vec2::new(805.0, 100.0),
            scale: 1.0,
        });
        state.stars.push(Star {
            pos: Vec2::new(-3.0, 100.0),
            scale: 1.0,
        });

        step(&mut state);

        let x = state.stars[0].pos.x;
        assert!((0.0..800.0).contains(&x));
        assert!((x - 5.0).abs() < 1e-4);
        assert_eq!(state.stars[1].pos.x, 800.0);
    }

    #[test]
    fn test_star_parallax_scales_with_size() {
        let mut state = test_state();
        state.mouse_vector = Vec2::new(100.0, 0.0);
        state.stars.push(Star {
            pos: Vec2::new(400.0, 300.0),
            scale: 1.0,
        });
        state.stars.push(Star {
            pos: Vec2::new(400.0, 300.0),
            scale: 0.5,
        });

        step(&mut state);

        // 100 * -0.001 * 1.0 * width
        assert!((state.stars[0].pos.x - 399.0).abs() < 1e-4);
        assert!((state.stars[1].pos.x - 399.5).abs() < 1e-4);
    }

    #[test]
    fn test_mine_homes_and_spins() {
        let mut state = test_state();
        let ship = state.ship.pos;
        state.add_mine(ship + Vec2::new(200.0, 0.0));

        step(&mut state);

        let mine = &state.mines[0];
        assert!((mine.pos.x - (ship.x + 197.0)).abs() < 1e-4);
        assert!((mine.pos.y - ship.y).abs() < 1e-4);
        assert!((mine.rotation - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_mine_parallax_drift() {
        let mut state = test_state();
        let ship = state.ship.pos;
        state.mouse_vector = Vec2::new(0.0, 100.0);
        state.add_mine(ship + Vec2::new(200.0, 0.0));

        step(&mut state);

        // homing -3 in x, drift 100 * -0.006 in y
        let mine = &state.mines[0];
        assert!((mine.pos.x - (ship.x + 197.0)).abs() < 1e-4);
        assert!((mine.pos.y - (ship.y - 0.6)).abs() < 1e-4);
    }

    #[test]
    fn test_ship_collision_destroys_mine() {
        let mut state = test_state();
        let ship = state.ship.pos;
        state.add_mine(ship + Vec2::new(40.0, 0.0));
        state.drain_events();

        step(&mut state);

        assert!(state.mines.is_empty());
        assert_eq!(state.explosions.len(), 1);
        assert_eq!(destroyed_causes(&mut state), vec![DestroyCause::ShipCollision]);
    }

    #[test]
    fn test_mine_after_removed_one_is_skipped() {
        let mut state = test_state();
        let ship = state.ship.pos;
        state.add_mine(ship + Vec2::new(40.0, 0.0));
        let far = ship + Vec2::new(300.0, 0.0);
        state.add_mine(far);

        step(&mut state);

        // The survivor shifted into slot 0 and was not visited this frame
        assert_eq!(state.mines.len(), 1);
        assert_eq!(state.mines[0].pos, far);
        assert_eq!(state.mines[0].rotation, 0.0);

        step(&mut state);
        assert!((state.mines[0].pos.x - (far.x - 3.0)).abs() < 1e-4);
    }

    #[test]
    fn test_laser_travel_and_exit() {
        let mut state = test_state();
        aim(&mut state, Vec2::new(500.0, 300.0));
        fire(&mut state);
        let start = state.ship.pos;

        for n in 1..=57 {
            step(&mut state);
            assert_eq!(state.lasers().len(), 1);
            assert_eq!(state.lasers()[0].pos, start + Vec2::new(7.0 * n as f32, 0.0));
        }

        // 400 + 7 * 58 = 806 is past the right edge
        step(&mut state);
        assert!(state.lasers().is_empty());
        assert!(state.laser_directions().is_empty());
    }

    #[test]
    fn test_laser_after_removed_one_is_skipped() {
        let mut state = test_state();
        state.push_laser(Vec2::new(799.0, 300.0), 0.0, Vec2::new(7.0, 0.0));
        state.push_laser(Vec2::new(100.0, 300.0), 0.0, Vec2::new(7.0, 0.0));

        step(&mut state);

        assert_eq!(state.lasers().len(), 1);
        assert_eq!(state.lasers()[0].pos, Vec2::new(100.0, 300.0));
        assert_eq!(state.laser_directions(), &[Vec2::new(7.0, 0.0)]);
    }

    #[test]
    fn test_laser_shoots_down_mine() {
        let mut state = test_state();
        aim(&mut state, Vec2::new(700.0, 300.0));
        let ship = state.ship.pos;
        state.add_mine(ship + Vec2::new(200.0, 0.0));
        fire(&mut state);
        state.drain_events();

        let mut frames = 0;
        while !state.mines.is_empty() && frames < 60 {
            step(&mut state);
            frames += 1;
        }

        assert!(state.mines.is_empty());
        assert!(state.lasers().is_empty());
        assert!(state.laser_directions().is_empty());
        assert_eq!(state.explosions.len(), 1);
        assert_eq!(state.mines_shot, 1);
        assert_eq!(destroyed_causes(&mut state), vec![DestroyCause::LaserHit]);
    }

    #[test]
    fn test_exiting_laser_still_hits_offscreen_mine() {
        let mut state = test_state();
        state.push_laser(Vec2::new(795.0, 300.0), 0.0, Vec2::new(7.0, 0.0));
        state.add_mine(Vec2::new(840.0, 300.0));

        step(&mut state);

        assert!(state.lasers().is_empty());
        assert!(state.laser_directions().is_empty());
        assert!(state.mines.is_empty());
        assert_eq!(state.explosions.len(), 1);
    }

    #[test]
    fn test_one_laser_one_mine() {
        let mut state = test_state();
        state.push_laser(Vec2::new(100.0, 100.0), 0.0, Vec2::new(7.0, 0.0));
        state.add_mine(Vec2::new(110.0, 100.0));
        state.add_mine(Vec2::new(112.0, 100.0));

        step(&mut state);

        assert_eq!(state.mines.len(), 1);
        assert_eq!(state.explosions.len(), 1);
        assert!(state.lasers().is_empty());
    }

    #[test]
    fn test_explosion_grows_then_expires() {
        let mut state = test_state();
        state.add_mine(Vec2::new(50.0, 50.0));
        state.remove_mine(0, DestroyCause::PopulationCap);
        assert_eq!(state.explosions.len(), 1);

        // width 20 * 1.3^n stays <= 100 for n <= 6
        for _ in 0..6 {
            step(&mut state);
            assert_eq!(state.explosions.len(), 1);
        }
        let scale = state.explosions[0].scale;
        assert!((scale - EXPLOSION_GROWTH.powi(6)).abs() < 1e-3);

        step(&mut state);
        assert!(state.explosions.is_empty());
    }

    #[test]
    fn test_population_cap_evicts_oldest() {
        let mut state = test_state();
        let first = state.add_mine(Vec2::new(-4000.0, -4000.0));
        for k in 0..MAX_MINES {
            state.add_mine(Vec2::new(-4000.0, 4000.0 + k as f32 * 10.0));
        }
        assert_eq!(state.mines.len(), MAX_MINES + 1);
        state.drain_events();

        step(&mut state);

        assert_eq!(state.mines.len(), MAX_MINES);
        assert!(state.mines.iter().all(|m| m.id != first));
        assert_eq!(state.explosions.len(), 1);
        assert_eq!(destroyed_causes(&mut state), vec![DestroyCause::PopulationCap]);
    }

    #[test]
    fn test_determinism() {
        let mut a = test_state();
        let mut b = test_state();

        for state in [&mut a, &mut b] {
            aim(state, Vec2::new(650.0, 120.0));
            for frame in 0..240 {
                if frame % 45 == 0 {
                    spawn_mine(state);
                }
                if frame % 10 == 0 {
                    fire(state);
                }
                step(state);
            }
        }

        assert_eq!(a.mines.len(), b.mines.len());
        assert_eq!(a.mines_destroyed, b.mines_destroyed);
        for (ma, mb) in a.mines.iter().zip(&b.mines) {
            assert_eq!(ma.pos, mb.pos);
        }
    }

    #[derive(Debug, Clone)]
    enum Action {
        Aim(f32, f32),
        Fire,
        Spawn,
        Tick,
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            (0.0f32..800.0, 0.0f32..600.0).prop_map(|(x, y)| Action::Aim(x, y)),
            Just(Action::Fire),
            Just(Action::Spawn),
            Just(Action::Tick),
            Just(Action::Tick),
        ]
    }

    proptest! {
        #[test]
        fn prop_lasers_stay_aligned(actions in prop::collection::vec(action(), 1..300)) {
            let mut state = test_state();
            for action in actions {
                match action {
                    Action::Aim(x, y) => aim(&mut state, Vec2::new(x, y)),
                    Action::Fire => { fire(&mut state); }
                    Action::Spawn => { spawn_mine(&mut state); }
                    Action::Tick => {
                        let over_cap = state.mines.len() == MAX_MINES + 1;
                        step(&mut state);
                        prop_assert_eq!(state.lasers().len(), state.laser_directions().len());
                        if over_cap {
                            prop_assert!(state.mines.len() <= MAX_MINES);
                        }
                    }
                }
            }
        }

        #[test]
        fn prop_stars_stay_in_area(mx in -400.0f32..400.0, my in -300.0f32..300.0, frames in 1usize..50) {
            let templates = Templates::embedded().unwrap();
            let mut state =
                GameState::new(9, PlayArea::new(800.0, 600.0), &templates, &Settings::default());
            state.mouse_vector = Vec2::new(mx, my);
            for _ in 0..frames {
                step(&mut state);
            }
            for star in &state.stars {
                prop_assert!(star.pos.x >= 0.0 && star.pos.x <= 800.0);
                prop_assert!(star.pos.y >= 0.0 && star.pos.y <= 600.0);
            }
        }
    }
}
