//! Scripted session without a browser
//!
//! Drives the simulation with a sweeping aim, a steady trigger finger and the
//! accumulator spawner. Used by the native binary and as a soak test.

use glam::Vec2;

use crate::assets::Templates;
use crate::settings::Settings;
use crate::sim::{FrameInfo, GameState, PlayArea, PointerEvent, Spawner, handle, tick};

/// Frame period of the scripted run, in milliseconds
const FRAME_MS: f64 = 1000.0 / 60.0;
/// Frames between trigger pulls
const FIRE_EVERY: u64 = 12;
/// Frames for one full sweep of the aim around the ship
const SWEEP_FRAMES: f32 = 480.0;

/// Outcome of a scripted session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessReport {
    pub frames: u64,
    pub mines_spawned: u32,
    pub lasers_fired: u32,
    pub mines_destroyed: u32,
    pub mines_shot: u32,
    pub mines_alive: usize,
}

/// Pointer position for frame `n`: circling the center at a third of the
/// shorter side
fn scripted_pointer(area: PlayArea, n: u64) -> Vec2 {
    let angle = n as f32 / SWEEP_FRAMES * std::f32::consts::TAU;
    let radius = area.width.min(area.height) / 3.0;
    area.center() + Vec2::new(angle.cos(), angle.sin()) * radius
}

/// Run `frames` frames of a seeded session
pub fn run(
    seed: u64,
    frames: u64,
    area: PlayArea,
    templates: &Templates,
    settings: &Settings,
) -> HeadlessReport {
    let mut state = GameState::new(seed, area, templates, settings);
    let mut spawner = Spawner::default();
    let mut mines_spawned = 0;
    let mut lasers_fired = 0;

    log::info!("Headless run: seed {}, {} frames", seed, frames);

    for n in 0..frames {
        handle(&mut state, PointerEvent::Move(scripted_pointer(area, n)));
        if n % FIRE_EVERY == 0 {
            handle(&mut state, PointerEvent::Down);
            lasers_fired += 1;
        }
        mines_spawned += spawner.run(&mut state, FRAME_MS);

        let frame = FrameInfo {
            count: n,
            time: n as f64 * FRAME_MS / 1000.0,
            delta: FRAME_MS / 1000.0,
        };
        tick(&mut state, &frame);
        state.drain_events();

        if (n + 1) % 600 == 0 {
            log::info!(
                "frame {}: {} mines alive, {} destroyed, {} shot",
                n + 1,
                state.mines.len(),
                state.mines_destroyed,
                state.mines_shot
            );
        }
    }

    HeadlessReport {
        frames: state.frame_count,
        mines_spawned,
        lasers_fired,
        mines_destroyed: state.mines_destroyed,
        mines_shot: state.mines_shot,
        mines_alive: state.mines.len(),
    }
}
