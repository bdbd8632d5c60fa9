//! Pointer input: aiming and firing
//!
//! Handlers run between frames and mutate the state directly.

use glam::Vec2;

use super::state::GameState;
use crate::consts::*;
use crate::{angle_degrees, with_length, wrap_degrees};

/// A pointer event in play-area coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move(Vec2),
    Down,
}

/// Point the ship at `pointer`
pub fn aim(state: &mut GameState, pointer: Vec2) {
    state.mouse_vector = pointer - state.area.center();
    state.ship.rotation = wrap_degrees(angle_degrees(state.mouse_vector) + SHIP_HEADING_OFFSET_DEG);
}

/// Fire a laser from the ship along the current aim.
///
/// Every call fires. With the pointer exactly on the center the direction is
/// zero, so that laser stays on the ship.
pub fn fire(state: &mut GameState) -> u32 {
    let direction = with_length(state.mouse_vector, LASER_SPEED);
    let rotation = angle_degrees(state.mouse_vector);
    let pos = state.ship.pos;
    state.push_laser(pos, rotation, direction)
}

/// Dispatch a pointer event
pub fn handle(state: &mut GameState, event: PointerEvent) {
    match event {
        PointerEvent::Move(pointer) => aim(state, pointer),
        PointerEvent::Down => {
            fire(state);
        }
    }
}
