//! Demo controller
//!
//! Decides from the current state alone whether an impulse should be sent
//! this tick. Used by the headless runner and the browser idle mode.

use super::state::{GamePhase, GameState};

/// How far below the gap center the avatar may sink before flapping
const AIM_BELOW_CENTER: f32 = 0.25;

/// True if the autopilot wants an impulse now
///
/// Over is left to the caller, which decides how long to linger on the
/// game-over screen before restarting.
pub fn wants_impulse(state: &GameState) -> bool {
    match state.phase() {
        GamePhase::Ready => true,
        GamePhase::Over => false,
        GamePhase::Playing => {
            let avatar = state.avatar();
            let left = avatar.pos.x - avatar.half_extents.x;
            let target = state
                .obstacles()
                .slots()
                .find(|s| s.right() >= left)
                .map(|s| s.gap_center + s.gap_height * AIM_BELOW_CENTER / 2.0)
                .unwrap_or(state.config().floor_y() / 2.0);
            avatar.pos.y > target && avatar.vel_y >= 0.0
        }
    }
}
