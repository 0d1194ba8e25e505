//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (slots leftmost first)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod avatar;
pub mod collision;
pub mod obstacles;
pub mod state;
pub mod tick;

pub use avatar::{Avatar, POSE_COUNT};
pub use collision::{Aabb, CollisionKind, Evaluation, avatar_slot_collision, evaluate, world_bounds_collision};
pub use obstacles::{ObstacleSlot, ObstacleStream};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{Command, dispatch, tick};
