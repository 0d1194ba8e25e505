//! Avatar physics body
//!
//! The avatar never corrects its own position: leaving the play area is the
//! evaluator's decision, not a clamp.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::config::GameConfig;

/// Number of wing poses in the flap animation cycle
pub const POSE_COUNT: u8 = 3;

/// The player's avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    /// Center position; x stays fixed for the whole session
    pub pos: Vec2,
    /// Vertical velocity (pixels/s, positive is down)
    pub vel_y: f32,
    /// Collision box half-extents
    pub half_extents: Vec2,
    /// Wing pose index (cosmetic)
    pub pose: u8,
    /// Advances since the last pose step
    pose_ticks: u32,
    pose_period: u32,
    /// Gravity only acts once the first impulse has been applied
    pub falling: bool,
    gravity: f32,
    impulse_velocity: f32,
}

impl Avatar {
    /// Create an idle avatar at the configured start position
    pub fn new(config: &GameConfig) -> Self {
        Self {
            pos: Vec2::new(config.avatar_x, config.avatar_start_y),
            vel_y: 0.0,
            half_extents: Vec2::new(config.avatar_half_width, config.avatar_half_height),
            pose: 0,
            pose_ticks: 0,
            pose_period: config.pose_period_ticks.max(1),
            falling: false,
            gravity: config.gravity,
            impulse_velocity: config.impulse_velocity,
        }
    }

    /// Set velocity to the impulse constant (overrides, never adds)
    pub fn apply_impulse(&mut self) {
        self.vel_y = self.impulse_velocity;
    }

    /// Let gravity act from now on
    pub fn start_falling(&mut self) {
        self.falling = true;
    }

    /// Integrate one fixed step (semi-implicit Euler) and advance the pose
    pub fn advance(&mut self, dt: f32) {
        if self.falling {
            self.vel_y += self.gravity * dt;
            self.pos.y += self.vel_y * dt;
        }

        self.pose_ticks += 1;
        if self.pose_ticks >= self.pose_period {
            self.pose_ticks = 0;
            self.pose = (self.pose + 1) % POSE_COUNT;
        }
    }

    /// Impulse input released: back to the resting pose, physics untouched
    pub fn release(&mut self) {
        self.pose = 0;
        self.pose_ticks = 0;
    }

    /// Current collision box
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.half_extents)
    }

    pub fn top(&self) -> f32 {
        self.pos.y - self.half_extents.y
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.half_extents.y
    }
}
