//! Collision detection and scoring
//!
//! Everything is axis-aligned boxes. Containment is boundary-inclusive: an
//! avatar edge exactly on a gap edge or on the top of the play area is safe.
//! Horizontal overlap is strict, so touching a slot's side is not contact.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::avatar::Avatar;
use super::obstacles::{ObstacleSlot, ObstacleStream};

/// Axis-aligned bounding box (screen coordinates, +y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Open-interval overlap on x
    pub fn overlaps_x(&self, left: f32, right: f32) -> bool {
        self.min.x < right && self.max.x > left
    }

    /// Closed-interval containment on y
    pub fn within_y(&self, top: f32, bottom: f32) -> bool {
        self.min.y >= top && self.max.y <= bottom
    }
}

/// What the avatar ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Hit the solid part of an obstacle slot
    Obstacle,
    /// Left the play area through the top
    Ceiling,
    /// Reached the ground
    Floor,
}

/// Outcome of one evaluation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// Slots cleared this pass
    pub cleared: u32,
    pub collision: Option<CollisionKind>,
}

/// Check a single slot against an avatar box
pub fn avatar_slot_collision(bounds: &Aabb, slot: &ObstacleSlot) -> bool {
    bounds.overlaps_x(slot.x, slot.right()) && !bounds.within_y(slot.gap_top(), slot.gap_bottom())
}

/// Check the avatar box against the top of the screen and the floor
pub fn world_bounds_collision(bounds: &Aabb, floor_y: f32) -> Option<CollisionKind> {
    if bounds.min.y < 0.0 {
        Some(CollisionKind::Ceiling)
    } else if bounds.max.y > floor_y {
        Some(CollisionKind::Floor)
    } else {
        None
    }
}

/// Score newly passed slots, then look for a collision
///
/// Scoring runs first so clearing a gap and hitting the next obstacle on the
/// same tick still counts the clear. A slot is passed once its left edge is
/// strictly behind the avatar's x; its `scored` flag prevents double counts.
pub fn evaluate(avatar: &Avatar, obstacles: &mut ObstacleStream, floor_y: f32) -> Evaluation {
    let mut result = Evaluation::default();

    for slot in obstacles.slots_mut() {
        if !slot.scored && slot.x < avatar.pos.x {
            slot.scored = true;
            result.cleared += 1;
        }
    }

    let bounds = avatar.bounds();
    result.collision = if obstacles
        .slots()
        .any(|slot| avatar_slot_collision(&bounds, slot))
    {
        Some(CollisionKind::Obstacle)
    } else {
        world_bounds_collision(&bounds, floor_y)
    };

    result
}
