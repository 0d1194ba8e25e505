//! Obstacle stream
//!
//! A fixed set of slots scrolls left. Slots are kept leftmost-first; a slot
//! that leaves the screen is recycled behind the rightmost one, so spans never
//! overlap as long as `slot_spacing > slot_width`.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// One obstacle: a column with a passable vertical gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSlot {
    /// Left edge
    pub x: f32,
    pub width: f32,
    pub gap_center: f32,
    pub gap_height: f32,
    /// Set once the avatar has passed this slot
    pub scored: bool,
}

impl ObstacleSlot {
    /// Trailing (right) edge
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn gap_top(&self) -> f32 {
        self.gap_center - self.gap_height / 2.0
    }

    pub fn gap_bottom(&self) -> f32 {
        self.gap_center + self.gap_height / 2.0
    }
}

/// Geometry shared by every slot, copied out of the config
#[derive(Debug, Clone, Copy)]
struct StreamGeometry {
    slot_width: f32,
    spacing: f32,
    speed: f32,
    gap_min: f32,
    gap_max: f32,
    margin: f32,
    floor_y: f32,
    first_x: f32,
    count: usize,
}

/// Ordered, fixed-size set of obstacle slots
#[derive(Debug, Clone)]
pub struct ObstacleStream {
    slots: VecDeque<ObstacleSlot>,
    geometry: StreamGeometry,
}

impl ObstacleStream {
    /// Lay out `slot_count` slots starting just past the right edge
    pub fn new(config: &GameConfig, rng: &mut impl Rng) -> Self {
        let geometry = StreamGeometry {
            slot_width: config.slot_width,
            spacing: config.slot_spacing,
            speed: config.scroll_speed,
            gap_min: config.gap_min,
            gap_max: config.gap_max,
            margin: config.gap_margin.max(0.0),
            floor_y: config.floor_y(),
            first_x: config.width + config.first_slot_offset,
            count: config.slot_count,
        };
        let mut stream = Self {
            slots: VecDeque::with_capacity(geometry.count),
            geometry,
        };
        stream.reset(rng);
        stream
    }

    /// Reinitialize every slot at its starting position with fresh gaps
    pub fn reset(&mut self, rng: &mut impl Rng) {
        let g = self.geometry;
        self.slots.clear();
        for i in 0..g.count {
            let (gap_center, gap_height) = Self::random_gap(&g, rng);
            self.slots.push_back(ObstacleSlot {
                x: g.first_x + i as f32 * g.spacing,
                width: g.slot_width,
                gap_center,
                gap_height,
                scored: false,
            });
        }
    }

    /// Scroll left by `speed * dt`, then recycle slots that left the screen
    pub fn advance(&mut self, dt: f32, rng: &mut impl Rng) {
        let shift = self.geometry.speed * dt;
        for slot in self.slots.iter_mut() {
            slot.x -= shift;
        }

        // Leftmost first; a recycled slot becomes the new rightmost
        while self.slots.front().is_some_and(|s| s.right() < 0.0) {
            let Some(mut slot) = self.slots.pop_front() else {
                break;
            };
            let anchor = self.slots.back().map_or(slot.x, |s| s.x);
            let (gap_center, gap_height) = Self::random_gap(&self.geometry, rng);
            slot.x = anchor + self.geometry.spacing;
            slot.gap_center = gap_center;
            slot.gap_height = gap_height;
            slot.scored = false;
            log::trace!("Recycled slot to x={:.1}, gap center {:.1}", slot.x, gap_center);
            self.slots.push_back(slot);
        }
    }

    /// Draw height first, then a center that keeps the gap inside the margins
    fn random_gap(g: &StreamGeometry, rng: &mut impl Rng) -> (f32, f32) {
        let height = if g.gap_max > g.gap_min {
            rng.random_range(g.gap_min..=g.gap_max)
        } else {
            g.gap_min
        };
        let lo = g.margin + height / 2.0;
        let hi = g.floor_y - g.margin - height / 2.0;
        let center = if hi > lo { rng.random_range(lo..=hi) } else { lo };
        (center, height)
    }

    /// Slots, leftmost first
    pub fn slots(&self) -> impl Iterator<Item = &ObstacleSlot> {
        self.slots.iter()
    }

    pub(crate) fn slots_mut(&mut self) -> impl Iterator<Item = &mut ObstacleSlot> {
        self.slots.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn spans_disjoint(stream: &ObstacleStream) -> bool {
        let slots: Vec<_> = stream.slots().collect();
        slots.windows(2).all(|w| w[0].right() < w[1].x)
    }

    fn gaps_in_bounds(stream: &ObstacleStream, config: &GameConfig) -> bool {
        stream.slots().all(|s| {
            s.gap_top() >= config.gap_margin - 1e-3
                && s.gap_bottom() <= config.floor_y() - config.gap_margin + 1e-3
                && s.gap_height >= config.gap_min
                && s.gap_height <= config.gap_max
        })
    }

    #[test]
    fn test_initial_layout() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let stream = ObstacleStream::new(&config, &mut rng);
        assert_eq!(stream.len(), config.slot_count);
        let xs: Vec<f32> = stream.slots().map(|s| s.x).collect();
        let first = config.width + config.first_slot_offset;
        assert_eq!(xs[0], first);
        assert_eq!(xs[1], first + config.slot_spacing);
        assert!(stream.slots().all(|s| !s.scored));
    }

    #[test]
    fn test_advance_shifts_left() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut stream = ObstacleStream::new(&config, &mut rng);
        let before: Vec<f32> = stream.slots().map(|s| s.x).collect();
        stream.advance(0.5, &mut rng);
        for (slot, x) in stream.slots().zip(before) {
            assert!((slot.x - (x - config.scroll_speed * 0.5)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_recycle_moves_slot_behind_rightmost() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut stream = ObstacleStream::new(&config, &mut rng);
        stream.slots[0].x = -config.slot_width - 1.0;
        stream.slots[0].scored = true;
        let rightmost = stream.slots.back().map(|s| s.x).unwrap();

        stream.advance(0.0, &mut rng);

        let last = stream.slots.back().unwrap();
        assert_eq!(last.x, rightmost + config.slot_spacing);
        assert!(!last.scored);
        assert_eq!(stream.len(), config.slot_count);
    }

    #[test]
    fn test_slot_touching_left_edge_not_recycled() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut stream = ObstacleStream::new(&config, &mut rng);
        stream.slots[0].x = -config.slot_width;
        stream.advance(0.0, &mut rng);
        assert_eq!(stream.slots[0].x, -config.slot_width);
    }

    #[test]
    fn test_single_slot_recycles_onto_itself() {
        let config = GameConfig {
            slot_count: 1,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let mut stream = ObstacleStream::new(&config, &mut rng);
        stream.slots[0].x = -config.slot_width - 10.0;
        stream.advance(0.0, &mut rng);
        assert_eq!(stream.slots[0].x, -config.slot_width - 10.0 + config.slot_spacing);
    }

    #[test]
    fn test_same_seed_same_gaps() {
        let config = GameConfig::default();
        let run = |seed| {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut stream = ObstacleStream::new(&config, &mut rng);
            let mut centers = Vec::new();
            for _ in 0..2000 {
                stream.advance(config.dt(), &mut rng);
                centers.extend(stream.slots().map(|s| s.gap_center));
            }
            centers
        };
        assert_eq!(run(99), run(99));
    }

    proptest! {
        #[test]
        fn prop_spans_never_overlap(seed in any::<u64>(), ticks in 1usize..2000) {
            let config = GameConfig::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut stream = ObstacleStream::new(&config, &mut rng);
            for _ in 0..ticks {
                stream.advance(config.dt(), &mut rng);
                prop_assert!(spans_disjoint(&stream));
            }
        }

        #[test]
        fn prop_gaps_stay_inside_playfield(seed in any::<u64>()) {
            let config = GameConfig::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut stream = ObstacleStream::new(&config, &mut rng);
            prop_assert!(gaps_in_bounds(&stream, &config));
            for _ in 0..1500 {
                stream.advance(config.dt(), &mut rng);
                prop_assert!(gaps_in_bounds(&stream, &config));
            }
        }
    }
}
