//! Fixed-step scheduling
//!
//! The driver wakes up at whatever cadence the platform manages; this turns
//! real elapsed time into whole simulation ticks of constant `dt`, so motion
//! does not depend on wakeup jitter.

use crate::consts::{MAX_FRAME_SECS, MAX_SUBSTEPS};

/// Accumulates elapsed time and hands out fixed ticks
#[derive(Debug, Clone)]
pub struct FixedStep {
    dt: f32,
    accumulator: f32,
    max_substeps: u32,
}

impl FixedStep {
    /// The substep cap covers at least one clamped frame at this `dt`
    pub fn new(dt: f32) -> Self {
        let per_frame = (MAX_FRAME_SECS / dt).ceil() as u32;
        Self {
            dt,
            accumulator: 0.0,
            max_substeps: per_frame.max(MAX_SUBSTEPS),
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn max_substeps(&self) -> u32 {
        self.max_substeps
    }

    /// Add elapsed wall-clock seconds; returns how many ticks to run now
    ///
    /// Long stalls are clamped and any backlog beyond the substep cap is
    /// dropped rather than replayed.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        self.accumulator += elapsed.clamp(0.0, MAX_FRAME_SECS);

        let mut ticks = 0;
        while self.accumulator >= self.dt && ticks < self.max_substeps {
            self.accumulator -= self.dt;
            ticks += 1;
        }
        if ticks == self.max_substeps {
            self.accumulator = self.accumulator.min(self.dt);
        }
        ticks
    }

    /// Forget partial time (after a restart)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Coalesces redraw requests: at most one paint outstanding
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    pending: bool,
    coalesced: u64,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a repaint; true if the caller must schedule one
    pub fn request(&mut self) -> bool {
        if self.pending {
            self.coalesced += 1;
            false
        } else {
            self.pending = true;
            true
        }
    }

    /// Called when a paint starts; later requests schedule a new one
    pub fn begin_paint(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Requests merged into an already scheduled paint
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_partial_steps() {
        let mut step = FixedStep::new(0.01);
        assert_eq!(step.advance(0.005), 0);
        assert_eq!(step.advance(0.006), 1);
        assert_eq!(step.advance(0.025), 2);
    }

    #[test]
    fn test_substeps_capped() {
        let mut step = FixedStep::new(1.0 / 60.0);
        assert_eq!(step.max_substeps(), MAX_SUBSTEPS);
        let ticks = step.advance(10.0);
        assert!((5..=6).contains(&ticks), "ran {} ticks", ticks);
        // Stall was clamped, not carried into the next wakeup
        assert!(step.advance(0.0) <= 1);
    }

    #[test]
    fn test_high_tick_rate_keeps_real_time() {
        let mut step = FixedStep::new(1.0 / 1000.0);
        assert!(step.max_substeps() >= 100);
        let total: u32 = (0..10).map(|_| step.advance(0.016)).sum();
        assert!((159..=160).contains(&total), "160ms ran {} ticks", total);
    }

    #[test]
    fn test_negative_elapsed_ignored() {
        let mut step = FixedStep::new(0.01);
        assert_eq!(step.advance(-1.0), 0);
        assert_eq!(step.advance(0.0105), 1);
    }

    #[test]
    fn test_reset_clears_accumulator() {
        let mut step = FixedStep::new(0.01);
        step.advance(0.009);
        step.reset();
        assert_eq!(step.advance(0.002), 0);
    }

    #[test]
    fn test_frame_gate_coalesces() {
        let mut gate = FrameGate::new();
        assert!(gate.request());
        assert!(!gate.request());
        assert!(!gate.request());
        assert_eq!(gate.coalesced(), 2);
        gate.begin_paint();
        assert!(!gate.is_pending());
        assert!(gate.request());
    }
}
