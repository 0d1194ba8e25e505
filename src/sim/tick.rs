//! Phase machine and fixed timestep tick
//!
//! [`dispatch`] is the only way to mutate a running session. Input and the
//! scheduler both funnel through it, so every change is one small step that
//! completes before the next command (or a paint) can observe the state.

use super::collision::evaluate;
use super::state::{GameEvent, GamePhase, GameState};

/// A single mutation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Impulse input pressed
    Impulse,
    /// Impulse input released (cosmetic only)
    Release,
    /// Advance one fixed timestep
    Tick,
}

/// Apply one command to the session
pub fn dispatch(state: &mut GameState, command: Command, dt: f32) {
    match command {
        Command::Impulse => on_impulse(state),
        Command::Release => state.avatar.release(),
        Command::Tick => tick(state, dt),
    }
}

/// Route an impulse by phase: at most one transition and one impulse
fn on_impulse(state: &mut GameState) {
    match state.phase {
        GamePhase::Ready => {
            state.avatar.apply_impulse();
            state.avatar.start_falling();
            state.events.push(GameEvent::Flap);
            state.set_phase(GamePhase::Playing);
        }
        GamePhase::Playing => {
            state.avatar.apply_impulse();
            state.events.push(GameEvent::Flap);
        }
        GamePhase::Over => {
            state.reset();
        }
    }
}

/// Advance the session by one fixed timestep
pub fn tick(state: &mut GameState, dt: f32) {
    match state.phase {
        GamePhase::Over => {}
        GamePhase::Ready => {
            // Idle animation only
            state.time_ticks += 1;
        }
        GamePhase::Playing => {
            state.time_ticks += 1;
            state.avatar.advance(dt);
            state.obstacles.advance(dt, &mut state.rng);

            let floor_y = state.config.floor_y();
            let result = evaluate(&state.avatar, &mut state.obstacles, floor_y);

            for _ in 0..result.cleared {
                state.score += 1;
                state.events.push(GameEvent::Scored { total: state.score });
            }

            if let Some(kind) = result.collision {
                log::debug!(
                    "Collision ({:?}) at tick {} with score {}",
                    kind,
                    state.time_ticks,
                    state.score
                );
                state.events.push(GameEvent::Collision { kind });
                state.set_phase(GamePhase::Over);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::collision::CollisionKind;
    use proptest::prelude::*;

    fn new_state() -> GameState {
        GameState::new(GameConfig::default(), 12345).unwrap()
    }

    /// Park every slot far to the right so only world bounds matter
    fn clear_slots(state: &mut GameState) {
        for (i, slot) in state.obstacles.slots_mut().enumerate() {
            slot.x = 10_000.0 + i as f32 * 1_000.0;
        }
    }

    #[test]
    fn test_ready_to_playing_on_impulse() {
        let mut state = new_state();
        let dt = state.config.dt();

        // Ticks without input stay in Ready, avatar static
        for _ in 0..10 {
            dispatch(&mut state, Command::Tick, dt);
        }
        assert_eq!(state.phase(), GamePhase::Ready);
        assert_eq!(state.avatar().pos.y, 200.0);

        dispatch(&mut state, Command::Impulse, dt);
        assert_eq!(state.phase(), GamePhase::Playing);
        assert_eq!(state.avatar().vel_y, state.config.impulse_velocity);
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::Flap,
                GameEvent::PhaseChanged {
                    from: GamePhase::Ready,
                    to: GamePhase::Playing
                }
            ]
        );
    }

    #[test]
    fn test_ready_does_not_scroll_obstacles() {
        let mut state = new_state();
        let dt = state.config.dt();
        let before: Vec<f32> = state.obstacles().slots().map(|s| s.x).collect();
        for _ in 0..30 {
            dispatch(&mut state, Command::Tick, dt);
        }
        let after: Vec<f32> = state.obstacles().slots().map(|s| s.x).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_closed_form_fall_after_first_impulse() {
        let mut state = new_state();
        clear_slots(&mut state);
        let dt = state.config.dt();
        let g = state.config.gravity;
        let v0 = state.config.impulse_velocity;
        let y0 = state.avatar().pos.y;

        dispatch(&mut state, Command::Impulse, dt);
        let n = 20;
        for _ in 0..n {
            dispatch(&mut state, Command::Tick, dt);
        }
        assert_eq!(state.phase(), GamePhase::Playing);

        let nf = n as f32;
        let expected = y0 + nf * v0 * dt + g * dt * dt * nf * (nf + 1.0) / 2.0;
        assert!(
            (state.avatar().pos.y - expected).abs() < 1e-2,
            "y={} expected={}",
            state.avatar().pos.y,
            expected
        );
        let expected_vel = v0 + g * dt * nf;
        assert!((state.avatar().vel_y - expected_vel).abs() < 1e-2);
    }

    #[test]
    fn test_impulse_while_playing_keeps_phase() {
        let mut state = new_state();
        clear_slots(&mut state);
        let dt = state.config.dt();
        dispatch(&mut state, Command::Impulse, dt);
        for _ in 0..5 {
            dispatch(&mut state, Command::Tick, dt);
        }
        state.drain_events();

        dispatch(&mut state, Command::Impulse, dt);
        assert_eq!(state.phase(), GamePhase::Playing);
        assert_eq!(state.avatar().vel_y, state.config.impulse_velocity);
        assert_eq!(state.drain_events(), vec![GameEvent::Flap]);

        dispatch(&mut state, Command::Tick, dt);
        let expected = state.config.impulse_velocity + state.config.gravity * dt;
        assert!((state.avatar().vel_y - expected).abs() < 1e-4);
    }

    #[test]
    fn test_floor_ends_run() {
        let mut state = new_state();
        clear_slots(&mut state);
        let dt = state.config.dt();
        dispatch(&mut state, Command::Impulse, dt);

        let mut ticks = 0;
        while state.phase() == GamePhase::Playing && ticks < 1000 {
            dispatch(&mut state, Command::Tick, dt);
            ticks += 1;
        }
        assert_eq!(state.phase(), GamePhase::Over);
        assert!(state.avatar().bottom() > state.config.floor_y());
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Collision {
            kind: CollisionKind::Floor
        }));
    }

    #[test]
    fn test_ceiling_ends_run() {
        let mut state = new_state();
        clear_slots(&mut state);
        let dt = state.config.dt();
        dispatch(&mut state, Command::Impulse, dt);
        let mut ticks = 0;
        while state.phase() == GamePhase::Playing && ticks < 1000 {
            dispatch(&mut state, Command::Impulse, dt);
            dispatch(&mut state, Command::Tick, dt);
            ticks += 1;
        }
        assert_eq!(state.phase(), GamePhase::Over);
        assert!(state.avatar().top() < 0.0);
    }

    #[test]
    fn test_over_freezes_world() {
        let mut state = new_state();
        let dt = state.config.dt();
        dispatch(&mut state, Command::Impulse, dt);
        state.set_phase(GamePhase::Over);

        let avatar = state.avatar().clone();
        let xs: Vec<f32> = state.obstacles().slots().map(|s| s.x).collect();
        let ticks = state.time_ticks();
        for _ in 0..30 {
            dispatch(&mut state, Command::Tick, dt);
        }
        assert_eq!(state.avatar(), &avatar);
        assert_eq!(xs, state.obstacles().slots().map(|s| s.x).collect::<Vec<_>>());
        assert_eq!(ticks, state.time_ticks());
    }

    #[test]
    fn test_impulse_when_over_resets_to_ready() {
        let mut state = new_state();
        clear_slots(&mut state);
        let dt = state.config.dt();
        dispatch(&mut state, Command::Impulse, dt);
        while state.phase() == GamePhase::Playing {
            dispatch(&mut state, Command::Tick, dt);
        }
        state.score = 3;
        state.drain_events();

        dispatch(&mut state, Command::Impulse, dt);
        assert_eq!(state.phase(), GamePhase::Ready);
        assert_eq!(state.score(), 0);
        assert_eq!(state.avatar().pos.y, state.config.avatar_start_y);
        assert_eq!(state.avatar().vel_y, 0.0);
        assert!(!state.avatar().falling);
        // No flap: the reset consumed the impulse
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::PhaseChanged {
                from: GamePhase::Over,
                to: GamePhase::Ready
            }]
        );
    }

    #[test]
    fn test_slot_scored_exactly_once() {
        let mut state = new_state();
        clear_slots(&mut state);
        let dt = state.config.dt();
        dispatch(&mut state, Command::Impulse, dt);

        // Put a slot right in front of the avatar with a gap around it
        let avatar_x = state.avatar().pos.x;
        let avatar_y = state.avatar().pos.y;
        if let Some(slot) = state.obstacles.slots_mut().next() {
            slot.x = avatar_x + 1.0;
            slot.gap_center = avatar_y;
            slot.gap_height = 300.0;
        }
        state.drain_events();

        // One tick moves the slot 2.5px left: its left edge crosses avatar x
        dispatch(&mut state, Command::Tick, dt);
        assert_eq!(state.score(), 1);
        assert_eq!(state.drain_events(), vec![GameEvent::Scored { total: 1 }]);

        // Still overlapping on the next tick: no second point
        dispatch(&mut state, Command::Tick, dt);
        assert_eq!(state.score(), 1);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_score_counts_before_collision_same_tick() {
        let mut state = new_state();
        clear_slots(&mut state);
        let dt = state.config.dt();
        dispatch(&mut state, Command::Impulse, dt);

        let avatar_x = state.avatar().pos.x;
        let half_w = state.avatar().half_extents.x;
        {
            let mut slots = state.obstacles.slots_mut();
            // Already-passed slot whose left edge just crossed, gap around the avatar
            if let Some(passed) = slots.next() {
                passed.x = avatar_x - 30.0;
                passed.gap_center = 200.0;
                passed.gap_height = 300.0;
            }
            // Next slot overlapping the avatar with its gap far away
            if let Some(blocking) = slots.next() {
                blocking.x = avatar_x + half_w - 5.0;
                blocking.gap_center = 500.0;
                blocking.gap_height = 60.0;
            }
        }
        state.drain_events();

        dispatch(&mut state, Command::Tick, dt);
        assert_eq!(state.score(), 1);
        assert_eq!(state.phase(), GamePhase::Over);
        let events = state.drain_events();
        assert_eq!(events[0], GameEvent::Scored { total: 1 });
        assert_eq!(
            events[1],
            GameEvent::Collision {
                kind: CollisionKind::Obstacle
            }
        );
    }

    #[test]
    fn test_release_is_cosmetic() {
        let mut state = new_state();
        let dt = state.config.dt();
        dispatch(&mut state, Command::Impulse, dt);
        for _ in 0..7 {
            dispatch(&mut state, Command::Tick, dt);
        }
        let (y, vel, phase) = (state.avatar().pos.y, state.avatar().vel_y, state.phase());
        state.drain_events();
        dispatch(&mut state, Command::Release, dt);
        assert_eq!(state.avatar().pose, 0);
        assert_eq!((y, vel, phase), (state.avatar().pos.y, state.avatar().vel_y, state.phase()));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(GameConfig::default(), 99999).unwrap();
        let mut b = GameState::new(GameConfig::default(), 99999).unwrap();
        let dt = a.config.dt();
        for i in 0..600 {
            let cmd = if i % 25 == 0 { Command::Impulse } else { Command::Tick };
            dispatch(&mut a, cmd, dt);
            dispatch(&mut b, cmd, dt);
        }
        assert_eq!(a.phase(), b.phase());
        assert_eq!(a.score(), b.score());
        assert_eq!(a.avatar(), b.avatar());
        assert!(a.obstacles().slots().eq(b.obstacles().slots()));
    }

    proptest! {
        #[test]
        fn prop_phase_transitions_follow_table(
            seed in any::<u64>(),
            commands in proptest::collection::vec(0u8..3, 1..400),
        ) {
            let mut state = GameState::new(GameConfig::default(), seed).unwrap();
            let dt = state.config.dt();
            let mut last_score = 0;
            for c in commands {
                let cmd = match c {
                    0 => Command::Impulse,
                    1 => Command::Release,
                    _ => Command::Tick,
                };
                let before = state.phase();
                dispatch(&mut state, cmd, dt);
                let after = state.phase();
                let allowed = match (before, after) {
                    (a, b) if a == b => true,
                    (GamePhase::Ready, GamePhase::Playing) => cmd == Command::Impulse,
                    (GamePhase::Playing, GamePhase::Over) => cmd == Command::Tick,
                    (GamePhase::Over, GamePhase::Ready) => cmd == Command::Impulse,
                    _ => false,
                };
                prop_assert!(allowed, "{:?} -> {:?} via {:?}", before, after, cmd);

                if after == GamePhase::Ready {
                    prop_assert_eq!(state.score(), 0);
                    last_score = 0;
                } else {
                    prop_assert!(state.score() >= last_score);
                    last_score = state.score();
                }
            }
        }
    }
}
