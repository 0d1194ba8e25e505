//! Session loop glue
//!
//! `App` owns the (optional) session together with the fixed-step clock, the
//! frame gate, the renderer and the leaderboard. Both entry points drive it
//! the same way: input events and timer wakeups mutate, `paint` reads.

use crate::audio::{AudioSink, SoundEffect};
use crate::clock::{FixedStep, FrameGate};
use crate::config::{ConfigError, GameConfig};
use crate::highscores::HighScores;
use crate::renderer::{PresentError, Renderer, Surface};
use crate::sim::{Command, GameEvent, GamePhase, GameState, autopilot, dispatch};

/// How long the autopilot lingers on the game-over screen (ticks)
const AUTOPILOT_RESTART_TICKS: u32 = 90;

/// Player input, already stripped of platform details
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    ImpulsePressed,
    ImpulseReleased,
}

impl From<InputEvent> for Command {
    fn from(event: InputEvent) -> Self {
        match event {
            InputEvent::ImpulsePressed => Command::Impulse,
            InputEvent::ImpulseReleased => Command::Release,
        }
    }
}

pub struct App {
    config: GameConfig,
    session: Option<GameState>,
    clock: FixedStep,
    frames: FrameGate,
    renderer: Renderer,
    high_scores: HighScores,
    autopilot: bool,
    /// Ticks spent in Over while the autopilot is driving
    over_ticks: u32,
}

impl App {
    /// Validate the config; no session exists until [`App::start`]
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let renderer = Renderer::new(config.width.round() as u32, config.height.round() as u32);
        Ok(Self {
            clock: FixedStep::new(config.dt()),
            frames: FrameGate::new(),
            renderer,
            high_scores: HighScores::new(),
            autopilot: false,
            over_ticks: 0,
            session: None,
            config,
        })
    }

    /// Create the session (replacing any previous one)
    pub fn start(&mut self, seed: u64) -> Result<(), ConfigError> {
        let seed = self.config.seed.unwrap_or(seed);
        self.session = Some(GameState::new(self.config.clone(), seed)?);
        self.clock.reset();
        self.over_ticks = 0;
        log::info!("Session started with seed {}", seed);
        Ok(())
    }

    pub fn session(&self) -> Option<&GameState> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn frames(&self) -> &FrameGate {
        &self.frames
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        if self.autopilot != enabled {
            log::info!("Autopilot: {}", enabled);
        }
        self.autopilot = enabled;
        self.over_ticks = 0;
    }

    /// Apply one input event; ignored when no session exists
    pub fn handle_input(&mut self, event: InputEvent, audio: &dyn AudioSink) {
        let Some(state) = self.session.as_mut() else {
            log::debug!("Input {:?} ignored: no active session", event);
            return;
        };
        dispatch(state, event.into(), self.clock.dt());
        self.process_events(audio);
    }

    /// Driver wakeup: run the ticks owed for `elapsed` seconds
    ///
    /// Returns true if the caller must schedule a repaint; false when one is
    /// already pending or there is nothing to show.
    pub fn on_timer(&mut self, elapsed: f32, audio: &dyn AudioSink) -> bool {
        if self.session.is_none() {
            return false;
        }
        let ticks = self.clock.advance(elapsed);
        for _ in 0..ticks {
            self.step(audio);
        }
        self.frames.request()
    }

    fn step(&mut self, audio: &dyn AudioSink) {
        let dt = self.clock.dt();
        let Some(state) = self.session.as_mut() else {
            return;
        };

        if self.autopilot {
            let wants = match state.phase() {
                GamePhase::Over => {
                    self.over_ticks += 1;
                    self.over_ticks >= AUTOPILOT_RESTART_TICKS
                }
                _ => autopilot::wants_impulse(state),
            };
            if wants {
                self.over_ticks = 0;
                dispatch(state, Command::Impulse, dt);
                dispatch(state, Command::Release, dt);
            }
        }

        dispatch(state, Command::Tick, dt);
        self.process_events(audio);
    }

    /// Route drained session events to audio and the leaderboard
    fn process_events(&mut self, audio: &dyn AudioSink) {
        let Some(state) = self.session.as_mut() else {
            return;
        };
        for event in state.drain_events() {
            if let Some(effect) = SoundEffect::from_event(&event) {
                audio.play(effect);
            }
            match event {
                GameEvent::Collision { kind } => {
                    log::info!(
                        "Run over ({:?}): score {} after {} ticks",
                        kind,
                        state.score(),
                        state.time_ticks()
                    );
                    if self.high_scores.add_score(state.score(), state.time_ticks()) == Some(1) {
                        audio.play(SoundEffect::HighScore);
                    }
                }
                GameEvent::PhaseChanged { from, to } => {
                    log::debug!("Phase changed {} -> {}", from.as_str(), to.as_str());
                }
                GameEvent::Flap | GameEvent::Scored { .. } => {}
            }
        }
    }

    /// Compose the latest committed state and publish it
    pub fn paint(&mut self, surface: &mut dyn Surface) -> Result<(), PresentError> {
        self.frames.begin_paint();
        let Some(state) = self.session.as_ref() else {
            return Ok(());
        };
        self.renderer
            .paint(state, self.high_scores.top_score(), surface)
    }
}
