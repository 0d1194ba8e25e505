//! Session state
//!
//! One `GameState` is the single authority for phase, avatar, obstacles and
//! score. Outside the `sim` module it is read-only except for [`GameState::reset`]
//! and the command entrypoint in `tick`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::avatar::Avatar;
use super::collision::CollisionKind;
use super::obstacles::ObstacleStream;
use crate::config::{ConfigError, GameConfig};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Avatar idles, waiting for the first impulse
    #[default]
    Ready,
    /// Active gameplay
    Playing,
    /// Run ended; frozen until the next impulse resets
    Over,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Ready => "Ready",
            GamePhase::Playing => "Playing",
            GamePhase::Over => "Over",
        }
    }
}

/// Events emitted by the simulation for audio and UI subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An impulse was applied
    Flap,
    /// A slot was cleared; `total` is the new score
    Scored { total: u32 },
    /// The run ended
    Collision { kind: CollisionKind },
    PhaseChanged { from: GamePhase, to: GamePhase },
}

/// Complete session state (deterministic for a given seed and command stream)
#[derive(Debug, Clone)]
pub struct GameState {
    pub(super) config: GameConfig,
    /// Run seed for reproducibility
    pub(super) seed: u64,
    pub(super) rng: Pcg32,
    pub(super) phase: GamePhase,
    pub(super) avatar: Avatar,
    pub(super) obstacles: ObstacleStream,
    pub(super) score: u32,
    /// Ticks since the session (or the last reset) started; frozen while Over
    pub(super) time_ticks: u64,
    /// Pending events, drained by the app after every command
    pub(super) events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new session; the config must pass validation
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let avatar = Avatar::new(&config);
        let obstacles = ObstacleStream::new(&config, &mut rng);
        log::debug!("Session created with seed {}", seed);
        Ok(Self {
            config,
            seed,
            rng,
            phase: GamePhase::Ready,
            avatar,
            obstacles,
            score: 0,
            time_ticks: 0,
            events: Vec::new(),
        })
    }

    /// Reinitialize avatar, obstacles and score and return to Ready
    ///
    /// The RNG is not reseeded, so gap sequences differ between rounds while
    /// everything else starts identically.
    pub fn reset(&mut self) {
        let from = self.phase;
        self.avatar = Avatar::new(&self.config);
        self.obstacles.reset(&mut self.rng);
        self.score = 0;
        self.time_ticks = 0;
        self.phase = GamePhase::Ready;
        if from != GamePhase::Ready {
            self.events.push(GameEvent::PhaseChanged {
                from,
                to: GamePhase::Ready,
            });
        }
    }

    /// Replace the phase wholesale and record the transition
    pub(super) fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from != to {
            log::debug!("Phase {} -> {}", from.as_str(), to.as_str());
            self.phase = to;
            self.events.push(GameEvent::PhaseChanged { from, to });
        }
    }

    /// Take all pending events, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub fn obstacles(&self) -> &ObstacleStream {
        &self.obstacles
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }
}
