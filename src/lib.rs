//! Skyflap - A side-scrolling flap-through-the-gaps arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, collisions, phase machine)
//! - `clock`: Fixed-step scheduling and redraw coalescing
//! - `renderer`: Off-screen frame composition and WebGPU presentation
//! - `audio`: Sound cues for simulation events
//! - `config`: Validated, data-driven game tuning
//! - `app`: Session loop glue shared by the browser and native entry points

pub mod app;
pub mod audio;
pub mod clock;
pub mod config;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod sim;

pub use app::{App, InputEvent};
pub use config::{ConfigError, GameConfig};
pub use highscores::HighScores;

/// Game configuration defaults
pub mod consts {
    /// Simulation rate (ticks per second)
    pub const TICK_RATE: f32 = 60.0;
    /// Maximum substeps per driver wakeup to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest wall-clock gap fed into the accumulator (tab switches, stalls)
    pub const MAX_FRAME_SECS: f32 = 0.1;
    /// Highest accepted simulation rate
    pub const MAX_TICK_RATE: f32 = 1000.0;
    /// Largest accepted playfield area (pixels)
    pub const MAX_PLAYFIELD_PIXELS: f64 = 4096.0 * 4096.0;

    /// Playfield dimensions (pixels)
    pub const PLAYFIELD_WIDTH: f32 = 480.0;
    pub const PLAYFIELD_HEIGHT: f32 = 640.0;
    /// Ground band drawn at the bottom; the play area ends at its top edge
    pub const GROUND_HEIGHT: f32 = 80.0;

    /// Avatar defaults
    pub const AVATAR_X: f32 = 140.0;
    pub const AVATAR_START_Y: f32 = 200.0;
    pub const AVATAR_HALF_WIDTH: f32 = 17.0;
    pub const AVATAR_HALF_HEIGHT: f32 = 12.0;

    /// Downward acceleration (pixels/s²)
    pub const GRAVITY: f32 = 1500.0;
    /// Velocity set by an impulse (pixels/s, negative is up)
    pub const IMPULSE_VELOCITY: f32 = -460.0;
    /// Advances per animation pose step
    pub const POSE_PERIOD_TICKS: u32 = 6;

    /// Obstacle defaults
    pub const SCROLL_SPEED: f32 = 150.0;
    pub const SLOT_COUNT: usize = 3;
    pub const SLOT_WIDTH: f32 = 70.0;
    /// Distance between the left edges of neighbouring slots
    pub const SLOT_SPACING: f32 = 220.0;
    pub const GAP_MIN: f32 = 140.0;
    pub const GAP_MAX: f32 = 180.0;
    /// Minimum distance between a gap and the top/floor of the play area
    pub const GAP_MARGIN: f32 = 50.0;
    /// Distance from the right edge of the playfield to the first slot
    pub const FIRST_SLOT_OFFSET: f32 = 120.0;
}
