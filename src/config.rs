//! Game tuning and preferences
//!
//! Loaded from JSON on native builds, defaults in the browser. Every value is
//! checked once by [`GameConfig::validate`] before a session can be created;
//! there is no safe fallback for a playfield that cannot hold its own gaps.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Reasons a configuration is rejected at startup
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read
    Io(std::io::Error),
    /// Config file is not valid JSON for [`GameConfig`]
    Parse(serde_json::Error),
    /// A value is infinite or NaN
    NotFinite { field: &'static str, value: f32 },
    /// A dimension, rate or speed that must be > 0 is not
    NonPositive { field: &'static str, value: f32 },
    /// The frame buffer for this playfield would be unreasonably large
    PlayfieldTooLarge { pixels: f64, max: f64 },
    /// More ticks per second than one driver wakeup can catch up on
    TickRateTooHigh { tick_rate: f32, max: f32 },
    /// The ground band leaves no room to play
    GroundTooTall { ground_height: f32, height: f32 },
    /// `gap_min` is larger than `gap_max`
    GapRangeInverted { gap_min: f32, gap_max: f32 },
    /// The largest gap plus its margins does not fit above the floor
    GapExceedsPlayfield { needed: f32, available: f32 },
    /// Neighbouring slots would overlap
    SpacingTooSmall { spacing: f32, slot_width: f32 },
    /// The avatar cannot fit through the smallest gap
    AvatarTooLarge { avatar_height: f32, gap_min: f32 },
    /// The avatar does not start inside the play area
    AvatarOutOfBounds { y: f32 },
    /// Impulse must point up (negative y)
    ImpulseNotUpward { value: f32 },
    /// Obstacle stream needs at least one slot
    NoSlots,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config: {}", e),
            Self::Parse(e) => write!(f, "failed to parse config: {}", e),
            Self::NotFinite { field, value } => {
                write!(f, "{} must be a finite number, got {}", field, value)
            }
            Self::NonPositive { field, value } => {
                write!(f, "{} must be positive, got {}", field, value)
            }
            Self::PlayfieldTooLarge { pixels, max } => write!(
                f,
                "playfield of {} pixels exceeds the limit of {}",
                pixels, max
            ),
            Self::TickRateTooHigh { tick_rate, max } => {
                write!(f, "tick_rate {} exceeds the maximum of {}", tick_rate, max)
            }
            Self::GroundTooTall {
                ground_height,
                height,
            } => write!(
                f,
                "ground height {} leaves no play area in a {} high playfield",
                ground_height, height
            ),
            Self::GapRangeInverted { gap_min, gap_max } => {
                write!(f, "gap_min {} exceeds gap_max {}", gap_min, gap_max)
            }
            Self::GapExceedsPlayfield { needed, available } => write!(
                f,
                "gap plus margins needs {} pixels but the play area is {}",
                needed, available
            ),
            Self::SpacingTooSmall {
                spacing,
                slot_width,
            } => write!(
                f,
                "slot spacing {} must exceed slot width {}",
                spacing, slot_width
            ),
            Self::AvatarTooLarge {
                avatar_height,
                gap_min,
            } => write!(
                f,
                "avatar height {} does not fit through a {} gap",
                avatar_height, gap_min
            ),
            Self::AvatarOutOfBounds { y } => {
                write!(f, "avatar start y {} is outside the play area", y)
            }
            Self::ImpulseNotUpward { value } => {
                write!(f, "impulse velocity must be negative (up), got {}", value)
            }
            Self::NoSlots => write!(f, "slot_count must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Audio preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl AudioSettings {
    /// Effective volume after mute
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0) * self.sfx_volume.clamp(0.0, 1.0)
        }
    }
}

/// Complete game tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Playfield ===
    pub width: f32,
    pub height: f32,
    pub ground_height: f32,

    // === Timing ===
    /// Simulation ticks per second
    pub tick_rate: f32,

    // === Avatar ===
    pub avatar_x: f32,
    pub avatar_start_y: f32,
    pub avatar_half_width: f32,
    pub avatar_half_height: f32,
    pub gravity: f32,
    pub impulse_velocity: f32,
    pub pose_period_ticks: u32,

    // === Obstacles ===
    pub scroll_speed: f32,
    pub slot_count: usize,
    pub slot_width: f32,
    pub slot_spacing: f32,
    pub gap_min: f32,
    pub gap_max: f32,
    pub gap_margin: f32,
    pub first_slot_offset: f32,

    /// Fixed RNG seed; `None` seeds from the clock
    pub seed: Option<u64>,

    pub audio: AudioSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
            ground_height: GROUND_HEIGHT,
            tick_rate: TICK_RATE,
            avatar_x: AVATAR_X,
            avatar_start_y: AVATAR_START_Y,
            avatar_half_width: AVATAR_HALF_WIDTH,
            avatar_half_height: AVATAR_HALF_HEIGHT,
            gravity: GRAVITY,
            impulse_velocity: IMPULSE_VELOCITY,
            pose_period_ticks: POSE_PERIOD_TICKS,
            scroll_speed: SCROLL_SPEED,
            slot_count: SLOT_COUNT,
            slot_width: SLOT_WIDTH,
            slot_spacing: SLOT_SPACING,
            gap_min: GAP_MIN,
            gap_max: GAP_MAX,
            gap_margin: GAP_MARGIN,
            first_slot_offset: FIRST_SLOT_OFFSET,
            seed: None,
            audio: AudioSettings::default(),
        }
    }
}

impl GameConfig {
    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Fixed simulation timestep in seconds
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate
    }

    /// Bottom of the play area (top edge of the ground band)
    pub fn floor_y(&self) -> f32 {
        self.height - self.ground_height
    }

    /// Check every invariant the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let floats = [
            ("width", self.width),
            ("height", self.height),
            ("ground_height", self.ground_height),
            ("tick_rate", self.tick_rate),
            ("avatar_x", self.avatar_x),
            ("avatar_start_y", self.avatar_start_y),
            ("avatar_half_width", self.avatar_half_width),
            ("avatar_half_height", self.avatar_half_height),
            ("gravity", self.gravity),
            ("impulse_velocity", self.impulse_velocity),
            ("scroll_speed", self.scroll_speed),
            ("slot_width", self.slot_width),
            ("slot_spacing", self.slot_spacing),
            ("gap_min", self.gap_min),
            ("gap_max", self.gap_max),
            ("gap_margin", self.gap_margin),
            ("first_slot_offset", self.first_slot_offset),
        ];
        for (field, value) in floats {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }

        let positives = [
            ("width", self.width),
            ("height", self.height),
            ("tick_rate", self.tick_rate),
            ("gravity", self.gravity),
            ("avatar_half_width", self.avatar_half_width),
            ("avatar_half_height", self.avatar_half_height),
            ("scroll_speed", self.scroll_speed),
            ("slot_width", self.slot_width),
            ("gap_min", self.gap_min),
        ];
        for (field, value) in positives {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        let pixels = self.width.round() as f64 * self.height.round() as f64;
        if pixels > MAX_PLAYFIELD_PIXELS {
            return Err(ConfigError::PlayfieldTooLarge {
                pixels,
                max: MAX_PLAYFIELD_PIXELS,
            });
        }
        if self.tick_rate > MAX_TICK_RATE {
            return Err(ConfigError::TickRateTooHigh {
                tick_rate: self.tick_rate,
                max: MAX_TICK_RATE,
            });
        }
        if self.pose_period_ticks == 0 {
            return Err(ConfigError::NonPositive {
                field: "pose_period_ticks",
                value: 0.0,
            });
        }
        if self.slot_count == 0 {
            return Err(ConfigError::NoSlots);
        }
        if self.ground_height < 0.0 || self.ground_height >= self.height {
            return Err(ConfigError::GroundTooTall {
                ground_height: self.ground_height,
                height: self.height,
            });
        }
        if self.gap_min > self.gap_max {
            return Err(ConfigError::GapRangeInverted {
                gap_min: self.gap_min,
                gap_max: self.gap_max,
            });
        }
        let needed = self.gap_max + 2.0 * self.gap_margin.max(0.0);
        let available = self.floor_y();
        if needed > available {
            return Err(ConfigError::GapExceedsPlayfield { needed, available });
        }
        if self.slot_spacing <= self.slot_width {
            return Err(ConfigError::SpacingTooSmall {
                spacing: self.slot_spacing,
                slot_width: self.slot_width,
            });
        }
        let avatar_height = self.avatar_half_height * 2.0;
        if avatar_height >= self.gap_min {
            return Err(ConfigError::AvatarTooLarge {
                avatar_height,
                gap_min: self.gap_min,
            });
        }
        let y = self.avatar_start_y;
        if y - self.avatar_half_height < 0.0 || y + self.avatar_half_height > available {
            return Err(ConfigError::AvatarOutOfBounds { y });
        }
        if self.impulse_velocity >= 0.0 {
            return Err(ConfigError::ImpulseNotUpward {
                value: self.impulse_velocity,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_non_positive_width_rejected() {
        let config = GameConfig {
            width: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "width", .. })
        ));
    }

    #[test]
    fn test_nan_rejected() {
        let config = GameConfig {
            gravity: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite { field: "gravity", .. })
        ));
    }

    #[test]
    fn test_infinite_values_rejected() {
        for json in [
            r#"{ "width": 1e39 }"#,
            r#"{ "slot_spacing": 1e39 }"#,
            r#"{ "gap_margin": -1e39 }"#,
            r#"{ "first_slot_offset": 1e39 }"#,
        ] {
            let err = GameConfig::from_json(json).unwrap_err();
            assert!(matches!(err, ConfigError::NotFinite { .. }), "{}: {}", json, err);
        }
    }

    #[test]
    fn test_huge_playfield_rejected() {
        let config = GameConfig {
            width: 1.0e6,
            height: 1.0e6,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PlayfieldTooLarge { .. })
        ));
    }

    #[test]
    fn test_tick_rate_bounds() {
        let fast = GameConfig {
            tick_rate: MAX_TICK_RATE,
            ..Default::default()
        };
        assert!(fast.validate().is_ok());

        let too_fast = GameConfig {
            tick_rate: MAX_TICK_RATE * 2.0,
            ..Default::default()
        };
        assert!(matches!(
            too_fast.validate(),
            Err(ConfigError::TickRateTooHigh { .. })
        ));
    }

    #[test]
    fn test_gap_exceeding_playfield_rejected() {
        let config = GameConfig {
            gap_max: 600.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GapExceedsPlayfield { .. })
        ));
    }

    #[test]
    fn test_overlapping_slots_rejected() {
        let config = GameConfig {
            slot_spacing: 70.0,
            slot_width: 70.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SpacingTooSmall { .. })
        ));
    }

    #[test]
    fn test_downward_impulse_rejected() {
        let config = GameConfig {
            impulse_velocity: 100.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ImpulseNotUpward { .. })
        ));
    }

    #[test]
    fn test_zero_slots_rejected() {
        let config = GameConfig {
            slot_count: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoSlots)));
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config = GameConfig::from_json(r#"{ "seed": 42, "scroll_speed": 200.0 }"#).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.scroll_speed, 200.0);
        assert_eq!(config.width, PLAYFIELD_WIDTH);
        assert!(!config.audio.muted);
    }

    #[test]
    fn test_json_invalid_values_rejected() {
        let err = GameConfig::from_json(r#"{ "height": -5.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "height", .. }));
    }

    #[test]
    fn test_json_malformed_is_parse_error() {
        let err = GameConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("failed to parse config"));
    }

    #[test]
    fn test_muted_volume_is_zero() {
        let audio = AudioSettings {
            muted: true,
            ..Default::default()
        };
        assert_eq!(audio.effective_volume(), 0.0);
        assert!((AudioSettings::default().effective_volume() - 0.8).abs() < 1e-6);
    }
}
