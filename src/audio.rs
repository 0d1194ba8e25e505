//! Sound cues
//!
//! Simulation events map to short procedurally generated effects. In the
//! browser they are played through the Web Audio API; natively they are only
//! logged. Playback is fire-and-forget: failures are dropped, never retried.

use crate::config::AudioSettings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Impulse applied
    Flap,
    /// Slot cleared
    Score,
    /// Run ended on an obstacle or the world bounds
    Crash,
    /// Finished run took first place on the leaderboard
    HighScore,
}

impl SoundEffect {
    /// The cue for a simulation event, if it has one
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Flap => Some(SoundEffect::Flap),
            GameEvent::Scored { .. } => Some(SoundEffect::Score),
            GameEvent::Collision { .. } => Some(SoundEffect::Crash),
            GameEvent::PhaseChanged { .. } => None,
        }
    }
}

/// Something that can play sound cues
pub trait AudioSink {
    fn play(&self, effect: SoundEffect);
}

/// Native sink: records cues in the log only
#[derive(Debug, Clone, Default)]
pub struct LogAudio {
    settings: AudioSettings,
}

impl LogAudio {
    pub fn new(settings: AudioSettings) -> Self {
        Self { settings }
    }
}

impl AudioSink for LogAudio {
    fn play(&self, effect: SoundEffect) {
        let vol = self.settings.effective_volume();
        if vol > 0.0 {
            log::debug!("Sound {:?} at volume {:.2}", effect, vol);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEffect};
    use crate::config::AudioSettings;

    /// Web Audio implementation
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        settings: AudioSettings,
    }

    impl AudioManager {
        pub fn new(settings: AudioSettings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx, settings }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn is_muted(&self) -> bool {
            self.settings.muted
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.settings.muted = muted;
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Flap - short rising chirp
        fn play_flap(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 260.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.09)
                .ok();
            osc.frequency().set_value_at_time(260.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(520.0, t + 0.07)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Score - two-note ding
        fn play_score(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [880.0, 1320.0].iter().enumerate() {
                let delay = i as f64 * 0.07;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.25, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.2).ok();
                }
            }
        }

        /// Crash - thump plus a falling whistle
        fn play_crash(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sawtooth) {
                gain.gain().set_value_at_time(vol * 0.45, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.frequency().set_value_at_time(120.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(40.0, t + 0.25)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.3).ok();
            }

            if let Some((osc, gain)) = self.create_osc(ctx, 700.0, OscillatorType::Sine) {
                let start = t + 0.15;
                gain.gain().set_value_at_time(vol * 0.2, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.5)
                    .ok();
                osc.frequency().set_value_at_time(700.0, start).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(150.0, start + 0.5)
                    .ok();
                osc.start_with_when(start).ok();
                osc.stop_with_when(start + 0.55).ok();
            }
        }

        /// High score - celebratory
        fn play_high_score(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [500.0, 600.0, 700.0, 800.0, 1000.0].iter().enumerate() {
                let delay = 0.6 + i as f64 * 0.08;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.25, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.3).ok();
                }
            }
        }
    }

    impl AudioSink for AudioManager {
        fn play(&self, effect: SoundEffect) {
            let vol = self.settings.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Flap => self.play_flap(ctx, vol),
                SoundEffect::Score => self.play_score(ctx, vol),
                SoundEffect::Crash => self.play_crash(ctx, vol),
                SoundEffect::HighScore => self.play_high_score(ctx, vol),
            }
        }
    }
}
