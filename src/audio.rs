//! Audio output
//!
//! The presentation layer owns an [`AudioOutput`] and feeds it the events the
//! simulation emits. On the web the effects are procedurally generated with
//! Web Audio oscillators and the background music is a looping media element.

use thiserror::Error;

use crate::sim::GameEvent;

/// Background track volume until the player changes it
pub const DEFAULT_TRACK_VOLUME: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("no track loaded")]
    NoTrack,
    #[error("audio unavailable: {0}")]
    Unavailable(String),
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Actor leaves the ground
    Jump,
    /// Reward picked up
    Collect,
    /// Hazard touched but the round goes on
    Hit,
    /// Round over
    GameOver,
    /// Button press
    Click,
    Success,
    Error,
}

impl SoundEffect {
    /// Effect for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jumped { .. } => Some(SoundEffect::Jump),
            GameEvent::Collected { .. } => Some(SoundEffect::Collect),
            GameEvent::Hit { hits_left, .. } if *hits_left > 0 => Some(SoundEffect::Hit),
            GameEvent::EpisodeOver { .. } => Some(SoundEffect::GameOver),
            GameEvent::Hit { .. }
            | GameEvent::Spawned(_)
            | GameEvent::Avoided(_)
            | GameEvent::SpeedUp { .. } => None,
        }
    }
}

/// Injected audio capability
pub trait AudioOutput {
    /// Replace the background track
    fn load_track(&mut self, url: &str) -> Result<(), AudioError>;
    /// Start or resume the background track
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
    /// Pause and rewind
    fn stop(&mut self);
    /// Track volume, clamped to 0.0 - 1.0
    fn set_volume(&mut self, volume: f32);
    fn set_effects_volume(&mut self, volume: f32);
    /// Disabling also stops the track
    fn set_enabled(&mut self, enabled: bool);
    fn play_effect(&mut self, effect: SoundEffect);
}

/// Silent output that keeps the transport state
#[derive(Debug, Clone, PartialEq)]
pub struct NullAudio {
    pub track: Option<String>,
    pub playing: bool,
    pub volume: f32,
    pub effects_volume: f32,
    pub enabled: bool,
    pub effects_played: u32,
}

impl Default for NullAudio {
    fn default() -> Self {
        Self {
            track: None,
            playing: false,
            volume: DEFAULT_TRACK_VOLUME,
            effects_volume: 1.0,
            enabled: true,
            effects_played: 0,
        }
    }
}

impl AudioOutput for NullAudio {
    fn load_track(&mut self, url: &str) -> Result<(), AudioError> {
        self.playing = false;
        self.track = Some(url.to_string());
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if self.track.is_none() {
            return Err(AudioError::NoTrack);
        }
        self.playing = self.enabled;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn set_effects_volume(&mut self, volume: f32) {
        self.effects_volume = volume.clamp(0.0, 1.0);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.stop();
        }
    }

    fn play_effect(&mut self, _effect: SoundEffect) {
        if self.enabled && self.effects_volume > 0.0 {
            self.effects_played += 1;
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

    use super::*;

    /// Browser audio: media element for music, oscillators for effects
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        track: Option<HtmlAudioElement>,
        volume: f32,
        effects_volume: f32,
        enabled: bool,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - effects disabled");
            }
            Self {
                ctx,
                track: None,
                volume: DEFAULT_TRACK_VOLUME,
                effects_volume: 1.0,
                enabled: true,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
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

        /// Single tone decaying to silence
        fn beep(ctx: &AudioContext, freq: f32, osc_type: OscillatorType, peak: f32, at: f64, len: f64) {
            let Some((osc, gain)) = Self::create_osc(ctx, freq, osc_type) else {
                return;
            };
            gain.gain().set_value_at_time(peak, at).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, at + len)
                .ok();
            osc.start_with_when(at).ok();
            osc.stop_with_when(at + len).ok();
        }

        fn play_jump(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 400.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(700.0, t + 0.1)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.12).ok();
        }

        fn arpeggio(ctx: &AudioContext, freqs: &[f32], osc_type: OscillatorType, peak: f32, step: f64, len: f64) {
            let t = ctx.current_time();
            for (i, freq) in freqs.iter().enumerate() {
                Self::beep(ctx, *freq, osc_type, peak, t + i as f64 * step, len);
            }
        }
    }

    impl AudioOutput for WebAudio {
        fn load_track(&mut self, url: &str) -> Result<(), AudioError> {
            self.stop();
            let track = HtmlAudioElement::new_with_src(url)
                .map_err(|e| AudioError::Unavailable(format!("{e:?}")))?;
            track.set_loop(true);
            track.set_volume(self.volume as f64);
            self.track = Some(track);
            Ok(())
        }

        fn play(&mut self) -> Result<(), AudioError> {
            let track = self.track.as_ref().ok_or(AudioError::NoTrack)?;
            if !self.enabled {
                return Ok(());
            }
            let promise = track
                .play()
                .map_err(|e| AudioError::Unavailable(format!("{e:?}")))?;
            // Autoplay policy rejects until the first user gesture
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::warn!("Background track blocked: {:?}", e);
                }
            });
            Ok(())
        }

        fn pause(&mut self) {
            if let Some(track) = &self.track {
                let _ = track.pause();
            }
        }

        fn stop(&mut self) {
            if let Some(track) = &self.track {
                let _ = track.pause();
                track.set_current_time(0.0);
            }
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
            if let Some(track) = &self.track {
                track.set_volume(self.volume as f64);
            }
        }

        fn set_effects_volume(&mut self, volume: f32) {
            self.effects_volume = volume.clamp(0.0, 1.0);
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
            if !enabled {
                self.stop();
            }
        }

        fn play_effect(&mut self, effect: SoundEffect) {
            let vol = self.effects_volume;
            if !self.enabled || vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers suspend the context until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let t = ctx.current_time();
            match effect {
                SoundEffect::Jump => Self::play_jump(ctx, vol),
                SoundEffect::Collect => Self::arpeggio(
                    ctx,
                    &[600.0, 800.0, 1000.0],
                    OscillatorType::Sine,
                    vol * 0.25,
                    0.08,
                    0.15,
                ),
                SoundEffect::Hit => Self::beep(ctx, 150.0, OscillatorType::Sawtooth, vol * 0.3, t, 0.2),
                SoundEffect::GameOver => Self::arpeggio(
                    ctx,
                    &[400.0, 350.0, 300.0, 200.0],
                    OscillatorType::Sine,
                    vol * 0.3,
                    0.2,
                    0.3,
                ),
                SoundEffect::Click => Self::beep(ctx, 800.0, OscillatorType::Triangle, vol * 0.2, t, 0.15),
                SoundEffect::Success => Self::beep(ctx, 600.0, OscillatorType::Sine, vol * 0.2, t, 0.3),
                SoundEffect::Error => Self::beep(ctx, 200.0, OscillatorType::Sawtooth, vol * 0.2, t, 0.5),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ItemKind;

    #[test]
    fn test_event_effects() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Jumped { extra: false }),
            Some(SoundEffect::Jump)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Collected {
                kind: ItemKind::Tree,
                first: false
            }),
            Some(SoundEffect::Collect)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Hit {
                kind: ItemKind::Bag,
                hits_left: 2
            }),
            Some(SoundEffect::Hit)
        );
        // The final hit is voiced by the game-over jingle
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Hit {
                kind: ItemKind::Bag,
                hits_left: 0
            }),
            None
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::EpisodeOver { score: 12 }),
            Some(SoundEffect::GameOver)
        );
        assert_eq!(SoundEffect::for_event(&GameEvent::Spawned(ItemKind::Cup)), None);
    }

    #[test]
    fn test_play_needs_a_track() {
        let mut audio = NullAudio::default();
        assert_eq!(audio.play(), Err(AudioError::NoTrack));
        audio.load_track("music/loop.mp3").unwrap();
        audio.play().unwrap();
        assert!(audio.playing);
        audio.stop();
        assert!(!audio.playing);
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut audio = NullAudio::default();
        assert_eq!(audio.volume, DEFAULT_TRACK_VOLUME);
        audio.set_volume(3.0);
        assert_eq!(audio.volume, 1.0);
        audio.set_volume(-1.0);
        assert_eq!(audio.volume, 0.0);
    }

    #[test]
    fn test_disabled_output_is_quiet() {
        let mut audio = NullAudio::default();
        audio.load_track("music/loop.mp3").unwrap();
        audio.play().unwrap();
        audio.set_enabled(false);
        assert!(!audio.playing);

        audio.play().unwrap();
        audio.play_effect(SoundEffect::Click);
        assert!(!audio.playing);
        assert_eq!(audio.effects_played, 0);
    }
}
