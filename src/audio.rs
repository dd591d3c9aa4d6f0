//! Sound cues and their Web Audio synthesis
//!
//! Every cue is a short procedurally generated tone sweep, so no audio assets
//! are needed. The background loop is an eight-step square/triangle pattern
//! stepped by frame time while a level is being played. Natively the manager
//! only records what it would have played.

use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use crate::settings::SoundSettings;

/// Fire-and-forget sound triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    /// Egg caught (also a blocked or dodged bomb)
    Catch,
    /// Egg lost or bomb hit
    Miss,
    /// Boost started
    Boost,
    LevelComplete,
    GameOver,
}

/// Oscillator waveform (mirrors the Web Audio set we use)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One exponential frequency sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub from_hz: f32,
    pub to_hz: f32,
    pub duration_s: f64,
    pub wave: Wave,
    /// Start offset from the cue trigger
    pub delay_s: f64,
}

const fn tone(from_hz: f32, to_hz: f32, duration_s: f64, wave: Wave, delay_s: f64) -> Tone {
    Tone {
        from_hz,
        to_hz,
        duration_s,
        wave,
        delay_s,
    }
}

/// Peak gain of a tone before master volume
pub const TONE_PEAK: f32 = 0.2;

const CATCH: [Tone; 1] = [tone(440.0, 880.0, 0.15, Wave::Triangle, 0.0)];
const MISS: [Tone; 1] = [tone(200.0, 50.0, 0.3, Wave::Sawtooth, 0.0)];
const BOOST: [Tone; 1] = [tone(300.0, 1200.0, 0.4, Wave::Sine, 0.0)];
const GAME_OVER: [Tone; 3] = [
    tone(300.0, 250.0, 0.4, Wave::Sawtooth, 0.0),
    tone(250.0, 200.0, 0.4, Wave::Sawtooth, 0.3),
    tone(200.0, 50.0, 0.6, Wave::Sawtooth, 0.6),
];
const LEVEL_COMPLETE: [Tone; 4] = [
    tone(523.25, 575.575, 0.2, Wave::Sine, 0.0),
    tone(659.25, 725.175, 0.2, Wave::Sine, 0.15),
    tone(783.99, 862.389, 0.2, Wave::Sine, 0.3),
    tone(1046.5, 1151.15, 0.2, Wave::Sine, 0.45),
];

impl SoundCue {
    /// The tone sequence for this cue
    pub fn tones(self) -> &'static [Tone] {
        match self {
            SoundCue::Catch => &CATCH,
            SoundCue::Miss => &MISS,
            SoundCue::Boost => &BOOST,
            SoundCue::LevelComplete => &LEVEL_COMPLETE,
            SoundCue::GameOver => &GAME_OVER,
        }
    }
}

const MELODY_HZ: [f32; 8] = [261.63, 329.63, 392.0, 523.25, 392.0, 329.63, 261.63, 196.0];
const BASS_HZ: [f32; 8] = [130.81, 130.81, 164.81, 164.81, 196.0, 196.0, 130.81, 98.0];
const MUSIC_BPM: f32 = 130.0;

/// Peak gains of the loop voices before music volume
pub const MELODY_PEAK: f32 = 0.05;
pub const BASS_PEAK: f32 = 0.1;

/// Notes started by one step of the loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MusicStep {
    pub melody: Tone,
    /// Bass sounds on even steps only
    pub bass: Option<Tone>,
}

/// Background loop sequencer
#[derive(Debug, Clone, Default)]
pub struct Music {
    playing: bool,
    step: usize,
    until_next_ms: f32,
}

impl Music {
    /// Half a beat per step
    pub const STEP_MS: f32 = 60_000.0 / MUSIC_BPM * 0.5;

    /// Start from the first step; no-op while already playing
    pub fn start(&mut self) {
        if self.playing {
            return;
        }
        self.playing = true;
        self.step = 0;
        self.until_next_ms = 0.0;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Steps due after `delta_ms`; a long stall plays one step, not a burst
    pub fn advance(&mut self, delta_ms: f32) -> Vec<MusicStep> {
        let mut due = Vec::new();
        if !self.playing || delta_ms.is_nan() || delta_ms < 0.0 {
            return due;
        }
        self.until_next_ms -= delta_ms;
        if self.until_next_ms < -Self::STEP_MS {
            self.until_next_ms = 0.0;
        }
        while self.until_next_ms <= 0.0 {
            due.push(Self::notes(self.step));
            self.step = (self.step + 1) % MELODY_HZ.len();
            self.until_next_ms += Self::STEP_MS;
        }
        due
    }

    fn notes(step: usize) -> MusicStep {
        let duration_s = 60.0 / MUSIC_BPM as f64 * 0.4;
        let melody = MELODY_HZ[step];
        let bass = BASS_HZ[step];
        MusicStep {
            melody: tone(melody, melody, duration_s, Wave::Square, 0.0),
            bass: (step % 2 == 0).then(|| tone(bass, bass, duration_s * 1.5, Wave::Triangle, 0.0)),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{BASS_PEAK, MELODY_PEAK, Music, SoundCue, TONE_PEAK, Tone, Wave};
    use crate::settings::SoundSettings;

    /// Audio manager backed by a Web Audio context
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        settings: SoundSettings,
        music: Music,
    }

    impl AudioManager {
        pub fn new(settings: SoundSettings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                settings,
                music: Music::default(),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn update_settings(&mut self, settings: SoundSettings) {
            self.settings = settings;
        }

        pub fn play(&mut self, cue: SoundCue) {
            let vol = self.settings.sfx_gain();
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for tone in cue.tones() {
                play_tone(ctx, tone, vol * TONE_PEAK);
            }
        }

        pub fn start_music(&mut self) {
            self.music.start();
        }

        pub fn stop_music(&mut self) {
            self.music.stop();
        }

        pub fn is_music_playing(&self) -> bool {
            self.music.is_playing()
        }

        /// Step the background loop by frame time
        pub fn update(&mut self, delta_ms: f32) {
            let steps = self.music.advance(delta_ms);
            let vol = self.settings.music_gain();
            let Some(ctx) = &self.ctx else { return };
            if vol <= 0.0 || ctx.state() != web_sys::AudioContextState::Running {
                return;
            }
            for step in steps {
                play_tone(ctx, &step.melody, vol * MELODY_PEAK);
                if let Some(bass) = &step.bass {
                    play_tone(ctx, bass, vol * BASS_PEAK);
                }
            }
        }
    }

    fn create_osc(ctx: &AudioContext, freq: f32, wave: Wave) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(match wave {
            Wave::Sine => OscillatorType::Sine,
            Wave::Square => OscillatorType::Square,
            Wave::Triangle => OscillatorType::Triangle,
            Wave::Sawtooth => OscillatorType::Sawtooth,
        });
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    fn play_tone(ctx: &AudioContext, tone: &Tone, peak: f32) {
        let Some((osc, gain)) = create_osc(ctx, tone.from_hz, tone.wave) else {
            return;
        };
        let t = ctx.current_time() + tone.delay_s;
        let end = t + tone.duration_s;

        gain.gain().set_value_at_time(peak, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.0001, end).ok();
        osc.frequency().set_value_at_time(tone.from_hz, t).ok();
        osc.frequency().exponential_ramp_to_value_at_time(tone.to_hz, end).ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(end).ok();
    }
}

/// Headless audio manager: keeps the cues it would have played
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct AudioManager {
    settings: SoundSettings,
    played: Vec<SoundCue>,
    music: Music,
    music_steps: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl AudioManager {
    pub fn new(settings: SoundSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn resume(&self) {}

    pub fn update_settings(&mut self, settings: SoundSettings) {
        self.settings = settings;
    }

    pub fn play(&mut self, cue: SoundCue) {
        if self.settings.sfx_gain() <= 0.0 {
            return;
        }
        log::debug!("sound cue {cue:?}");
        self.played.push(cue);
    }

    pub fn start_music(&mut self) {
        self.music.start();
    }

    pub fn stop_music(&mut self) {
        self.music.stop();
    }

    pub fn is_music_playing(&self) -> bool {
        self.music.is_playing()
    }

    pub fn update(&mut self, delta_ms: f32) {
        let steps = self.music.advance(delta_ms);
        if self.settings.music_gain() > 0.0 {
            self.music_steps += steps.len();
        }
    }

    /// Cues played so far
    pub fn played(&self) -> &[SoundCue] {
        &self.played
    }

    /// Audible loop steps so far
    pub fn music_steps(&self) -> usize {
        self.music_steps
    }
}
