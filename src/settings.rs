//! Player preferences
//!
//! Persisted separately from the profile in LocalStorage.

use serde::{Deserialize, Serialize};

/// Sound preferences as the settings screen edits them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundSettings {
    pub music: bool,
    pub sfx: bool,
    /// Master volume, 0-100
    pub volume: u8,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            music: true,
            sfx: true,
            volume: 80,
        }
    }
}

impl SoundSettings {
    pub const MAX_VOLUME: u8 = 100;

    /// Master gain in [0, 1]
    pub fn master_gain(&self) -> f32 {
        self.volume.min(Self::MAX_VOLUME) as f32 / Self::MAX_VOLUME as f32
    }

    /// Gain for one-shot effects (0 when effects are off)
    pub fn sfx_gain(&self) -> f32 {
        if self.sfx { self.master_gain() } else { 0.0 }
    }

    /// Gain for the background loop (0 when music is off)
    pub fn music_gain(&self) -> f32 {
        if self.music { self.master_gain() * 0.5 } else { 0.0 }
    }
}

/// Host display preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub fullscreen: bool,
    /// Forward haptic events to the host
    pub haptics: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            fullscreen: false,
            haptics: true,
        }
    }
}

/// All preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sound: SoundSettings,
    pub display: DisplaySettings,
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "dragon_egg_settings";

    /// Replace sound settings, clamping the volume
    pub fn apply_sound(&mut self, sound: SoundSettings) {
        self.sound = SoundSettings {
            volume: sound.volume.min(SoundSettings::MAX_VOLUME),
            ..sound
        };
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring unreadable settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gains() {
        let mut sound = SoundSettings::default();
        assert!((sound.master_gain() - 0.8).abs() < 1e-6);
        assert!((sound.music_gain() - 0.4).abs() < 1e-6);
        sound.sfx = false;
        assert_eq!(sound.sfx_gain(), 0.0);
    }

    #[test]
    fn test_apply_sound_clamps_volume() {
        let mut settings = Settings::default();
        settings.apply_sound(SoundSettings {
            music: false,
            sfx: true,
            volume: 250,
        });
        assert_eq!(settings.sound.volume, 100);
        assert!(!settings.sound.music);
    }

    #[test]
    fn test_partial_json() {
        let settings: Settings = serde_json::from_str(r#"{ "sound": { "volume": 30 } }"#).unwrap();
        assert_eq!(settings.sound.volume, 30);
        assert!(settings.sound.sfx);
        assert!(settings.display.haptics);
    }
}
