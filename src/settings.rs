//! Player settings and preferences
//!
//! Persisted in LocalStorage, separately from the leaderboard.

use serde::{Deserialize, Serialize};

use crate::session::ScoreAggregate;
use crate::text::Language;
use crate::tuning::Variant;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display language
    pub language: Language,
    /// Rule preset for new sessions
    pub variant: Variant,
    /// How the three round scores combine
    pub aggregate: ScoreAggregate,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Mute everything
    pub muted: bool,
    /// Mute when the tab is hidden
    pub mute_on_blur: bool,

    /// Last nickname used on the leaderboard
    pub nickname: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::En,
            variant: Variant::Classic,
            aggregate: ScoreAggregate::Max,

            // Background track sits under the effects
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.3,
            muted: false,
            mute_on_blur: true,

            nickname: None,
        }
    }
}

impl Settings {
    /// Effective effects volume (respects mute)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Effective music volume (respects mute)
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0)
        }
    }

    /// LocalStorage key
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    const STORAGE_KEY: &'static str = "green_dino_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten());

        match json.map(|j| serde_json::from_str::<Settings>(&j)) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            Some(Err(e)) => {
                log::warn!("Ignoring unreadable settings: {}", e);
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        else {
            log::warn!("LocalStorage unavailable, settings not saved");
            return;
        };
        match serde_json::to_string(self) {
            Ok(json) => {
                if storage.set_item(Self::STORAGE_KEY, &json).is_ok() {
                    log::info!("Settings saved");
                }
            }
            Err(e) => log::warn!("Failed to encode settings: {}", e),
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
