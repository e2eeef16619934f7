//! Player preferences
//!
//! Persisted through a small key/value trait so the host decides where the
//! values actually live. Volumes are stored as 0-100 integers (what the
//! options sliders show) and converted to 0.0-1.0 floats at the audio edge.
//! Loading is defensive: anything unreadable falls back to its default.

use serde::{Deserialize, Serialize};

/// Storage backend for preferences. `None` from `get` means missing, which
/// is not an error.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), String>;
}

/// In-memory store for tests and headless runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: std::collections::HashMap<String, String>,
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

const KEY_MASTER_VOLUME: &str = "settings.master_volume";
const KEY_SFX_VOLUME: &str = "settings.sfx_volume";
const KEY_MUSIC_VOLUME: &str = "settings.music_volume";
const KEY_MUTED: &str = "settings.muted";
const KEY_MUTE_ON_BLUR: &str = "settings.mute_on_blur";
const KEY_LANGUAGE: &str = "settings.language";
const KEY_MINIMAP_DETAIL: &str = "settings.minimap_detail";

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Master volume slider position (0 - 100)
    pub master_volume: u8,
    /// Sound effects volume slider position (0 - 100)
    pub sfx_volume: u8,
    /// Music volume slider position (0 - 100)
    pub music_volume: u8,
    /// Mute everything
    pub muted: bool,
    /// Mute when the window loses focus
    pub mute_on_blur: bool,
    /// BCP 47 language code
    pub language: String,
    /// Minimap detail level (0 - 2)
    pub minimap_detail: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 80,
            sfx_volume: 100,
            music_volume: 70,
            muted: false,
            mute_on_blur: true,
            language: "en".to_string(),
            minimap_detail: 2,
        }
    }
}

impl Settings {
    /// Slider position to runtime volume
    pub fn master_volume_f32(&self) -> f32 {
        f32::from(self.master_volume.min(100)) / 100.0
    }

    pub fn sfx_volume_f32(&self) -> f32 {
        f32::from(self.sfx_volume.min(100)) / 100.0
    }

    pub fn music_volume_f32(&self) -> f32 {
        f32::from(self.music_volume.min(100)) / 100.0
    }

    /// Load from the store; any missing or corrupt value keeps its default
    pub fn load(store: &impl KvStore) -> Self {
        let defaults = Self::default();
        let volume = |key: &str, default: u8| {
            store
                .get(key)
                .and_then(|v| v.parse::<u8>().ok())
                .map(|v| v.min(100))
                .unwrap_or(default)
        };
        let flag = |key: &str, default: bool| match store.get(key).as_deref() {
            Some("true") => true,
            Some("false") => false,
            _ => default,
        };

        Self {
            master_volume: volume(KEY_MASTER_VOLUME, defaults.master_volume),
            sfx_volume: volume(KEY_SFX_VOLUME, defaults.sfx_volume),
            music_volume: volume(KEY_MUSIC_VOLUME, defaults.music_volume),
            muted: flag(KEY_MUTED, defaults.muted),
            mute_on_blur: flag(KEY_MUTE_ON_BLUR, defaults.mute_on_blur),
            language: store.get(KEY_LANGUAGE).unwrap_or(defaults.language),
            minimap_detail: store
                .get(KEY_MINIMAP_DETAIL)
                .and_then(|v| v.parse::<u8>().ok())
                .map(|v| v.min(2))
                .unwrap_or(defaults.minimap_detail),
        }
    }

    /// Write everything back. A failing store is logged and ignored; stale
    /// preferences are not worth interrupting the game for.
    pub fn save(&self, store: &mut impl KvStore) {
        let pairs = [
            (KEY_MASTER_VOLUME, self.master_volume.to_string()),
            (KEY_SFX_VOLUME, self.sfx_volume.to_string()),
            (KEY_MUSIC_VOLUME, self.music_volume.to_string()),
            (KEY_MUTED, self.muted.to_string()),
            (KEY_MUTE_ON_BLUR, self.mute_on_blur.to_string()),
            (KEY_LANGUAGE, self.language.clone()),
            (KEY_MINIMAP_DETAIL, self.minimap_detail.to_string()),
        ];
        for (key, value) in pairs {
            if let Err(err) = store.set(key, &value) {
                log::warn!("failed to persist {key}: {err}");
                return;
            }
        }
        log::info!("settings saved");
    }
}
