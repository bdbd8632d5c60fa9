//! Player settings and preferences
//!
//! Persisted in LocalStorage as JSON.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Stars scattered at session start
    pub fn star_count(&self) -> usize {
        match self {
            QualityPreset::Low => 50,
            QualityPreset::Medium => 120,
            QualityPreset::High => 250,
        }
    }
}

/// Parallax sensitivity bounds
pub const MIN_SENSITIVITY: f32 = 0.1;
pub const MAX_SENSITIVITY: f32 = 5.0;

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Multiplier on the star and mine parallax drift
    pub sensitivity: f32,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            sensitivity: 1.0,
            show_fps: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,
        }
    }
}

impl Settings {
    /// Stars to scatter for the current preset
    pub fn star_count(&self) -> usize {
        self.quality.star_count()
    }

    /// Apply overrides from a URL query string such as `?quality=high`.
    ///
    /// Returns true when anything changed. Unknown keys are ignored and bad
    /// values are logged and skipped.
    pub fn apply_query(&mut self, query: &str) -> bool {
        let mut changed = false;
        for pair in query.trim_start_matches('?').split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "quality" => match QualityPreset::from_str(value) {
                    Some(preset) if preset != self.quality => {
                        log::info!("Quality preset: {}", preset.as_str());
                        self.quality = preset;
                        changed = true;
                    }
                    Some(_) => {}
                    None => log::warn!("Unknown quality preset `{}`", value),
                },
                "sensitivity" => match value.parse::<f32>() {
                    Ok(sensitivity) if sensitivity.is_finite() => {
                        let sensitivity = sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY);
                        if sensitivity != self.sensitivity {
                            self.sensitivity = sensitivity;
                            changed = true;
                        }
                    }
                    _ => log::warn!("Bad sensitivity `{}`", value),
                },
                _ => {}
            }
        }
        changed
    }

    /// Clamp values that may have been edited by hand in storage
    pub fn sanitized(mut self) -> Self {
        self.sensitivity = if self.sensitivity.is_finite() {
            self.sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY)
        } else {
            1.0
        };
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "mine_storm_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Settings>(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings.sanitized();
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
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
