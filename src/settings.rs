//! Game settings and preferences
//!
//! Persisted separately from progress in LocalStorage.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Mute toggle from the HUD
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Engine drone and siren volume (0.0 - 1.0)
    pub loop_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Visual Effects ===
    /// Camera shake on collisions
    pub screen_shake: bool,
    /// Camera lean on lane changes
    pub camera_lean: bool,

    // === Controls ===
    /// Steer by tilting the device (mobile)
    pub tilt_steering: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no lean)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Audio
            muted: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            loop_volume: 0.7,
            mute_on_blur: true,

            // Visual effects
            screen_shake: true,
            camera_lean: true,

            // Controls
            tilt_steering: true,

            // Accessibility
            reduced_motion: false,
        }
    }
}

impl Settings {
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective camera lean (respects reduced_motion)
    pub fn effective_camera_lean(&self) -> bool {
        self.camera_lean && !self.reduced_motion
    }

    /// Volume for one-shot effects, 0 when muted
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Volume for the engine/siren loops, 0 when muted
    pub fn effective_loop_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.loop_volume).clamp(0.0, 1.0)
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "street_pursuit_settings";

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
                    Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
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
