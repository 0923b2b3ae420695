//! Player preferences
//!
//! Persisted separately from high scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::sim::{GameMode, InputMethod, Lane, PlayField, SessionConfig};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How lane changes are fed in
    pub input_method: InputMethod,
    /// Mode picked last time (restored on the menu)
    pub last_mode: GameMode,

    // === Camera ===
    /// Minimum classifier confidence before a pose counts as a lane change
    pub pose_confidence: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_method: InputMethod::Camera,
            last_mode: GameMode::Timed,

            pose_confidence: 0.8,
        }
    }
}

impl Settings {
    /// Session options for a run in `mode` with these preferences
    pub fn session_config(&self, mode: GameMode, field: PlayField) -> SessionConfig {
        SessionConfig {
            mode,
            input: self.input_method,
            field,
        }
    }

    /// Webcam preview opacity (dimmed when the camera is not driving input)
    pub fn webcam_opacity(&self) -> f32 {
        match self.input_method {
            InputMethod::Camera => 1.0,
            InputMethod::Keyboard => 0.1,
        }
    }

    /// Whether a classifier prediction is confident enough to act on
    pub fn accepts_pose(&self, probability: f32) -> bool {
        self.input_method == InputMethod::Camera && probability > self.pose_confidence
    }

    /// Lane for a classifier prediction, if it should steer at all
    ///
    /// Models exported with generic labels name their classes "Class 1..3".
    pub fn pose_lane(&self, class_name: &str, probability: f32) -> Option<Lane> {
        if !self.accepts_pose(probability) {
            return None;
        }
        match class_name {
            "Class 1" => Some(Lane::Center),
            "Class 2" => Some(Lane::Right),
            "Class 3" => Some(Lane::Left),
            name => Lane::from_str(name),
        }
    }

    /// Switch input method by name. Returns false for an unknown name.
    pub fn set_input_method(&mut self, name: &str) -> bool {
        match InputMethod::from_str(name) {
            Some(method) => {
                self.input_method = method;
                true
            }
            None => false,
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fruit_catcher_settings";

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
                    Err(err) => log::warn!("Discarding unreadable settings: {err}"),
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
    fn test_keyboard_dims_webcam_and_ignores_poses() {
        let settings = Settings {
            input_method: InputMethod::Keyboard,
            ..Default::default()
        };
        assert_eq!(settings.webcam_opacity(), 0.1);
        assert!(!settings.accepts_pose(0.99));
    }

    #[test]
    fn test_camera_needs_confident_pose() {
        let settings = Settings::default();
        assert!(settings.accepts_pose(0.81));
        assert!(!settings.accepts_pose(0.8));
    }

    #[test]
    fn test_session_config_carries_input() {
        let settings = Settings {
            input_method: InputMethod::Keyboard,
            ..Default::default()
        };
        let config = settings.session_config(GameMode::Staged { stage: 3 }, PlayField::default());
        assert_eq!(config.input, InputMethod::Keyboard);
        assert_eq!(config.mode.stage(), 3);
    }

    #[test]
    fn test_generic_class_labels_steer() {
        let settings = Settings::default();
        assert_eq!(settings.pose_lane("Class 1", 0.9), Some(Lane::Center));
        assert_eq!(settings.pose_lane("Class 2", 0.9), Some(Lane::Right));
        assert_eq!(settings.pose_lane("Class 3", 0.9), Some(Lane::Left));
        assert_eq!(settings.pose_lane("Left", 0.9), Some(Lane::Left));
        assert_eq!(settings.pose_lane("Class 4", 0.9), None);
        assert_eq!(settings.pose_lane("Class 1", 0.5), None);
    }

    #[test]
    fn test_input_method_switch_survives_save_format() {
        let mut settings = Settings::default();
        assert!(!settings.set_input_method("joystick"));
        assert_eq!(settings.input_method, InputMethod::Camera);

        assert!(settings.set_input_method("keyboard"));
        let json = serde_json::to_string(&settings).unwrap();
        let restored: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, settings);
        assert_eq!(restored.input_method, InputMethod::Keyboard);
        assert_eq!(restored.pose_lane("Center", 0.99), None);
    }

    #[test]
    fn test_settings_json_tolerates_missing_fields() {
        let settings: Settings = serde_json::from_str(r#"{ "input_method": "Keyboard" }"#).unwrap();
        assert_eq!(settings.input_method, InputMethod::Keyboard);
        assert_eq!(settings.pose_confidence, 0.8);
    }
}
