//! Tunables for the controller, key bindings and the window.
//!
//! Everything has a default; a RON settings file only needs to name the fields it
//! overrides:
//!
//! ```ron
//! (
//!     controller: (walk_speed: 7.5, min_fov: 10.0),
//!     keys: (toggle_selfie: "t"),
//! )
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::controller::KeyBindings;
use crate::error::ConfigError;

pub const CONFIG_PATH_ENV: &str = "CAMSNAP_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "camsnap.ron";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub controller: ControllerSettings,
    pub keys: KeyBindings,
    pub window: WindowSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Metres per second.
    pub walk_speed: f32,
    /// Degrees of rotation per pixel of mouse travel.
    pub mouse_sensitivity: f32,
    /// Pitch is clamped to +/- this many degrees.
    pub vertical_angle_limit: f32,
    /// Vertical field of view outside camera mode, and the widest zoom.
    pub original_fov: f32,
    /// Narrowest zoom in camera mode.
    pub min_fov: f32,
    /// Degrees of field of view per second while a zoom key is held.
    pub zoom_speed: f32,
    /// How far the camera is pushed out in front of the face for a selfie.
    pub selfie_distance: f32,
    /// Seconds the white flash stays opaque after a snap.
    pub flash_duration: f32,
    pub eye_height: f32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            walk_speed: 5.0,
            mouse_sensitivity: 0.1,
            vertical_angle_limit: 80.0,
            original_fov: 60.0,
            min_fov: 15.0,
            zoom_speed: 10.0,
            selfie_distance: 1.5,
            flash_duration: 0.2,
            eye_height: 1.6,
        }
    }
}

impl ControllerSettings {
    /// Repair values that would break the clamps (inverted ranges, negative speeds).
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.original_fov > 1.0 && self.original_fov < 179.0) {
            warn!(value = self.original_fov, "original_fov out of range, using default");
            self.original_fov = defaults.original_fov;
        }
        if !(self.min_fov > 0.0) || self.min_fov > self.original_fov {
            warn!(value = self.min_fov, "min_fov out of range, clamping");
            self.min_fov = self.min_fov.clamp(1.0, self.original_fov);
            if self.min_fov.is_nan() {
                self.min_fov = self.original_fov;
            }
        }
        self.vertical_angle_limit = self.vertical_angle_limit.abs().min(90.0);
        self.walk_speed = self.walk_speed.max(0.0);
        self.zoom_speed = self.zoom_speed.max(0.0);
        self.flash_duration = self.flash_duration.max(0.0);
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "camsnap".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

impl Settings {
    pub fn from_ron(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = ron::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(settings.normalized())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(path, &text)
    }

    /// Load `path` if it exists; any failure falls back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "no settings file, using defaults");
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => {
                info!(path = %path.display(), "loaded settings");
                settings
            }
            Err(e) => {
                warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// Settings path from `CAMSNAP_CONFIG`, else `camsnap.ron` in the working directory.
    pub fn path_from_env() -> std::path::PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|_| std::path::PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    fn normalized(mut self) -> Self {
        self.controller = self.controller.sanitized();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let text = r#"(controller: (walk_speed: 7.5), keys: (toggle_selfie: "t"))"#;
        let settings = Settings::from_ron(Path::new("test.ron"), text).unwrap();
        assert_eq!(settings.controller.walk_speed, 7.5);
        assert_eq!(settings.controller.min_fov, 15.0);
        assert_eq!(settings.keys.toggle_selfie, "t");
        assert_eq!(settings.keys.toggle_camera_mode, "f");
        assert_eq!(settings.window.width, 1280);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let settings = Settings::from_ron(Path::new("test.ron"), "()").unwrap();
        assert_eq!(settings.controller.original_fov, 60.0);
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = Settings::from_ron(Path::new("broken.ron"), "(controller: (walk_speed: ))")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.ron"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = Settings::load_or_default(Path::new("definitely/not/here.ron"));
        assert_eq!(settings.controller.walk_speed, 5.0);
    }

    #[test]
    fn inverted_fov_range_is_repaired() {
        let settings = ControllerSettings {
            original_fov: 40.0,
            min_fov: 70.0,
            ..ControllerSettings::default()
        }
        .sanitized();
        assert!(settings.min_fov <= settings.original_fov);
    }
}
