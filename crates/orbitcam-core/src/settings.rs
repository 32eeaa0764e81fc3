#![forbid(unsafe_code)]

//! Gesture tuning parameters.
//!
//! [`GestureSettings`] is supplied once when a tracker is built and never
//! changes afterwards. With the `settings-file` feature it can be loaded from
//! TOML or JSON:
//!
//! ```toml
//! # orbitcam.toml
//! touch_pinch_zoom_speed = 0.6
//! double_tap_max_time_seconds = 0.4
//! double_tap_zoom_enabled = true
//! ```
//!
//! ```rust,ignore
//! let settings = GestureSettings::from_toml_file("orbitcam.toml")?;
//! let settings = GestureSettings::from_json_str(json)?;
//! ```
//!
//! Missing keys fall back to [`GestureSettings::default`]. Loaders run
//! [`GestureSettings::validate`] and reject out-of-range values.

#[cfg(feature = "settings-file")]
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable gesture configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GestureSettings {
    /// Zoom change per unit of wheel delta per second. Default: 0.5.
    pub mouse_scroll_zoom_speed: f32,
    /// Zoom change per inch of pinch distance change. Default: 0.5.
    pub touch_pinch_zoom_speed: f32,
    /// Zoom change per unit of vertical viewport drag. Default: 2.0.
    pub double_tap_zoom_speed: f32,
    /// Window for the second tap, measured from the first press. Default: 0.5 s.
    pub double_tap_max_time_seconds: f64,
    /// Zoom fraction a fresh tracker starts at. Default: 0.5.
    pub default_zoom_fraction: f32,
    /// Enables the tap-tap-drag zoom gesture. Default: true.
    pub double_tap_zoom_enabled: bool,
    /// Lower bound (exclusive) of the zoom window where pinch pulls the camera
    /// toward the pinch point. Default: 0.3.
    pub pinch_point_zoom_min: f32,
    /// Upper bound (exclusive) of that window. Default: 1.0.
    pub pinch_point_zoom_max: f32,
    /// World units travelled per unit of scaled pinch delta. Default: 2000.
    pub pinch_travel_scale: f32,
    /// Multiplier from zoom fraction to pan speed. Default: 1000.
    pub pan_speed_scale: f32,
    /// Slowest pan speed. Default: 200.
    pub pan_speed_min: f32,
    /// Fastest pan speed. Default: 1000.
    pub pan_speed_max: f32,
    /// Downward component forced onto near-horizontal orbit rays. Default: -0.1.
    pub ground_clamp_threshold: f32,
    /// Height of the plane used by orbit projection. Default: 0.0.
    pub orbit_ground_height: f32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            mouse_scroll_zoom_speed: 0.5,
            touch_pinch_zoom_speed: 0.5,
            double_tap_zoom_speed: 2.0,
            double_tap_max_time_seconds: 0.5,
            default_zoom_fraction: 0.5,
            double_tap_zoom_enabled: true,
            pinch_point_zoom_min: 0.3,
            pinch_point_zoom_max: 1.0,
            pinch_travel_scale: 2000.0,
            pan_speed_scale: 1000.0,
            pan_speed_min: 200.0,
            pan_speed_max: 1000.0,
            ground_clamp_threshold: -0.1,
            orbit_ground_height: 0.0,
        }
    }
}

impl GestureSettings {
    /// Load from a TOML string.
    #[cfg(feature = "settings-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(s)?;
        settings.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "settings-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "settings-file")]
    pub fn from_json_str(s: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(s)?;
        settings.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "settings-file")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load from a file, picking the format from its extension (`.json`,
    /// anything else is read as TOML).
    #[cfg(feature = "settings-file")]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Check every parameter is within its accepted range.
    ///
    /// An empty list means the settings are valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let speeds = [
            ("mouse_scroll_zoom_speed", self.mouse_scroll_zoom_speed),
            ("touch_pinch_zoom_speed", self.touch_pinch_zoom_speed),
            ("double_tap_zoom_speed", self.double_tap_zoom_speed),
            ("pinch_travel_scale", self.pinch_travel_scale),
            ("pan_speed_scale", self.pan_speed_scale),
        ];
        for (name, value) in speeds {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{name} must be finite and >= 0, got {value}"));
            }
        }

        if !self.double_tap_max_time_seconds.is_finite() || self.double_tap_max_time_seconds <= 0.0
        {
            errors.push(format!(
                "double_tap_max_time_seconds must be > 0, got {}",
                self.double_tap_max_time_seconds
            ));
        }

        if !(0.0..=1.0).contains(&self.default_zoom_fraction) {
            errors.push(format!(
                "default_zoom_fraction must be in [0, 1], got {}",
                self.default_zoom_fraction
            ));
        }

        let window_ok = (0.0..=1.0).contains(&self.pinch_point_zoom_min)
            && (0.0..=1.0).contains(&self.pinch_point_zoom_max)
            && self.pinch_point_zoom_min < self.pinch_point_zoom_max;
        if !window_ok {
            errors.push(format!(
                "pinch_point_zoom_min/max must be ordered within [0, 1], got {}..{}",
                self.pinch_point_zoom_min, self.pinch_point_zoom_max
            ));
        }

        let pan_ok = self.pan_speed_min.is_finite()
            && self.pan_speed_max.is_finite()
            && self.pan_speed_min >= 0.0
            && self.pan_speed_min <= self.pan_speed_max;
        if !pan_ok {
            errors.push(format!(
                "pan_speed_min must be in [0, pan_speed_max], got {}..{}",
                self.pan_speed_min, self.pan_speed_max
            ));
        }

        if !(self.ground_clamp_threshold < 0.0 && self.ground_clamp_threshold >= -1.0) {
            errors.push(format!(
                "ground_clamp_threshold must be in [-1, 0), got {}",
                self.ground_clamp_threshold
            ));
        }

        if !self.orbit_ground_height.is_finite() {
            errors.push(format!(
                "orbit_ground_height must be finite, got {}",
                self.orbit_ground_height
            ));
        }

        errors
    }

    /// Return `self` if valid, otherwise every validation failure.
    pub fn validated(self) -> Result<Self, SettingsError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(SettingsError::Validation(errors))
        }
    }

    /// Pan speed for a given zoom fraction.
    #[inline]
    #[must_use]
    pub fn pan_speed(&self, zoom_fraction: f32) -> f32 {
        (zoom_fraction * self.pan_speed_scale).clamp(self.pan_speed_min, self.pan_speed_max)
    }

    /// Whether pinch zoom pulls the camera toward the pinch point at this zoom.
    #[inline]
    #[must_use]
    pub fn pinch_point_window_contains(&self, zoom_fraction: f32) -> bool {
        zoom_fraction > self.pinch_point_zoom_min && zoom_fraction < self.pinch_point_zoom_max
    }
}

/// Errors from loading or validating [`GestureSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "settings-file")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "settings-file")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// One or more parameters out of range.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
