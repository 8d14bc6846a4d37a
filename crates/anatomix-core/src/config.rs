//! Tunable game settings, loadable from a JSON file.

use crate::camera::DEFAULT_FOV_Y_DEGREES;
use crate::snap::{DEFAULT_SNAP_RANGE, SnapTrigger};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Drag manipulation speeds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Degrees per second for rotate commands.
    pub rotation_speed: f32,
    /// World units per second for depth commands.
    pub z_move_speed: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            rotation_speed: 100.0,
            z_move_speed: 7.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Default anchor distance at which parts snap.
    pub range: f32,
    pub trigger: SnapTrigger,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            range: DEFAULT_SNAP_RANGE,
            trigger: SnapTrigger::default(),
        }
    }
}

/// Random initial placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    /// Maximum absolute offset per axis.
    pub position_range: Vec3,
    /// Maximum Euler angle per axis, in degrees.
    pub rotation_range: Vec3,
    /// Fixed seed for reproducible layouts.
    pub seed: Option<u64>,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            position_range: Vec3::splat(5.0),
            rotation_range: Vec3::splat(360.0),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub duration_secs: f32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self { duration_secs: 60.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Degrees per mouse axis unit per second.
    pub orbit_speed: f32,
    pub fov_y_degrees: f32,
    /// Distance of the eye from the origin along +Z.
    pub distance: f32,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            orbit_speed: 500.0,
            fov_y_degrees: DEFAULT_FOV_Y_DEGREES,
            distance: 10.0,
            viewport: Vec2::new(1280.0, 800.0),
        }
    }
}

/// Key names bound to drag and camera commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub pitch_up: String,
    pub pitch_down: String,
    pub yaw_left: String,
    pub yaw_right: String,
    pub depth_toward: String,
    pub depth_away: String,
    /// Held together with the right button to orbit the camera.
    pub orbit_modifier: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            pitch_up: "W".to_string(),
            pitch_down: "S".to_string(),
            yaw_left: "A".to_string(),
            yaw_right: "D".to_string(),
            depth_toward: "Q".to_string(),
            depth_away: "E".to_string(),
            orbit_modifier: "Shift".to_string(),
        }
    }
}

impl KeyBindings {
    /// All bindings as (key, action description) pairs.
    pub fn entries(&self) -> Vec<(&str, &'static str)> {
        vec![
            (self.pitch_up.as_str(), "Rotate dragged part up"),
            (self.pitch_down.as_str(), "Rotate dragged part down"),
            (self.yaw_left.as_str(), "Rotate dragged part left"),
            (self.yaw_right.as_str(), "Rotate dragged part right"),
            (self.depth_toward.as_str(), "Move dragged part closer"),
            (self.depth_away.as_str(), "Move dragged part away"),
            (self.orbit_modifier.as_str(), "Hold with right button to orbit camera"),
        ]
    }
}

/// Complete game configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    pub drag: DragConfig,
    pub snap: SnapConfig,
    pub scatter: ScatterConfig,
    pub timer: TimerConfig,
    pub camera: CameraConfig,
    pub bindings: KeyBindings,
}

impl PuzzleConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Serialize the config to pretty JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject values the game cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        let non_negative = [
            ("drag.rotation_speed", self.drag.rotation_speed),
            ("drag.z_move_speed", self.drag.z_move_speed),
            ("snap.range", self.snap.range),
            ("camera.orbit_speed", self.camera.orbit_speed),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be >= 0, got {}", name, value)));
            }
        }

        for (name, range) in [
            ("scatter.position_range", self.scatter.position_range),
            ("scatter.rotation_range", self.scatter.rotation_range),
        ] {
            if !range.is_finite() || range.min_element() < 0.0 {
                return Err(ConfigError::Invalid(format!("{} must be >= 0, got {}", name, range)));
            }
        }

        if !(self.timer.duration_secs.is_finite() && self.timer.duration_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "timer.duration_secs must be > 0, got {}",
                self.timer.duration_secs
            )));
        }
        if !(self.camera.fov_y_degrees > 0.0 && self.camera.fov_y_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov_y_degrees must be in (0, 180), got {}",
                self.camera.fov_y_degrees
            )));
        }
        if !(self.camera.distance.is_finite() && self.camera.distance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.distance must be > 0, got {}",
                self.camera.distance
            )));
        }
        let viewport = self.camera.viewport;
        if !viewport.is_finite() || viewport.min_element() < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "camera.viewport must be at least 1x1, got {}",
                viewport
            )));
        }
        Ok(())
    }
}
