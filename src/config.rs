//! Configuration management for AirMouse GW
//!
//! All values default to the embedded constants of the classic behavior
//! (pinch threshold 40 px, hold 300 ms, one hand, confidence 0.8), so the
//! gateway runs without any configuration file present.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
}

/// Webcam configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraConfig {
    /// Device index passed to OpenCV
    #[serde(default = "default_camera_index")]
    pub index: i32,
    /// Show the mirrored camera feed with the gesture label overlaid
    #[serde(default = "default_true")]
    pub preview: bool,
}

/// Gesture classification thresholds and compatibility switches
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GestureConfig {
    /// Pinch trigger distance in frame-pixel units
    #[serde(default = "default_pinch_threshold")]
    pub pinch_threshold_px: f32,
    /// Minimum pinch hold before a drag engages instead of a click
    #[serde(default = "default_hold_threshold_ms")]
    pub hold_threshold_ms: u64,
    /// Reproduce the legacy quirks: pinch/drag state persists across lost
    /// detections (stuck drag) and a right-click label overwrites a
    /// left-click/drag label within the same frame
    #[serde(default)]
    pub compat: bool,
}

/// Hand landmark detector (MediaPipe subprocess) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectorConfig {
    #[serde(default = "default_max_hands")]
    pub max_hands: u32,
    #[serde(default = "default_min_confidence")]
    pub min_detection_confidence: f32,
    /// Python interpreter used to run the detector script
    #[serde(default = "default_python_path")]
    pub python_path: PathBuf,
    /// Detector script speaking the frame-in / JSON-out protocol
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,
    /// MediaPipe hand landmarker model bundle
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

fn default_camera_index() -> i32 {
    0
}

fn default_true() -> bool {
    true
}

fn default_pinch_threshold() -> f32 {
    40.0
}

fn default_hold_threshold_ms() -> u64 {
    300
}

fn default_max_hands() -> u32 {
    1
}

fn default_min_confidence() -> f32 {
    0.8
}

fn default_python_path() -> PathBuf {
    PathBuf::from(".venv/bin/python")
}

fn default_script_path() -> PathBuf {
    PathBuf::from("hand_detect.py")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/hand_landmarker.task")
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: default_camera_index(),
            preview: true,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold_px: default_pinch_threshold(),
            hold_threshold_ms: default_hold_threshold_ms(),
            compat: false,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_hands: default_max_hands(),
            min_detection_confidence: default_min_confidence(),
            python_path: default_python_path(),
            script_path: default_script_path(),
            model_path: default_model_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    ///
    /// A missing file is not an error: the gateway then runs on the built-in
    /// defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(
                "No configuration file at {}, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the classifier cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.gesture.pinch_threshold_px <= 0.0 {
            anyhow::bail!(
                "gesture.pinch_threshold_px must be positive (got {})",
                self.gesture.pinch_threshold_px
            );
        }
        if !(0.0..=1.0).contains(&self.detector.min_detection_confidence) {
            anyhow::bail!(
                "detector.min_detection_confidence must be within 0.0..=1.0 (got {})",
                self.detector.min_detection_confidence
            );
        }
        if self.detector.max_hands == 0 {
            anyhow::bail!("detector.max_hands must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_classic_constants() {
        let config = AppConfig::default();
        assert_eq!(config.camera.index, 0);
        assert!(config.camera.preview);
        assert_eq!(config.gesture.pinch_threshold_px, 40.0);
        assert_eq!(config.gesture.hold_threshold_ms, 300);
        assert!(!config.gesture.compat);
        assert_eq!(config.detector.max_hands, 1);
        assert_eq!(config.detector.min_detection_confidence, 0.8);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load("/nonexistent/airmouse.yaml").unwrap();
        assert_eq!(config.gesture.pinch_threshold_px, 40.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_absent_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "gesture:\n  pinch_threshold_px: 55.0\ncamera:\n  index: 2"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.gesture.pinch_threshold_px, 55.0);
        assert_eq!(config.camera.index, 2);
        // Untouched sections keep their defaults
        assert_eq!(config.gesture.hold_threshold_ms, 300);
        assert_eq!(config.detector.max_hands, 1);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gesture:\n  pinch_threshold_px: -1.0").unwrap();

        assert!(AppConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_invalid_confidence_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "detector:\n  min_detection_confidence: 1.5").unwrap();

        assert!(AppConfig::load(file.path()).is_err());
    }
}
