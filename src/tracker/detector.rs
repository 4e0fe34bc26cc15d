//! Hand landmark detection behind a trait seam
//!
//! The model itself is an opaque external collaborator: production runs a
//! MediaPipe hand landmarker in a Python subprocess speaking a small binary
//! frame-in / JSON-line-out protocol. The classifier never sees any of this,
//! it only receives [`HandLandmarks`].

use crate::config::DetectorConfig;
use crate::gesture::landmarks::{HandLandmarks, Landmark, LANDMARK_COUNT};
use anyhow::{Context, Result};
use opencv::core::Mat;
use opencv::prelude::*;
use serde::Deserialize;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, Stdio};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Detector subprocess protocol failures
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("detector script not found at {0}")]
    ScriptMissing(PathBuf),
    #[error("python interpreter not found at {0} (create the venv and install mediapipe)")]
    PythonMissing(PathBuf),
    #[error("detector subprocess did not signal ready (got {0:?})")]
    NotReady(String),
    #[error("detector backend reported: {0}")]
    Backend(String),
}

/// Per-frame landmark detection
///
/// Returns zero or one hands per frame (`max_hands` is clamped by
/// configuration; the gateway tracks a single hand).
pub trait HandDetector: Send {
    fn detect(&mut self, frame: &Mat) -> Result<Option<HandLandmarks>>;
}

#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    handedness: String,
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize, Debug)]
struct DetectionResult {
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// MediaPipe hand landmarker driven through a Python subprocess
///
/// Protocol: each frame is sent as three little-endian `u32`s (width, height,
/// channels) followed by the raw pixel bytes; the subprocess answers with one
/// JSON line per frame.
pub struct MediaPipeDetector {
    process: Child,
    stdout_reader: BufReader<ChildStdout>,
    min_confidence: f32,
}

impl MediaPipeDetector {
    /// Start the detector subprocess and wait for its ready signal
    pub fn new(config: &DetectorConfig) -> Result<Self> {
        if !config.script_path.exists() {
            return Err(DetectorError::ScriptMissing(config.script_path.clone()).into());
        }
        if !config.python_path.exists() {
            return Err(DetectorError::PythonMissing(config.python_path.clone()).into());
        }

        info!("Starting MediaPipe hand detector subprocess...");

        let mut process = Command::new(&config.python_path)
            .arg(&config.script_path)
            .arg("--model")
            .arg(&config.model_path)
            .arg("--max-hands")
            .arg(config.max_hands.to_string())
            .arg("--min-confidence")
            .arg(config.min_detection_confidence.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to start detector subprocess")?;

        let stdout = process
            .stdout
            .take()
            .context("failed to capture detector stdout")?;
        let mut stdout_reader = BufReader::new(stdout);

        let mut ready_line = String::new();
        stdout_reader
            .read_line(&mut ready_line)
            .context("failed to read detector ready signal")?;
        if ready_line.trim() != "READY" {
            let _ = process.kill();
            return Err(DetectorError::NotReady(ready_line).into());
        }

        info!(
            "MediaPipe hand detector ready (max_hands={}, min_confidence={})",
            config.max_hands, config.min_detection_confidence
        );

        Ok(Self {
            process,
            stdout_reader,
            min_confidence: config.min_detection_confidence,
        })
    }
}

impl HandDetector for MediaPipeDetector {
    fn detect(&mut self, frame: &Mat) -> Result<Option<HandLandmarks>> {
        if frame.empty() {
            return Ok(None);
        }

        let width = frame.cols() as u32;
        let height = frame.rows() as u32;
        let channels = frame.channels() as u32;
        let data = frame.data_bytes().context("frame data not contiguous")?;

        let stdin = self
            .process
            .stdin
            .as_mut()
            .context("detector stdin closed")?;
        stdin.write_all(&width.to_le_bytes())?;
        stdin.write_all(&height.to_le_bytes())?;
        stdin.write_all(&channels.to_le_bytes())?;
        stdin.write_all(data)?;
        stdin.flush()?;

        let mut response = String::new();
        self.stdout_reader
            .read_line(&mut response)
            .context("failed to read detector response")?;

        parse_detection_line(&response, self.min_confidence)
    }
}

impl Drop for MediaPipeDetector {
    fn drop(&mut self) {
        let _ = self.process.kill();
    }
}

/// Parse one JSON response line into the best accepted hand, if any
fn parse_detection_line(line: &str, min_confidence: f32) -> Result<Option<HandLandmarks>> {
    let result: DetectionResult = serde_json::from_str(line)
        .with_context(|| format!("failed to parse detector response: {line}"))?;

    if let Some(error) = result.error {
        warn!("{}", DetectorError::Backend(error));
        return Ok(None);
    }

    for hand in result.hands {
        if hand.score < min_confidence {
            debug!(
                "Hand below confidence threshold: {:.2} < {:.2}",
                hand.score, min_confidence
            );
            continue;
        }
        if hand.landmarks.len() != LANDMARK_COUNT {
            warn!(
                "Expected {} landmarks, got {}",
                LANDMARK_COUNT,
                hand.landmarks.len()
            );
            continue;
        }

        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        for (slot, lm) in landmarks.iter_mut().zip(hand.landmarks.iter()) {
            *slot = Landmark {
                x: lm.x,
                y: lm.y,
                z: lm.z,
            };
        }

        return Ok(Some(HandLandmarks {
            landmarks,
            confidence: hand.score,
            handedness: hand.handedness,
        }));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::landmarks::index;

    fn hand_json(score: f32, count: usize) -> String {
        let points: Vec<String> = (0..count)
            .map(|i| format!("{{\"x\":{},\"y\":0.5,\"z\":0.0}}", i as f32 / 21.0))
            .collect();
        format!(
            "{{\"hands\":[{{\"handedness\":\"Right\",\"score\":{},\"landmarks\":[{}]}}]}}",
            score,
            points.join(",")
        )
    }

    #[test]
    fn test_parse_accepts_confident_hand() {
        let hand = parse_detection_line(&hand_json(0.95, 21), 0.8)
            .unwrap()
            .expect("hand should be accepted");
        assert_eq!(hand.handedness, "Right");
        assert_eq!(hand.confidence, 0.95);
        assert_eq!(
            hand.landmarks[index::THUMB_TIP].x,
            index::THUMB_TIP as f32 / 21.0
        );
    }

    #[test]
    fn test_parse_rejects_low_confidence() {
        let result = parse_detection_line(&hand_json(0.5, 21), 0.8).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_parse_rejects_wrong_landmark_count() {
        let result = parse_detection_line(&hand_json(0.95, 20), 0.8).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_parse_backend_error_yields_no_hand() {
        let result = parse_detection_line("{\"hands\":[],\"error\":\"model not loaded\"}", 0.8);
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_parse_empty_hands() {
        let result = parse_detection_line("{\"hands\":[]}", 0.8).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        assert!(parse_detection_line("not json", 0.8).is_err());
    }
}
