//! Frame tracking pipeline: camera provider, landmark detector, and the
//! sequential gesture processor that feeds the classifier.

pub mod detector;
pub mod provider;

pub use detector::{HandDetector, MediaPipeDetector};
pub use provider::{CameraProvider, CaptureOptions};

use crate::gesture::landmarks::FrameObservation;
use crate::gesture::Classifier;
use crate::sink::ActionSink;
use crate::status::SharedStatus;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Spawn the sequential gesture processor task
///
/// A single task consumes observations in order, so classifier state never
/// races and actions reach the sink in frame order. The task ends when the
/// provider drops its sender.
pub fn spawn_processor(
    mut observation_rx: mpsc::UnboundedReceiver<FrameObservation>,
    status: Arc<SharedStatus>,
    mut classifier: Classifier,
    mut sink: Box<dyn ActionSink>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("Gesture processor started (sequential mode)");

        while let Some(observation) = observation_rx.recv().await {
            let enabled = status.control_enabled();
            match classifier.step(&observation, enabled, Instant::now(), sink.as_mut()) {
                Ok(label) => status.set_label(label),
                Err(e) => error!("Action sink error: {:#}", e),
            }
        }

        debug!("Gesture processor stopped");
    })
}
