//! Camera provider - blocking capture/detection loop on a dedicated thread
//!
//! OpenCV capture and highgui are not async-friendly, so the provider runs a
//! plain blocking loop in its own thread and forwards one
//! [`FrameObservation`] per frame to the async world over an unbounded
//! channel. The optional preview window mirrors the camera feed with the
//! current gesture label overlaid; pressing ESC there stops the loop.

use crate::gesture::landmarks::FrameObservation;
use crate::status::SharedStatus;
use crate::tracker::detector::HandDetector;
use anyhow::Result;
use opencv::core::{self, Mat, Point, Scalar};
use opencv::prelude::*;
use opencv::{highgui, imgproc, videoio};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Preview window title
const PREVIEW_WINDOW: &str = "AirMouse GW";

/// highgui key code for ESC
const KEY_ESC: i32 = 27;

/// Camera capture settings consumed by the provider
#[derive(Clone, Debug)]
pub struct CaptureOptions {
    pub camera_index: i32,
    pub preview: bool,
}

/// Webcam frame provider with landmark detection
pub struct CameraProvider {
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl CameraProvider {
    /// Start the capture thread
    ///
    /// The thread owns the camera and the detector; it stops on shutdown
    /// signal, ESC in the preview, camera failure, or when the event receiver
    /// is dropped.
    pub fn start(
        options: CaptureOptions,
        detector: Box<dyn HandDetector>,
        status: Arc<SharedStatus>,
        event_tx: mpsc::UnboundedSender<FrameObservation>,
    ) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

        std::thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || {
                Self::capture_loop_blocking(options, detector, status, event_tx, shutdown_rx);
            })?;

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Main capture loop (runs in the dedicated blocking thread)
    fn capture_loop_blocking(
        options: CaptureOptions,
        mut detector: Box<dyn HandDetector>,
        status: Arc<SharedStatus>,
        event_tx: mpsc::UnboundedSender<FrameObservation>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut camera = match videoio::VideoCapture::new(options.camera_index, videoio::CAP_ANY) {
            Ok(camera) => camera,
            Err(e) => {
                warn!("Failed to open camera {}: {}", options.camera_index, e);
                return;
            },
        };
        match camera.is_opened() {
            Ok(true) => info!("Camera {} opened", options.camera_index),
            _ => {
                warn!("Camera {} is not available", options.camera_index);
                return;
            },
        }

        let mut frame = Mat::default();
        let mut mirrored = Mat::default();

        loop {
            // Check for shutdown signal (non-blocking)
            match shutdown_rx.try_recv() {
                Ok(_) | Err(mpsc::error::TryRecvError::Disconnected) => {
                    info!("Camera provider shutting down");
                    break;
                },
                Err(mpsc::error::TryRecvError::Empty) => {},
            }

            // A failed read is treated as end of stream. The classic behavior
            // terminated silently here; we at least say why we stopped.
            match camera.read(&mut frame) {
                Ok(true) if !frame.empty() => {},
                Ok(_) => {
                    warn!("Camera read returned no frame, stopping capture");
                    break;
                },
                Err(e) => {
                    warn!("Camera read failed ({}), stopping capture", e);
                    break;
                },
            }

            // Mirror horizontally so on-screen motion matches hand motion
            if let Err(e) = core::flip(&frame, &mut mirrored, 1) {
                warn!("Frame mirror failed: {}", e);
                continue;
            }

            let landmarks = match detector.detect(&mirrored) {
                Ok(landmarks) => landmarks,
                Err(e) => {
                    warn!("Landmark detection failed: {:#}", e);
                    None
                },
            };
            debug!(
                "Frame {}x{}, hand detected: {}",
                mirrored.cols(),
                mirrored.rows(),
                landmarks.is_some()
            );

            let observation = FrameObservation {
                landmarks,
                frame_width: mirrored.cols() as u32,
                frame_height: mirrored.rows() as u32,
            };
            if event_tx.send(observation).is_err() {
                warn!("Observation receiver dropped, stopping capture");
                break;
            }

            if options.preview && !Self::show_preview(&mut mirrored, &status) {
                break;
            }
        }

        if options.preview {
            let _ = highgui::destroy_all_windows();
        }
        info!("Capture loop stopped");
    }

    /// Render the preview frame; returns false when ESC was pressed
    fn show_preview(frame: &mut Mat, status: &SharedStatus) -> bool {
        let text = status.display_text();
        if let Err(e) = imgproc::put_text(
            frame,
            &text,
            Point::new(10, 50),
            imgproc::FONT_HERSHEY_SIMPLEX,
            1.4,
            Scalar::new(0.0, 255.0, 0.0, 0.0),
            3,
            imgproc::LINE_8,
            false,
        ) {
            warn!("Preview overlay failed: {}", e);
        }

        if let Err(e) = highgui::imshow(PREVIEW_WINDOW, frame) {
            warn!("Preview display failed ({}), disabling preview", e);
            return true;
        }
        match highgui::wait_key(1) {
            Ok(KEY_ESC) => {
                info!("ESC pressed in preview, stopping capture");
                false
            },
            _ => true,
        }
    }

    /// Request the capture thread to stop
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
            info!("Camera provider shutdown requested");
        }
        Ok(())
    }
}

impl Drop for CameraProvider {
    fn drop(&mut self) {
        // Attempt to send shutdown signal if not already sent
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
    }
}
