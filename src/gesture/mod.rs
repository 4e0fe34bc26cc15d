//! Gesture classification - the owned core of the gateway
//!
//! [`landmarks`] carries the hand-landmark data model; [`classifier`] holds
//! the pinch/drag/click state machine driven once per captured frame.

pub mod classifier;
pub mod landmarks;

pub use classifier::{Classifier, ClassifierConfig, GestureLabel, GestureState};
pub use landmarks::{FrameObservation, HandLandmarks, Landmark};
