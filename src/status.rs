//! Shared status between the classification pipeline and the control panel
//!
//! The classic design shared a bare flag and a label string across threads
//! with no synchronization. Here both crossings are explicit: the enable
//! switch is an `AtomicBool` and the gesture label lives in a lock-free
//! `AtomicCell`. Both values are idempotently overwritten every cycle, so
//! relaxed ordering is sufficient.

use crate::gesture::GestureLabel;
use crossbeam::atomic::AtomicCell;
use std::sync::atomic::{AtomicBool, Ordering};

/// Status cell shared between the pipeline, the preview overlay and the GUI
pub struct SharedStatus {
    control_enabled: AtomicBool,
    label: AtomicCell<GestureLabel>,
}

impl SharedStatus {
    /// Control starts enabled with an idle label
    pub fn new() -> Self {
        Self {
            control_enabled: AtomicBool::new(true),
            label: AtomicCell::new(GestureLabel::Idle),
        }
    }

    pub fn control_enabled(&self) -> bool {
        self.control_enabled.load(Ordering::Relaxed)
    }

    /// Flip the enable switch, returning the new value
    pub fn toggle_control(&self) -> bool {
        !self.control_enabled.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn label(&self) -> GestureLabel {
        self.label.load()
    }

    pub fn set_label(&self, label: GestureLabel) {
        self.label.store(label);
    }

    /// Text shown in the preview overlay and the control panel
    pub fn display_text(&self) -> String {
        if self.control_enabled() {
            format!("Gesture: {}", self.label())
        } else {
            "Gesture: Control OFF".to_string()
        }
    }
}

impl Default for SharedStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trip() {
        let status = SharedStatus::new();
        assert!(status.control_enabled());

        assert!(!status.toggle_control());
        assert!(!status.control_enabled());

        assert!(status.toggle_control());
        assert!(status.control_enabled());
    }

    #[test]
    fn test_display_text_reflects_enable_state() {
        let status = SharedStatus::new();
        status.set_label(GestureLabel::Dragging);
        assert_eq!(status.display_text(), "Gesture: Dragging");

        status.toggle_control();
        // Disabled control wins over the last written label
        assert_eq!(status.display_text(), "Gesture: Control OFF");
    }

    #[test]
    fn test_label_store_load() {
        let status = SharedStatus::new();
        assert_eq!(status.label(), GestureLabel::Idle);

        status.set_label(GestureLabel::RightClick);
        assert_eq!(status.label(), GestureLabel::RightClick);
    }
}
