//! Gesture classifier - the pinch/drag/click state machine
//!
//! One [`Classifier::step`] call per captured frame. The classifier is fully
//! synchronous and clock-injected (`now` is passed in), which keeps every
//! transition testable against a recording sink without a camera or model.
//!
//! Two deliberate deviations from the classic behavior are active by default
//! and can be switched back with `gesture.compat`:
//!
//! - lost detection resets pinch/drag state (and releases a held button)
//!   instead of leaving a drag stuck until the hand reappears;
//! - when a left gesture and a right-click fire in the same frame, the left
//!   label wins instead of being overwritten by the right-click label.

use crate::config::GestureConfig;
use crate::gesture::landmarks::{distance, index, FrameObservation};
use crate::sink::ActionSink;
use anyhow::Result;
use std::fmt;
use std::time::{Duration, Instant};

/// Discrete gesture label, recomputed every frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GestureLabel {
    #[default]
    Idle,
    Dragging,
    LeftClick,
    RightClick,
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GestureLabel::Idle => "Idle",
            GestureLabel::Dragging => "Dragging",
            GestureLabel::LeftClick => "Left Click",
            GestureLabel::RightClick => "Right Click",
        };
        f.write_str(text)
    }
}

/// Pinch/drag state carried across frames
///
/// Invariant: `dragging` implies `left_pinching` (a drag only persists while
/// the pinch is held).
#[derive(Clone, Copy, Debug, Default)]
pub struct GestureState {
    pub dragging: bool,
    pub left_pinching: bool,
    pub right_pinching: bool,
    pub pinch_start: Option<Instant>,
}

/// Classifier thresholds and compatibility switch
#[derive(Clone, Copy, Debug)]
pub struct ClassifierConfig {
    /// Pinch trigger distance in frame-pixel units
    pub pinch_threshold_px: f32,
    /// Minimum continuous pinch before it becomes a drag instead of a click
    pub hold_threshold: Duration,
    /// Reproduce the legacy stuck-drag and label-collision behaviors
    pub compat: bool,
}

impl From<&GestureConfig> for ClassifierConfig {
    fn from(config: &GestureConfig) -> Self {
        Self {
            pinch_threshold_px: config.pinch_threshold_px,
            hold_threshold: Duration::from_millis(config.hold_threshold_ms),
            compat: config.compat,
        }
    }
}

/// Converts per-frame landmark observations into mouse actions
pub struct Classifier {
    config: ClassifierConfig,
    screen: (u32, u32),
    state: GestureState,
}

impl Classifier {
    pub fn new(config: ClassifierConfig, screen: (u32, u32)) -> Self {
        Self {
            config,
            screen,
            state: GestureState::default(),
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Process one frame observation
    ///
    /// Emits mouse actions through the sink and returns the gesture label for
    /// this frame. With no landmarks or control disabled the label is Idle
    /// and state is left alone, except the corrected lost-detection reset
    /// described in the module docs.
    pub fn step(
        &mut self,
        observation: &FrameObservation,
        enabled: bool,
        now: Instant,
        sink: &mut dyn ActionSink,
    ) -> Result<GestureLabel> {
        let Some(hand) = observation.landmarks.as_ref() else {
            return self.on_lost_detection(sink);
        };
        if !enabled {
            // State deliberately persists, including a held drag. The button
            // stays physically down until re-enabled landmarks resolve it.
            return Ok(GestureLabel::Idle);
        }

        let frame_w = observation.frame_width as f32;
        let frame_h = observation.frame_height as f32;
        let index_tip = hand.point_px(index::INDEX_FINGER_TIP, frame_w, frame_h);
        let thumb_tip = hand.point_px(index::THUMB_TIP, frame_w, frame_h);
        let middle_tip = hand.point_px(index::MIDDLE_FINGER_TIP, frame_w, frame_h);
        let (screen_x, screen_y) =
            hand.point_on_screen(index::INDEX_FINGER_TIP, self.screen.0, self.screen.1);

        let d_it = distance(index_tip, thumb_tip);
        let d_mt = distance(middle_tip, thumb_tip);
        let threshold = self.config.pinch_threshold_px;

        let mut label = GestureLabel::Idle;

        // Move policy: no movement while a pinch is held but the drag has not
        // engaged yet (the commit-point delay before a click or drag).
        if d_it >= threshold && !self.state.dragging {
            sink.move_to(screen_x, screen_y)?;
        }

        // Left pinch / drag / click machine
        if d_it < threshold {
            if !self.state.left_pinching {
                self.state.left_pinching = true;
                self.state.pinch_start = Some(now);
            } else if !self.state.dragging {
                let held_long_enough = self
                    .state
                    .pinch_start
                    .is_some_and(|start| now.duration_since(start) > self.config.hold_threshold);
                if held_long_enough {
                    sink.mouse_down()?;
                    self.state.dragging = true;
                    label = GestureLabel::Dragging;
                }
            } else {
                // Drag-follow: the cursor tracks the index tip every frame
                sink.move_to(screen_x, screen_y)?;
                label = GestureLabel::Dragging;
            }
        } else if self.state.left_pinching {
            if self.state.dragging {
                sink.mouse_up()?;
                self.state.dragging = false;
            } else if self
                .state
                .pinch_start
                .is_some_and(|start| now.duration_since(start) < self.config.hold_threshold)
            {
                sink.click()?;
                label = GestureLabel::LeftClick;
            }
            self.state.left_pinching = false;
        }

        // Right pinch: edge-triggered, evaluated after the left machine. The
        // flag gates re-entry so holding the pinch does not repeat-fire.
        if d_mt < threshold {
            if !self.state.right_pinching {
                self.state.right_pinching = true;
                sink.right_click()?;
                if self.config.compat || label == GestureLabel::Idle {
                    label = GestureLabel::RightClick;
                }
            }
        } else {
            self.state.right_pinching = false;
        }

        Ok(label)
    }

    fn on_lost_detection(&mut self, sink: &mut dyn ActionSink) -> Result<GestureLabel> {
        if !self.config.compat {
            if self.state.dragging {
                sink.mouse_up()?;
            }
            self.state = GestureState::default();
        }
        Ok(GestureLabel::Idle)
    }
}
