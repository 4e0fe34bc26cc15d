//! Hand landmark types shared between the detector and the classifier.
//!
//! Landmark indices follow the MediaPipe hand landmarker convention
//! (21 points per hand, normalized to the frame).

/// Landmark indices (MediaPipe hand landmark model convention)
#[allow(dead_code)]
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_MCP: usize = 5;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_DIP: usize = 7;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP: usize = 13;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_DIP: usize = 15;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// Number of landmarks per hand
pub const LANDMARK_COUNT: usize = 21;

/// A single hand landmark, normalized to the frame (0.0..1.0 on both axes)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Depth relative to the wrist; unused by the classifier but kept from the detector
    pub z: f32,
}

/// One detected hand: all 21 landmarks plus detection metadata
#[derive(Clone, Debug)]
pub struct HandLandmarks {
    pub landmarks: [Landmark; LANDMARK_COUNT],
    /// Detection confidence (0.0..1.0)
    pub confidence: f32,
    /// "Left" or "Right" as reported by the model
    pub handedness: String,
}

impl HandLandmarks {
    /// Landmark position in frame-pixel space
    pub fn point_px(&self, idx: usize, frame_width: f32, frame_height: f32) -> (f32, f32) {
        let lm = &self.landmarks[idx];
        (lm.x * frame_width, lm.y * frame_height)
    }

    /// Landmark position scaled to screen space with independent
    /// horizontal/vertical factors
    pub fn point_on_screen(&self, idx: usize, screen_width: u32, screen_height: u32) -> (i32, i32) {
        let lm = &self.landmarks[idx];
        (
            (lm.x * screen_width as f32) as i32,
            (lm.y * screen_height as f32) as i32,
        )
    }
}

/// One frame's worth of detector output, handed to the classifier
///
/// `landmarks` is `None` on a missed detection; frame dimensions are those of
/// the mirrored capture frame.
#[derive(Clone, Debug)]
pub struct FrameObservation {
    pub landmarks: Option<HandLandmarks>,
    pub frame_width: u32,
    pub frame_height: u32,
}

/// Euclidean distance between two frame-pixel points
pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_with(points: &[(usize, f32, f32)]) -> HandLandmarks {
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        for &(idx, x, y) in points {
            landmarks[idx] = Landmark { x, y, z: 0.0 };
        }
        HandLandmarks {
            landmarks,
            confidence: 1.0,
            handedness: "Right".to_string(),
        }
    }

    #[test]
    fn test_point_scaling_is_axis_independent() {
        let hand = hand_with(&[(index::INDEX_FINGER_TIP, 0.5, 0.25)]);

        let (fx, fy) = hand.point_px(index::INDEX_FINGER_TIP, 640.0, 480.0);
        assert_eq!((fx, fy), (320.0, 120.0));

        // Screen scaling uses the screen dimensions, not the frame dimensions
        let (sx, sy) = hand.point_on_screen(index::INDEX_FINGER_TIP, 1920, 1080);
        assert_eq!((sx, sy), (960, 270));
    }

    #[test]
    fn test_distance() {
        assert_eq!(distance((0.0, 0.0), (3.0, 4.0)), 5.0);
        assert_eq!(distance((10.0, 10.0), (10.0, 10.0)), 0.0);
    }
}
