//! Hand landmarks to puzzle-space cursor.
//!
//! The capture step mirrors the camera image horizontally; the display step
//! then rotates that mirrored frame by 90 degrees. A landmark located in the
//! mirrored capture frame therefore lands at
//!
//! ```text
//! display_x = capture_y
//! display_y = size - capture_x
//! ```
//!
//! This holds only for mirror-then-rotate on a square frame of side `size`.
//! A different capture pipeline needs its own transform.

use serde::Deserialize;

use crate::config::CaptchaConfig;
use crate::models::Point;

/// MediaPipe hand landmark indices used here.
pub mod landmarks {
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const COUNT: usize = 21;
}

/// One landmark as reported by the tracker, normalized to `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct NormalizedLandmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

/// Normalized coordinates are clamped to this range before scaling.
const NORMALIZED_RANGE: (f32, f32) = (-1.0, 2.0);

/// Landmarks the puzzle needs, in capture-frame pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandLandmarks {
    pub index_tip: Point,
    pub thumb_tip: Point,
}

impl HandLandmarks {
    /// Scale a normalized landmark set to a `width` x `height` capture frame.
    /// Coordinates are clamped to `[-1, 2]` and pixel values truncated; NaN
    /// maps to 0. Returns `None` if the set is too short to contain the index
    /// fingertip.
    pub fn from_normalized(set: &[NormalizedLandmark], width: i32, height: i32) -> Option<Self> {
        let (lo, hi) = NORMALIZED_RANGE;
        let scale = |v: f32, extent: i32| (v.clamp(lo, hi) * extent as f32) as i32;
        let to_px = |lm: &NormalizedLandmark| Point::new(scale(lm.x, width), scale(lm.y, height));
        let index_tip = set.get(landmarks::INDEX_FINGER_TIP).map(to_px)?;
        let thumb_tip = set.get(landmarks::THUMB_TIP).map(to_px)?;
        Some(HandLandmarks {
            index_tip,
            thumb_tip,
        })
    }
}

/// Normalized hand signal for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureSample {
    /// Index fingertip in display space.
    pub position: Point,
    pub pinching: bool,
}

/// Mirror-then-rotate mapping between capture and display space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureTransform {
    size: i32,
}

impl CaptureTransform {
    pub fn new(size: i32) -> Self {
        CaptureTransform { size }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn to_display(&self, capture: Point) -> Point {
        Point::new(capture.y, self.size.saturating_sub(capture.x))
    }

    pub fn to_capture(&self, display: Point) -> Point {
        Point::new(self.size.saturating_sub(display.y), display.x)
    }

    /// Canvas transform `(a, b, c, d, e, f)` drawing a capture-space image in
    /// display space, matching [`to_display`](Self::to_display).
    pub fn canvas_matrix(&self) -> [f64; 6] {
        [0.0, -1.0, 1.0, 0.0, 0.0, f64::from(self.size)]
    }

    /// Canvas transform drawing the raw camera image (scaled to `size`) into
    /// capture space. Followed by [`canvas_matrix`](Self::canvas_matrix) the
    /// net result is the horizontally mirrored, upright camera view.
    pub fn capture_matrix(&self) -> [f64; 6] {
        let s = f64::from(self.size);
        [0.0, -1.0, -1.0, 0.0, s, s]
    }
}

#[derive(Clone, Debug)]
pub struct GestureNormalizer {
    transform: CaptureTransform,
    pinch_threshold_px: f64,
}

impl GestureNormalizer {
    pub fn new(config: &CaptchaConfig) -> Self {
        GestureNormalizer {
            transform: CaptureTransform::new(config.puzzle_size),
            pinch_threshold_px: config.pinch_threshold_px,
        }
    }

    pub fn transform(&self) -> CaptureTransform {
        self.transform
    }

    pub fn is_pinching(&self, hand: &HandLandmarks) -> bool {
        hand.index_tip.distance(hand.thumb_tip) < self.pinch_threshold_px
    }

    /// `None` when no hand was detected this tick.
    pub fn normalize(&self, hand: Option<&HandLandmarks>) -> Option<GestureSample> {
        let hand = hand?;
        Some(GestureSample {
            position: self.transform.to_display(hand.index_tip),
            pinching: self.is_pinching(hand),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> GestureNormalizer {
        GestureNormalizer::new(&CaptchaConfig::default())
    }

    #[test]
    fn maps_capture_to_display() {
        let t = CaptureTransform::new(600);
        assert_eq!(t.to_display(Point::new(100, 250)), Point::new(250, 500));
        assert_eq!(t.to_capture(Point::new(250, 500)), Point::new(100, 250));
    }

    #[test]
    fn canvas_matrix_agrees_with_point_mapping() {
        let t = CaptureTransform::new(600);
        let [a, b, c, d, e, f] = t.canvas_matrix();
        let p = Point::new(37, 412);
        let (x, y) = (f64::from(p.x), f64::from(p.y));
        let mapped = t.to_display(p);
        assert_eq!(a * x + c * y + e, f64::from(mapped.x));
        assert_eq!(b * x + d * y + f, f64::from(mapped.y));
    }

    fn apply(m: [f64; 6], (x, y): (f64, f64)) -> (f64, f64) {
        let [a, b, c, d, e, f] = m;
        (a * x + c * y + e, b * x + d * y + f)
    }

    #[test]
    fn capture_then_display_is_a_mirror() {
        let t = CaptureTransform::new(600);
        for p in [(0.0, 0.0), (100.0, 250.0), (600.0, 17.0)] {
            let shown = apply(t.canvas_matrix(), apply(t.capture_matrix(), p));
            assert_eq!(shown, (600.0 - p.0, p.1));
        }
    }

    #[test]
    fn pinch_threshold_is_strict() {
        let n = normalizer();
        let close = HandLandmarks {
            index_tip: Point::new(100, 100),
            thumb_tip: Point::new(100, 139),
        };
        let edge = HandLandmarks {
            index_tip: Point::new(100, 100),
            thumb_tip: Point::new(100, 140),
        };
        assert!(n.is_pinching(&close));
        assert!(!n.is_pinching(&edge));
    }

    #[test]
    fn no_hand_yields_no_sample() {
        assert_eq!(normalizer().normalize(None), None);
    }

    #[test]
    fn sample_uses_index_tip_in_display_space() {
        let hand = HandLandmarks {
            index_tip: Point::new(300, 60),
            thumb_tip: Point::new(310, 70),
        };
        let s = normalizer().normalize(Some(&hand)).unwrap();
        assert_eq!(s.position, Point::new(60, 300));
        assert!(s.pinching);
    }

    #[test]
    fn from_normalized_scales_and_truncates() {
        let mut set = vec![NormalizedLandmark::default(); landmarks::COUNT];
        set[landmarks::INDEX_FINGER_TIP] = NormalizedLandmark {
            x: 0.5,
            y: 0.2549,
            z: 0.0,
        };
        set[landmarks::THUMB_TIP] = NormalizedLandmark {
            x: 0.25,
            y: 0.75,
            z: 0.0,
        };
        let hand = HandLandmarks::from_normalized(&set, 600, 600).unwrap();
        assert_eq!(hand.index_tip, Point::new(300, 152));
        assert_eq!(hand.thumb_tip, Point::new(150, 450));
    }

    #[test]
    fn off_frame_landmarks_are_clamped() {
        let mut set = vec![NormalizedLandmark::default(); landmarks::COUNT];
        set[landmarks::INDEX_FINGER_TIP] = NormalizedLandmark {
            x: 1e30,
            y: f32::NAN,
            z: 0.0,
        };
        set[landmarks::THUMB_TIP] = NormalizedLandmark {
            x: -1e30,
            y: f32::INFINITY,
            z: 0.0,
        };
        let hand = HandLandmarks::from_normalized(&set, 600, 600).unwrap();
        assert_eq!(hand.index_tip, Point::new(1200, 0));
        assert_eq!(hand.thumb_tip, Point::new(-600, 1200));

        let s = normalizer().normalize(Some(&hand)).unwrap();
        assert_eq!(s.position, Point::new(0, -600));
        assert!(!s.pinching);
    }

    #[test]
    fn extreme_capture_points_do_not_overflow() {
        let n = normalizer();
        let hand = HandLandmarks {
            index_tip: Point::new(i32::MIN, i32::MAX),
            thumb_tip: Point::new(i32::MAX, i32::MIN),
        };
        let s = n.normalize(Some(&hand)).unwrap();
        assert_eq!(s.position, Point::new(i32::MAX, i32::MAX));
        assert!(!s.pinching);
        assert_eq!(n.transform().to_capture(Point::new(0, i32::MIN)).x, i32::MAX);
    }

    #[test]
    fn from_normalized_rejects_partial_sets() {
        let set = vec![NormalizedLandmark::default(); 5];
        assert!(HandLandmarks::from_normalized(&set, 600, 600).is_none());
    }
}
