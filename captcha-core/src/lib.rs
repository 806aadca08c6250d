//! Interaction core of the live tile CAPTCHA: the camera frame is cut into a
//! grid, scrambled, and must be restored by dragging tiles with a pointer or
//! a pinching hand before the clock runs out.
//!
//! Nothing in this crate touches a device. Camera, hand tracking and drawing
//! plug in through [`pipeline::FrameSupplier`], [`pipeline::HandTracker`] and
//! the read-only [`view`] helpers.

pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod gesture;
pub mod input;
pub mod models;
pub mod palette;
pub mod permutation;
pub mod pipeline;
pub mod view;

pub use config::CaptchaConfig;
pub use error::{CaptchaError, Result};
pub use game::{GameClock, GameEvent, Phase, PuzzleState, Selection};
pub use gesture::{CaptureTransform, GestureNormalizer, GestureSample, HandLandmarks};
pub use input::{CursorSample, InputSource, InputUnifier, PointerState, PointerTracker};
pub use models::{Point, Rect, Rgb};
pub use permutation::GridPermutation;
pub use pipeline::{FrameSupplier, HandTracker, TickOutput, TickPipeline};
