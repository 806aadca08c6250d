//! Per-tick handoff: frame -> hand -> gesture -> cursor -> state.

use rand::Rng;
use tracing::{error, trace};
use web_time::Instant;

use crate::config::CaptchaConfig;
use crate::error::Result;
use crate::game::{GameEvent, PuzzleState};
use crate::gesture::{GestureNormalizer, HandLandmarks};
use crate::input::{InputUnifier, PointerState};

/// Produces the display-ready frame for a tick. An error means the device is
/// gone and the loop must stop.
pub trait FrameSupplier {
    type Frame;

    fn next_frame(&mut self) -> Result<Self::Frame>;
}

/// Finds at most one hand in a frame.
pub trait HandTracker<F> {
    fn detect(&mut self, frame: &F) -> Option<HandLandmarks>;
}

/// What a tick hands to the renderer.
#[derive(Debug)]
pub struct TickOutput<F> {
    pub frame: F,
    pub events: Vec<GameEvent>,
}

#[derive(Clone, Debug)]
pub struct TickPipeline {
    normalizer: GestureNormalizer,
    unifier: InputUnifier,
}

impl TickPipeline {
    pub fn new(config: &CaptchaConfig) -> Self {
        TickPipeline {
            normalizer: GestureNormalizer::new(config),
            unifier: InputUnifier::new(),
        }
    }

    pub fn normalizer(&self) -> &GestureNormalizer {
        &self.normalizer
    }

    /// Run one tick. State is only touched after input unification.
    pub fn tick<S, T, R>(
        &mut self,
        frames: &mut S,
        tracker: &mut T,
        pointer: &PointerState,
        state: &mut PuzzleState,
        now: Instant,
        rng: &mut R,
    ) -> Result<TickOutput<S::Frame>>
    where
        S: FrameSupplier,
        T: HandTracker<S::Frame>,
        R: Rng + ?Sized,
    {
        let frame = frames.next_frame().inspect_err(|err| {
            error!(%err, "frame supplier failed");
        })?;
        let landmarks = tracker.detect(&frame);
        let hand = self.normalizer.normalize(landmarks.as_ref());
        let cursor = self.unifier.unify(pointer, hand.as_ref());
        trace!(?cursor, hand = hand.is_some(), "input unified");
        let events = state.step(&cursor, hand.as_ref(), now, rng);
        Ok(TickOutput { frame, events })
    }
}
