//! Pointer and hand input merged into one cursor per tick.
//!
//! Priority: pointer activity (button edge or held) > hand > idle pointer.
//! The two channels are never blended within a tick.

use serde::Serialize;

use crate::gesture::GestureSample;
use crate::models::Point;

/// Device that produced a [`CursorSample`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    Pointer,
    Hand,
}

/// Pointer device state for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerState {
    pub position: Point,
    /// Primary button went down during the tick.
    pub pressed: bool,
    /// Primary button went up during the tick.
    pub released: bool,
    pub held: bool,
}

impl PointerState {
    pub fn idle(position: Point) -> Self {
        PointerState {
            position,
            ..PointerState::default()
        }
    }

    /// True when the pointer owns this tick.
    pub fn is_active(&self) -> bool {
        self.pressed || self.released || self.held
    }
}

/// Accumulates asynchronous pointer events between ticks.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    position: Point,
    pressed: bool,
    released: bool,
    held: bool,
}

impl PointerTracker {
    pub fn moved(&mut self, position: Point) {
        self.position = position;
    }

    pub fn press(&mut self, position: Point) {
        self.position = position;
        self.pressed = true;
        self.held = true;
    }

    pub fn release(&mut self, position: Point) {
        self.position = position;
        self.released = true;
        self.held = false;
    }

    /// Button state lost outside our control (window blur and the like).
    pub fn cancel(&mut self) {
        if self.held {
            self.released = true;
        }
        self.held = false;
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Snapshot for the current tick; clears the per-tick edges.
    pub fn take_tick(&mut self) -> PointerState {
        let state = PointerState {
            position: self.position,
            pressed: self.pressed,
            released: self.released,
            held: self.held,
        };
        self.pressed = false;
        self.released = false;
        state
    }
}

/// The authoritative input for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CursorSample {
    pub position: Point,
    pub click_started: bool,
    pub click_released: bool,
    pub held: bool,
    pub source: InputSource,
}

/// Remembers the previous pinch so a continuous hand signal yields edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PinchEdgeDetector {
    previous: bool,
}

impl PinchEdgeDetector {
    /// Returns `(started, released)` for the new pinch state.
    pub fn update(&mut self, pinching: bool) -> (bool, bool) {
        let started = pinching && !self.previous;
        let released = !pinching && self.previous;
        self.previous = pinching;
        (started, released)
    }

    pub fn previous(&self) -> bool {
        self.previous
    }
}

#[derive(Clone, Debug, Default)]
pub struct InputUnifier {
    pinch: PinchEdgeDetector,
}

impl InputUnifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn was_pinching(&self) -> bool {
        self.pinch.previous()
    }

    pub fn unify(&mut self, pointer: &PointerState, hand: Option<&GestureSample>) -> CursorSample {
        // Edges are tracked whenever the hand is visible, even on ticks the
        // pointer owns, so a later hand tick does not fire a stale edge.
        let hand_edges = hand.map(|h| (h, self.pinch.update(h.pinching)));

        if pointer.is_active() {
            return CursorSample {
                position: pointer.position,
                click_started: pointer.pressed,
                click_released: pointer.released,
                held: pointer.held,
                source: InputSource::Pointer,
            };
        }

        match hand_edges {
            Some((h, (started, released))) => CursorSample {
                position: h.position,
                click_started: started,
                click_released: released,
                held: h.pinching,
                source: InputSource::Hand,
            },
            None => CursorSample {
                position: pointer.position,
                click_started: false,
                click_released: false,
                held: false,
                source: InputSource::Pointer,
            },
        }
    }
}
