use std::collections::VecDeque;
use std::time::Duration;

use captcha_core::view::{StatusReport, floating_tile};
use captcha_core::{
    CaptchaConfig, CaptchaError, FrameSupplier, GameEvent, HandLandmarks, HandTracker,
    InputSource, Phase, Point, PointerState, PointerTracker, PuzzleState, TickPipeline,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use web_time::Instant;

/// Hands out numbered frames until it runs dry, then reports a lost camera.
struct ScriptedCamera {
    remaining: u32,
    served: u32,
}

impl ScriptedCamera {
    fn new(frames: u32) -> Self {
        ScriptedCamera {
            remaining: frames,
            served: 0,
        }
    }
}

impl FrameSupplier for ScriptedCamera {
    type Frame = u32;

    fn next_frame(&mut self) -> captcha_core::Result<u32> {
        if self.remaining == 0 {
            return Err(CaptchaError::device("stream ended"));
        }
        self.remaining -= 1;
        self.served += 1;
        Ok(self.served)
    }
}

/// Replays one detection per frame.
#[derive(Default)]
struct ScriptedHands {
    script: VecDeque<Option<HandLandmarks>>,
    seen: Vec<u32>,
}

impl HandTracker<u32> for ScriptedHands {
    fn detect(&mut self, frame: &u32) -> Option<HandLandmarks> {
        self.seen.push(*frame);
        self.script.pop_front().flatten()
    }
}

/// Hand whose index tip lands on `display` after the capture transform.
fn hand_at(display: Point, pinching: bool) -> HandLandmarks {
    let index_tip = Point::new(600 - display.y, display.x);
    let thumb_tip = if pinching {
        Point::new(index_tip.x + 10, index_tip.y)
    } else {
        Point::new(index_tip.x + 120, index_tip.y)
    };
    HandLandmarks {
        index_tip,
        thumb_tip,
    }
}

struct Rig {
    camera: ScriptedCamera,
    hands: ScriptedHands,
    pipeline: TickPipeline,
    state: PuzzleState,
    rng: SmallRng,
    t0: Instant,
}

impl Rig {
    fn new() -> Self {
        let config = CaptchaConfig::default();
        Rig {
            camera: ScriptedCamera::new(1000),
            hands: ScriptedHands::default(),
            pipeline: TickPipeline::new(&config),
            state: PuzzleState::new(config),
            rng: SmallRng::seed_from_u64(2024),
            t0: Instant::now(),
        }
    }

    fn tick(&mut self, pointer: PointerState, at: Duration) -> Vec<GameEvent> {
        self.tick_result(pointer, at).unwrap()
    }

    fn tick_result(
        &mut self,
        pointer: PointerState,
        at: Duration,
    ) -> captcha_core::Result<Vec<GameEvent>> {
        let out = self.pipeline.tick(
            &mut self.camera,
            &mut self.hands,
            &pointer,
            &mut self.state,
            self.t0 + at,
            &mut self.rng,
        )?;
        Ok(out.events)
    }

    fn start(&mut self) {
        let mut tracker = PointerTracker::default();
        tracker.press(Point::new(700, 520));
        tracker.release(Point::new(700, 520));
        let ev = self.tick(tracker.take_tick(), Duration::ZERO);
        assert_eq!(ev, vec![GameEvent::Started { restart: false }]);
    }
}

#[test]
fn start_button_begins_shuffled_session() {
    let mut rig = Rig::new();
    assert_eq!(rig.state.phase(), Phase::Menu);
    rig.start();
    assert_eq!(rig.state.phase(), Phase::Playing);
    assert!(!rig.state.permutation().is_identity());
    assert_eq!(rig.state.clock().elapsed(rig.t0), Duration::ZERO);
}

#[test]
fn pinch_drag_swaps_tiles() {
    let mut rig = Rig::new();
    rig.start();
    let before = rig.state.permutation().as_slice().to_vec();

    rig.hands.script.extend([
        Some(hand_at(Point::new(10, 10), false)),
        Some(hand_at(Point::new(10, 10), true)),
        Some(hand_at(Point::new(90, 12), true)),
        Some(hand_at(Point::new(160, 10), false)),
    ]);
    let idle = PointerState::idle(Point::new(0, 0));
    let at = Duration::from_millis(100);

    assert!(rig.tick(idle, at).is_empty());
    assert_eq!(rig.tick(idle, at), vec![GameEvent::Selected { index: 0 }]);

    rig.tick(idle, at);
    let floating = floating_tile(&rig.state).unwrap();
    assert_eq!(floating.dest.origin(), Point::new(80, 2));
    assert_eq!(rig.state.cursor().unwrap().source, InputSource::Hand);

    assert_eq!(
        rig.tick(idle, at),
        vec![GameEvent::Swapped { from: 0, to: 1 }]
    );
    let after = rig.state.permutation().as_slice();
    assert_eq!(after[0], before[1]);
    assert_eq!(after[1], before[0]);
}

#[test]
fn pointer_drag_overrides_visible_hand() {
    let mut rig = Rig::new();
    rig.start();
    rig.hands
        .script
        .extend([Some(hand_at(Point::new(400, 400), true)); 2]);

    let mut tracker = PointerTracker::default();
    tracker.press(Point::new(10, 10));
    let ev = rig.tick(tracker.take_tick(), Duration::from_secs(1));
    assert_eq!(ev, vec![GameEvent::Selected { index: 0 }]);
    assert_eq!(rig.state.cursor().unwrap().position, Point::new(10, 10));

    tracker.release(Point::new(640, 10));
    let ev = rig.tick(tracker.take_tick(), Duration::from_secs(1));
    assert_eq!(ev, vec![GameEvent::DropAborted { from: 0 }]);
    assert!(rig.state.selection().is_none());
}

#[test]
fn zero_remaining_forces_lost_regardless_of_input() {
    let mut rig = Rig::new();
    rig.start();
    let mut tracker = PointerTracker::default();
    tracker.press(Point::new(10, 10));
    rig.tick(tracker.take_tick(), Duration::from_secs(59));

    tracker.release(Point::new(160, 10));
    let ev = rig.tick(tracker.take_tick(), Duration::from_secs(60));
    assert_eq!(ev, vec![GameEvent::TimedOut]);
    assert_eq!(rig.state.phase(), Phase::Lost);

    let report = StatusReport::from_state(&rig.state);
    assert_eq!(report.remaining_secs, 0);
    assert!(!report.verified);
}

#[test]
fn lost_camera_is_fatal() {
    let mut rig = Rig::new();
    rig.camera = ScriptedCamera::new(1);
    rig.start();
    let err = rig
        .tick_result(PointerState::idle(Point::default()), Duration::from_secs(1))
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(rig.state.phase(), Phase::Playing);
}

#[test]
fn tracker_sees_every_served_frame() {
    let mut rig = Rig::new();
    for i in 0..3 {
        rig.tick(
            PointerState::idle(Point::default()),
            Duration::from_millis(i * 16),
        );
    }
    assert_eq!(rig.hands.seen, vec![1, 2, 3]);
}
