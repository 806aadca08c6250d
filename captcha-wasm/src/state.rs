use std::cell::RefCell;
use std::rc::Rc;

use captcha_core::view::Lang;
use captcha_core::{PointerTracker, PuzzleState, TickPipeline};
use rand::rngs::SmallRng;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::camera::{Camera, CameraFrame};
use crate::hands::PageHandTracker;

/// Runtime state stored behind an `Rc<RefCell<_>>` so it can be shared
/// across the WASM callbacks.
pub struct State {
    pub window: Window,
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub camera: Camera,
    pub hands: PageHandTracker,
    pub pipeline: TickPipeline,
    pub puzzle: PuzzleState,
    pub pointer: PointerTracker,
    pub rng: SmallRng,
    pub lang: Lang,
    /// Frame shown by the last tick.
    pub frame: Option<CameraFrame>,
    /// `requestAnimationFrame` timestamp of the last tick (ms).
    pub last_tick_ms: Option<f64>,
    pub running: bool,
}

/// Thread local storage for the single runtime state instance.
thread_local! {
    pub static STATE: RefCell<Option<Rc<RefCell<State>>>> = const { RefCell::new(None) };
}
