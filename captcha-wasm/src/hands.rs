//! Hand landmarks from the host page.
//!
//! The page may install `window.captchaHands = { detect(canvas) }` (for
//! example backed by the MediaPipe hand landmarker). `detect` receives the
//! capture-space canvas and returns an array of hands, each an array of 21
//! `{x, y, z}` landmarks normalized to the canvas size, or `null`.

use captcha_core::gesture::NormalizedLandmark;
use captcha_core::{HandLandmarks, HandTracker};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use crate::camera::CameraFrame;

const HOOK_NAME: &str = "captchaHands";

pub struct PageHandTracker {
    window: Window,
    capture_size: i32,
    missing_logged: bool,
}

impl PageHandTracker {
    pub fn new(window: Window, capture_size: i32) -> Self {
        PageHandTracker {
            window,
            capture_size,
            missing_logged: false,
        }
    }

    fn detect_fn(&mut self) -> Option<(JsValue, js_sys::Function)> {
        let hook = js_sys::Reflect::get(&self.window, &JsValue::from_str(HOOK_NAME)).ok()?;
        let detect = js_sys::Reflect::get(&hook, &JsValue::from_str("detect"))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
        match detect {
            Some(f) => Some((hook, f)),
            None => {
                if !self.missing_logged {
                    self.missing_logged = true;
                    warn!("window.{HOOK_NAME}.detect not installed; hand input disabled");
                }
                None
            }
        }
    }
}

/// Parse the hook's return value; only the first hand is used.
pub fn parse_hands(json: &str, capture_size: i32) -> Option<HandLandmarks> {
    let hands: Option<Vec<Vec<NormalizedLandmark>>> = serde_json::from_str(json).ok()?;
    let first = hands?.into_iter().next()?;
    HandLandmarks::from_normalized(&first, capture_size, capture_size)
}

impl HandTracker<CameraFrame> for PageHandTracker {
    fn detect(&mut self, frame: &CameraFrame) -> Option<HandLandmarks> {
        let (hook, detect) = self.detect_fn()?;
        let result = match detect.call1(&hook, &frame.capture) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = ?e, "hand hook threw");
                return None;
            }
        };
        if result.is_null() || result.is_undefined() {
            return None;
        }
        let json = js_sys::JSON::stringify(&result).ok()?.as_string()?;
        parse_hands(&json, self.capture_size)
    }
}
