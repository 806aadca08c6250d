use captcha_core::Point;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent};

/// Convert client coordinates into canvas internal pixel coordinates so hit
/// testing works even if CSS scales the canvas element.
pub fn event_canvas_coords(e: &MouseEvent, cv: &HtmlCanvasElement) -> Point {
    let (x, y) = if let Some(el) = cv.dyn_ref::<web_sys::Element>() {
        let rect = el.get_bounding_client_rect();
        let x = (e.client_x() as f64 - rect.left()) * (cv.width() as f64) / rect.width().max(1.0);
        let y = (e.client_y() as f64 - rect.top()) * (cv.height() as f64) / rect.height().max(1.0);
        (x, y)
    } else {
        (e.offset_x() as f64, e.offset_y() as f64)
    };
    // Floor, not truncate, so a point just left of the canvas stays outside.
    Point::new(x.floor() as i32, y.floor() as i32)
}

/// Simple query string parser used at start-up.
pub fn get_query_param(search: &str, key: &str) -> Option<String> {
    let s = search.trim_start_matches('?');
    for pair in s.split('&') {
        let mut it = pair.splitn(2, '=');
        let k = it.next()?;
        let v = it.next().unwrap_or("");
        if k == key {
            return Some(url_decode(v));
        }
    }
    None
}

fn url_decode(s: &str) -> String {
    percent_encoding::percent_decode_str(s)
        .decode_utf8()
        .unwrap_or_else(|_| s.into())
        .to_string()
}

/// Seed for the shuffle RNG. `Math.random` is enough for a UX puzzle.
pub fn random_seed() -> u64 {
    let hi = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
    let lo = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
    (hi << 32) | lo
}
