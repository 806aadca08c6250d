use std::f64::consts::TAU;

use captcha_core::{Rect, Rgb};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

// Non-deprecated helpers to set canvas styles via property assignment.
pub fn set_fill_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("fillStyle"),
        &JsValue::from_str(color),
    );
}

pub fn set_stroke_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("strokeStyle"),
        &JsValue::from_str(color),
    );
}

pub fn fill_rect(ctx: &CanvasRenderingContext2d, r: Rect, color: Rgb) {
    set_fill_style(ctx, &color.css());
    ctx.fill_rect(r.x.into(), r.y.into(), r.w.into(), r.h.into());
}

pub fn stroke_rect(ctx: &CanvasRenderingContext2d, r: Rect, color: Rgb, width: f64) {
    set_stroke_style(ctx, &color.css());
    ctx.set_line_width(width);
    ctx.stroke_rect(r.x.into(), r.y.into(), r.w.into(), r.h.into());
}

pub fn line(ctx: &CanvasRenderingContext2d, from: (f64, f64), to: (f64, f64), color: Rgb, width: f64) {
    set_stroke_style(ctx, &color.css());
    ctx.set_line_width(width);
    ctx.begin_path();
    ctx.move_to(from.0, from.1);
    ctx.line_to(to.0, to.1);
    ctx.stroke();
}

/// Outline circle; `width == 0` fills it instead.
pub fn circle(ctx: &CanvasRenderingContext2d, cx: f64, cy: f64, r: f64, color: Rgb, width: f64) {
    ctx.begin_path();
    if ctx.arc(cx, cy, r, 0.0, TAU).is_err() {
        return;
    }
    if width > 0.0 {
        set_stroke_style(ctx, &color.css());
        ctx.set_line_width(width);
        ctx.stroke();
    } else {
        set_fill_style(ctx, &color.css());
        ctx.fill();
    }
}

/// Text anchored at its top-left corner.
pub fn text(ctx: &CanvasRenderingContext2d, s: &str, x: f64, y: f64, font: &str, color: Rgb) {
    ctx.set_font(font);
    ctx.set_text_align("left");
    ctx.set_text_baseline("top");
    set_fill_style(ctx, &color.css());
    let _ = ctx.fill_text(s, x, y);
}

/// Text centred on `(cx, cy)`.
pub fn text_centered(ctx: &CanvasRenderingContext2d, s: &str, cx: f64, cy: f64, font: &str, color: Rgb) {
    ctx.set_font(font);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    set_fill_style(ctx, &color.css());
    let _ = ctx.fill_text(s, cx, cy);
}
