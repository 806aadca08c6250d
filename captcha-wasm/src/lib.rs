use std::cell::RefCell;
use std::rc::Rc;

use captcha_core::constants::{TIMER_BAR_WIDTH, WINDOW_HEIGHT, WINDOW_WIDTH};
use captcha_core::palette::{
    COLOR_ACCENT, COLOR_BG, COLOR_BLACK, COLOR_FAIL, COLOR_GRID_LINES, COLOR_HINT, COLOR_MUTED,
    COLOR_TEXT, hand_cursor_color,
};
use captcha_core::view::{self, Lang, StatusReport, TileView};
use captcha_core::{CaptchaConfig, Phase, PuzzleState, Rect, TickPipeline};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{error, info};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent};
use web_time::Instant;

mod camera;
mod canvas;
mod hands;
mod logging;
mod state;
mod utils;

use crate::camera::{Camera, CameraFrame};
use crate::canvas::{circle, fill_rect, line, stroke_rect, text, text_centered};
use crate::hands::PageHandTracker;
use crate::state::{STATE, State};
use crate::utils::{event_canvas_coords, get_query_param, random_seed};

const FONT_HEADER: &str = "bold 28px Consolas, monospace";
const FONT_BODY: &str = "18px Consolas, monospace";
const FONT_BIG: &str = "bold 50px Consolas, monospace";

/// Tick interval slack so a 60 Hz display does not drop every other frame.
const PACING_SLACK_MS: f64 = 1.0;

fn init_canvas(
    document: &Document,
) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let cv = document
        .get_element_by_id("cv")
        .ok_or_else(|| JsValue::from_str("canvas #cv not found"))?
        .dyn_into::<HtmlCanvasElement>()?;
    cv.set_width(WINDOW_WIDTH as u32);
    cv.set_height(WINDOW_HEIGHT as u32);
    let ctx = cv
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context not available"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok((cv, ctx))
}

fn draw_notice(ctx: &CanvasRenderingContext2d, msg: &str, color: captcha_core::Rgb) {
    fill_rect(ctx, Rect::new(0, 0, WINDOW_WIDTH, WINDOW_HEIGHT), COLOR_BLACK);
    text_centered(
        ctx,
        msg,
        f64::from(WINDOW_WIDTH) / 2.0,
        f64::from(WINDOW_HEIGHT) / 2.0,
        FONT_BODY,
        color,
    );
}

fn blit(ctx: &CanvasRenderingContext2d, frame: &HtmlCanvasElement, t: &TileView) {
    let (s, d) = (t.source, t.dest);
    let _ = ctx.draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
        frame,
        s.x.into(),
        s.y.into(),
        s.w.into(),
        s.h.into(),
        d.x.into(),
        d.y.into(),
        d.w.into(),
        d.h.into(),
    );
}

fn draw_puzzle(state: &State, frame: &HtmlCanvasElement) {
    let ctx = &state.ctx;
    let puzzle = &state.puzzle;
    let size = puzzle.config().puzzle_size;

    if puzzle.phase() == Phase::Menu {
        // Unscrambled preview under a dark veil.
        let _ = ctx.draw_image_with_html_canvas_element(frame, 0.0, 0.0);
        ctx.set_global_alpha(100.0 / 255.0);
        fill_rect(ctx, Rect::new(0, 0, size, size), COLOR_BLACK);
        ctx.set_global_alpha(1.0);
        return;
    }

    for t in view::tiles(puzzle) {
        blit(ctx, frame, &t);
        stroke_rect(ctx, t.dest, COLOR_GRID_LINES, 1.0);
    }
    if let Some(t) = view::floating_tile(puzzle) {
        blit(ctx, frame, &t);
        stroke_rect(ctx, t.dest, COLOR_ACCENT, 3.0);
    }
}

fn draw_sidebar(state: &State) {
    let ctx = &state.ctx;
    let puzzle = &state.puzzle;
    let config = puzzle.config();
    let x0 = f64::from(config.puzzle_size);
    let h = f64::from(config.window_height());
    let lang = state.lang;
    let phase = puzzle.phase();

    fill_rect(
        ctx,
        Rect::new(config.puzzle_size, 0, config.sidebar_width, config.window_height()),
        COLOR_BG,
    );
    line(ctx, (x0, 0.0), (x0, h), COLOR_ACCENT, 2.0);

    let [title, subtitle] = view::header_lines(lang);
    text(ctx, title, x0 + 20.0, 30.0, FONT_HEADER, COLOR_ACCENT);
    text(ctx, subtitle, x0 + 20.0, 60.0, FONT_HEADER, COLOR_ACCENT);

    let status = if lang == Lang::Zh { "状态：" } else { "STATUS:" };
    text(ctx, status, x0 + 20.0, 120.0, FONT_BODY, COLOR_TEXT);
    text(
        ctx,
        view::status_label(phase, lang),
        x0 + 20.0,
        145.0,
        FONT_BODY,
        view::status_color(phase),
    );
    text(ctx, view::input_mode_label(lang), x0 + 20.0, 175.0, FONT_BODY, COLOR_HINT);

    if phase == Phase::Playing {
        let remaining = puzzle.remaining_secs();
        let color = view::timer_color(remaining);
        text(ctx, &view::timer_text(remaining), x0 + 20.0, 200.0, FONT_BIG, color);
        let bar_x = config.puzzle_size + 25;
        fill_rect(ctx, Rect::new(bar_x, 260, TIMER_BAR_WIDTH, 10), COLOR_MUTED);
        let fill = view::timer_bar_fill(remaining, config.time_limit.as_secs());
        fill_rect(ctx, Rect::new(bar_x, 260, fill, 10), color);
    }

    if let Some(label) = view::button_label(phase, lang) {
        let btn = config.button_rect();
        let hover = view::button_hovered(puzzle, state.pointer.position());
        fill_rect(ctx, btn, if hover { COLOR_ACCENT } else { COLOR_MUTED });
        stroke_rect(ctx, btn, COLOR_ACCENT, 2.0);
        text_centered(
            ctx,
            label,
            f64::from(btn.x) + f64::from(btn.w) / 2.0,
            f64::from(btn.y) + f64::from(btn.h) / 2.0,
            FONT_BODY,
            if hover { COLOR_BLACK } else { COLOR_TEXT },
        );
    }
}

fn draw_overlays(state: &State) {
    let ctx = &state.ctx;
    let puzzle = &state.puzzle;
    let size = puzzle.config().puzzle_size;

    if let Some(hand) = puzzle.hand() {
        let (hx, hy) = (f64::from(hand.position.x), f64::from(hand.position.y));
        let color = hand_cursor_color(hand.pinching);
        circle(ctx, hx, hy, 10.0, color, 2.0);
        circle(ctx, hx, hy, 4.0, color, 0.0);
        if hand.pinching {
            circle(ctx, hx, hy, 20.0, color, 1.0);
        }
    }

    if let Some((msg, color)) = view::verdict_label(puzzle.phase(), state.lang) {
        stroke_rect(ctx, Rect::new(0, 0, size, size), color, 5.0);
        let mid = f64::from(size) / 2.0;
        text_centered(ctx, msg, mid, mid, FONT_BIG, color);
    }
}

fn draw(state: &State) {
    let w = f64::from(state.puzzle.config().window_width());
    let h = f64::from(state.puzzle.config().window_height());
    state.ctx.clear_rect(0.0, 0.0, w, h);
    fill_rect(&state.ctx, state.puzzle.config().puzzle_rect(), COLOR_BLACK);
    if let Some(frame) = &state.frame {
        draw_puzzle(state, &frame.display);
    }
    draw_sidebar(state);
    draw_overlays(state);
}

/// One pipeline tick. Returns `false` once the loop must stop.
fn tick(state: &mut State) -> bool {
    let pointer = state.pointer.take_tick();
    let out = state.pipeline.tick(
        &mut state.camera,
        &mut state.hands,
        &pointer,
        &mut state.puzzle,
        Instant::now(),
        &mut state.rng,
    );
    match out {
        Ok(out) => {
            state.frame = Some(out.frame);
            draw(state);
            true
        }
        Err(err) => {
            error!(%err, "stopping verification loop");
            state.camera.release();
            state.running = false;
            draw_notice(&state.ctx, "CAMERA OFFLINE", COLOR_FAIL);
            false
        }
    }
}

fn start_animation(state: Rc<RefCell<State>>) {
    type RafClosure = Closure<dyn FnMut(f64)>;
    let f: Rc<RefCell<Option<RafClosure>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let keep_going = {
            let mut guard = state.borrow_mut();
            let s = &mut *guard;
            if !s.running {
                false
            } else {
                let interval_ms = s.puzzle.config().tick_interval().as_secs_f64() * 1000.0;
                let due = s
                    .last_tick_ms
                    .is_none_or(|last| ts - last + PACING_SLACK_MS >= interval_ms);
                if due {
                    s.last_tick_ms = Some(ts);
                    tick(s)
                } else {
                    true
                }
            }
        };
        if !keep_going {
            return;
        }
        if let (Some(window), Some(cb)) = (web_sys::window(), f.borrow().as_ref()) {
            let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let (Some(window), Some(cb)) = (web_sys::window(), g.borrow().as_ref()) {
        let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

fn attach_ui(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    {
        let st = state.clone();
        let mousedown = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            if e.button() != 0 {
                return;
            }
            let mut s = st.borrow_mut();
            let pt = event_canvas_coords(&e, &s.canvas);
            s.pointer.press(pt);
        }));
        state
            .borrow()
            .canvas
            .add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
        mousedown.forget();
    }
    {
        let st = state.clone();
        let mousemove = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let mut s = st.borrow_mut();
            let pt = event_canvas_coords(&e, &s.canvas);
            s.pointer.moved(pt);
        }));
        state
            .borrow()
            .window
            .add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
        mousemove.forget();
    }
    {
        let st = state.clone();
        let mouseup = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            if e.button() != 0 {
                return;
            }
            let mut s = st.borrow_mut();
            let pt = event_canvas_coords(&e, &s.canvas);
            s.pointer.release(pt);
        }));
        state
            .borrow()
            .window
            .add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
        mouseup.forget();
    }
    {
        let st = state.clone();
        let blur = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            st.borrow_mut().pointer.cancel();
        }));
        state
            .borrow()
            .window
            .add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }
    {
        let st = state.clone();
        let pagehide = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let mut s = st.borrow_mut();
            s.running = false;
            s.camera.release();
        }));
        state
            .borrow()
            .window
            .add_event_listener_with_callback("pagehide", pagehide.as_ref().unchecked_ref())?;
        pagehide.forget();
    }
    Ok(())
}

/// Outcome for the host page, as JSON.
#[wasm_bindgen]
pub fn captcha_status() -> String {
    STATE.with(|st| {
        let report = match st.borrow().as_ref() {
            Some(s) => StatusReport::from_state(&s.borrow().puzzle),
            None => StatusReport::from_state(&PuzzleState::new(CaptchaConfig::default())),
        };
        serde_json::to_string(&report).unwrap_or_else(|_| "{}".to_string())
    })
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let search = window.location().search().unwrap_or_default();
    logging::init(logging::parse_level(get_query_param(&search, "log").as_deref()));
    let lang = get_query_param(&search, "lang")
        .map(|l| Lang::parse(&l))
        .unwrap_or_default();

    let config = CaptchaConfig::default();
    config
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let (canvas, ctx) = init_canvas(&document)?;
    draw_notice(&ctx, "WAITING FOR CAMERA...", COLOR_TEXT);

    wasm_bindgen_futures::spawn_local(async move {
        let pipeline = TickPipeline::new(&config);
        let transform = pipeline.normalizer().transform();
        let camera = match Camera::open(&window, &document, transform).await {
            Ok(c) => c,
            Err(err) => {
                error!(error = ?err, "camera could not be opened");
                draw_notice(&ctx, "CAMERA UNAVAILABLE", COLOR_FAIL);
                return;
            }
        };
        let hands = PageHandTracker::new(window.clone(), config.puzzle_size);
        let state = Rc::new(RefCell::new(State {
            window,
            canvas,
            ctx,
            camera,
            hands,
            pipeline,
            puzzle: PuzzleState::new(config),
            pointer: Default::default(),
            rng: SmallRng::seed_from_u64(random_seed()),
            lang,
            frame: None::<CameraFrame>,
            last_tick_ms: None,
            running: true,
        }));
        STATE.with(|st| st.replace(Some(state.clone())));
        if let Err(err) = attach_ui(state.clone()) {
            error!(error = ?err, "failed to attach input listeners");
            return;
        }
        info!("live verification ready");
        start_animation(state);
    });
    Ok(())
}
