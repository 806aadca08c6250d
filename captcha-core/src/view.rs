//! Read-only helpers for drawing a [`PuzzleState`].

use serde::Serialize;

use crate::constants::{TIMER_BAR_WIDTH, TIMER_WARN_SECS};
use crate::game::{Phase, PuzzleState};
use crate::models::{Point, Rect, Rgb};
use crate::palette::{COLOR_ACCENT, COLOR_FAIL, COLOR_SUCCESS, COLOR_TEXT};

/// Sidebar language.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    En,
    Zh,
}

impl Lang {
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("zh") || s == "zh-CN" || s == "zh_TW" {
            Lang::Zh
        } else {
            Lang::En
        }
    }
}

/// One grid cell: where it is drawn and which part of the frame it shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileView {
    pub position: usize,
    pub source: Rect,
    pub dest: Rect,
}

/// Source rect of tile `value` in an un-scrambled frame.
pub fn tile_rect(value: usize, grid_size: usize, tile: i32) -> Rect {
    let col = (value % grid_size) as i32;
    let row = (value / grid_size) as i32;
    Rect::new(col * tile, row * tile, tile, tile)
}

/// Cells to draw in place. The cell being dragged is skipped; see
/// [`floating_tile`].
pub fn tiles(state: &PuzzleState) -> Vec<TileView> {
    let n = state.config().grid_size;
    let tile = state.config().tile_size();
    let dragged = state
        .selection()
        .filter(|s| s.dragging)
        .map(|s| s.index);
    state
        .permutation()
        .as_slice()
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != dragged)
        .map(|(i, &v)| TileView {
            position: i,
            source: tile_rect(v, n, tile),
            dest: tile_rect(i, n, tile),
        })
        .collect()
}

/// The dragged tile, anchored to the cursor by the pick-up offset.
pub fn floating_tile(state: &PuzzleState) -> Option<TileView> {
    let sel = state.selection().filter(|s| s.dragging)?;
    let cursor = state.cursor()?.position;
    let n = state.config().grid_size;
    let tile = state.config().tile_size();
    let value = state.permutation().source_of(sel.index)?;
    let origin = cursor - sel.offset;
    Some(TileView {
        position: sel.index,
        source: tile_rect(value, n, tile),
        dest: Rect::new(origin.x, origin.y, tile, tile),
    })
}

pub fn status_label(phase: Phase, lang: Lang) -> &'static str {
    match (phase, lang) {
        (Phase::Menu, Lang::En) => "WAITING",
        (Phase::Playing, Lang::En) => "SCANNING...",
        (Phase::Won, Lang::En) => "VERIFIED",
        (Phase::Lost, Lang::En) => "DENIED",
        (Phase::Menu, Lang::Zh) => "等待中",
        (Phase::Playing, Lang::Zh) => "扫描中...",
        (Phase::Won, Lang::Zh) => "已验证",
        (Phase::Lost, Lang::Zh) => "已拒绝",
    }
}

pub fn status_color(phase: Phase) -> Rgb {
    match phase {
        Phase::Won => COLOR_SUCCESS,
        Phase::Lost => COLOR_FAIL,
        _ => COLOR_TEXT,
    }
}

/// `None` while playing: the button is hidden.
pub fn button_label(phase: Phase, lang: Lang) -> Option<&'static str> {
    match (phase, lang) {
        (Phase::Playing, _) => None,
        (Phase::Menu, Lang::En) => Some("INITIATE"),
        (Phase::Menu, Lang::Zh) => Some("开始验证"),
        (_, Lang::En) => Some("RESET SYSTEM"),
        (_, Lang::Zh) => Some("重置系统"),
    }
}

/// Big overlay message once the session is over.
pub fn verdict_label(phase: Phase, lang: Lang) -> Option<(&'static str, Rgb)> {
    match (phase, lang) {
        (Phase::Won, Lang::En) => Some(("ACCESS GRANTED", COLOR_SUCCESS)),
        (Phase::Won, Lang::Zh) => Some(("允许访问", COLOR_SUCCESS)),
        (Phase::Lost, Lang::En) => Some(("ACCESS DENIED", COLOR_FAIL)),
        (Phase::Lost, Lang::Zh) => Some(("拒绝访问", COLOR_FAIL)),
        _ => None,
    }
}

pub fn header_lines(lang: Lang) -> [&'static str; 2] {
    match lang {
        Lang::En => ["SECURITY", "PROTOCOL"],
        Lang::Zh => ["安全", "协议"],
    }
}

pub fn input_mode_label(lang: Lang) -> &'static str {
    match lang {
        Lang::En => "INPUT: MOUSE + HAND",
        Lang::Zh => "输入：鼠标 + 手势",
    }
}

/// `MM:SS` countdown text.
pub fn timer_text(remaining_secs: u64) -> String {
    format!("{:02}:{:02}", remaining_secs / 60, remaining_secs % 60)
}

pub fn timer_color(remaining_secs: u64) -> Rgb {
    if remaining_secs < TIMER_WARN_SECS {
        COLOR_FAIL
    } else {
        COLOR_ACCENT
    }
}

/// Filled width of the timer bar.
pub fn timer_bar_fill(remaining_secs: u64, limit_secs: u64) -> i32 {
    if limit_secs == 0 {
        return 0;
    }
    let ratio = remaining_secs.min(limit_secs) as f64 / limit_secs as f64;
    (ratio * f64::from(TIMER_BAR_WIDTH)) as i32
}

/// Hover position for the button: the hand reticle wins when visible.
pub fn hover_point(state: &PuzzleState, pointer: Point) -> Point {
    state.hand().map(|h| h.position).unwrap_or(pointer)
}

pub fn button_hovered(state: &PuzzleState, pointer: Point) -> bool {
    state.config().button_rect().contains(hover_point(state, pointer))
}

/// Outcome summary handed to the host page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub phase: Phase,
    pub remaining_secs: u64,
    pub moves: u32,
    pub verified: bool,
}

impl StatusReport {
    pub fn from_state(state: &PuzzleState) -> Self {
        StatusReport {
            phase: state.phase(),
            remaining_secs: state.remaining_secs(),
            moves: state.moves(),
            verified: state.phase() == Phase::Won,
        }
    }
}
