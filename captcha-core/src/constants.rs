/// Application-wide numeric constants.
/// Values are expressed in display pixels unless noted otherwise.
pub const VIDEO_SIZE: i32 = 600;
/// Width of the side panel to the right of the puzzle area.
pub const UI_WIDTH: i32 = 250;
pub const WINDOW_WIDTH: i32 = VIDEO_SIZE + UI_WIDTH;
pub const WINDOW_HEIGHT: i32 = VIDEO_SIZE;
/// Tiles per row and per column.
pub const GRID_SIZE: usize = 4;
pub const TILE_SIZE: i32 = VIDEO_SIZE / GRID_SIZE as i32;
/// Seconds allowed to solve the puzzle.
pub const TIME_LIMIT_SECS: u64 = 60;
/// Fingertip to thumb tip distance below which the hand counts as pinching
/// (capture pixels).
pub const PINCH_THRESHOLD_PX: f64 = 40.0;
/// Target ticks per second.
pub const FPS: u32 = 60;
/// Remaining seconds below which the timer turns red.
pub const TIMER_WARN_SECS: u64 = 10;
/// Sidebar timer bar width.
pub const TIMER_BAR_WIDTH: i32 = 200;
