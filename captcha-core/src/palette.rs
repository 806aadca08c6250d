use crate::models::Rgb;

// Fixed palette of the verification screen.
pub const COLOR_BG: Rgb = Rgb::new(10, 15, 20);
pub const COLOR_ACCENT: Rgb = Rgb::new(0, 240, 255);
pub const COLOR_SUCCESS: Rgb = Rgb::new(50, 255, 50);
pub const COLOR_FAIL: Rgb = Rgb::new(255, 50, 50);
pub const COLOR_TEXT: Rgb = Rgb::new(220, 220, 220);
pub const COLOR_GRID_LINES: Rgb = Rgb::new(0, 0, 0);
pub const COLOR_HAND_CURSOR: Rgb = Rgb::new(255, 0, 255);
pub const COLOR_MUTED: Rgb = Rgb::new(50, 50, 50);
pub const COLOR_HINT: Rgb = Rgb::new(150, 150, 150);
pub const COLOR_BLACK: Rgb = Rgb::new(0, 0, 0);

/// Colour of the hand reticle: green while pinching, magenta otherwise.
pub fn hand_cursor_color(pinching: bool) -> Rgb {
    if pinching { COLOR_SUCCESS } else { COLOR_HAND_CURSOR }
}
