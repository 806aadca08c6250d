use std::time::Duration;

use crate::constants::{
    FPS, GRID_SIZE, PINCH_THRESHOLD_PX, TIME_LIMIT_SECS, UI_WIDTH, VIDEO_SIZE,
};
use crate::error::{CaptchaError, Result};
use crate::models::Rect;

/// Gameplay geometry and limits. `Default` yields the shipped constants;
/// other values exist for tests and alternative layouts.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptchaConfig {
    /// Tiles per side.
    pub grid_size: usize,
    /// Side length of the square puzzle area (display pixels).
    pub puzzle_size: i32,
    pub sidebar_width: i32,
    pub time_limit: Duration,
    /// Pinch threshold in capture pixels.
    pub pinch_threshold_px: f64,
    pub tick_rate_hz: u32,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            puzzle_size: VIDEO_SIZE,
            sidebar_width: UI_WIDTH,
            time_limit: Duration::from_secs(TIME_LIMIT_SECS),
            pinch_threshold_px: PINCH_THRESHOLD_PX,
            tick_rate_hz: FPS,
        }
    }
}

impl CaptchaConfig {
    pub fn validate(&self) -> Result<()> {
        if self.grid_size < 2 {
            return Err(invalid(format!("grid size {} is below 2", self.grid_size)));
        }
        if self.puzzle_size < self.grid_size as i32 {
            return Err(invalid(format!(
                "puzzle size {} cannot hold {} tiles per side",
                self.puzzle_size, self.grid_size
            )));
        }
        if self.time_limit.is_zero() {
            return Err(invalid("time limit is zero"));
        }
        if !self.pinch_threshold_px.is_finite() || self.pinch_threshold_px <= 0.0 {
            return Err(invalid("pinch threshold must be positive"));
        }
        if self.tick_rate_hz == 0 {
            return Err(invalid("tick rate is zero"));
        }
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        self.grid_size * self.grid_size
    }

    pub fn tile_size(&self) -> i32 {
        self.puzzle_size / self.grid_size as i32
    }

    pub fn window_width(&self) -> i32 {
        self.puzzle_size + self.sidebar_width
    }

    pub fn window_height(&self) -> i32 {
        self.puzzle_size
    }

    pub fn puzzle_rect(&self) -> Rect {
        Rect::new(0, 0, self.puzzle_size, self.puzzle_size)
    }

    /// Start / reset button, anchored to the bottom of the sidebar.
    pub fn button_rect(&self) -> Rect {
        Rect::new(self.puzzle_size + 25, self.window_height() - 100, 200, 50)
    }

    /// Minimum spacing between ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }
}

fn invalid(reason: impl Into<String>) -> CaptchaError {
    CaptchaError::InvalidConfig {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_layout() {
        let c = CaptchaConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.tile_size(), 150);
        assert_eq!(c.cell_count(), 16);
        assert_eq!(c.window_width(), 850);
        assert_eq!(c.button_rect(), Rect::new(625, 500, 200, 50));
    }

    #[test]
    fn rejects_degenerate_values() {
        let c = CaptchaConfig {
            grid_size: 1,
            ..CaptchaConfig::default()
        };
        assert!(matches!(c.validate(), Err(CaptchaError::InvalidConfig { .. })));

        let c = CaptchaConfig {
            time_limit: Duration::ZERO,
            ..CaptchaConfig::default()
        };
        assert!(c.validate().is_err());

        let c = CaptchaConfig {
            pinch_threshold_px: f64::NAN,
            ..CaptchaConfig::default()
        };
        assert!(c.validate().is_err());
    }
}
