use thiserror::Error;

pub type Result<T> = std::result::Result<T, CaptchaError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptchaError {
    /// The camera stopped producing frames. Ends the tick loop.
    #[error("camera unavailable: {reason}")]
    DeviceUnavailable { reason: String },

    /// A grid index computed from input fell outside the grid.
    #[error("grid index {index} out of bounds (len {len})")]
    OutOfBoundsIndex { index: usize, len: usize },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl CaptchaError {
    pub fn device(reason: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            reason: reason.into(),
        }
    }

    /// Only a lost camera ends the session; everything else is handled in-tick.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DeviceUnavailable { .. })
    }
}
