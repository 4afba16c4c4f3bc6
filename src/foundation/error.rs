/// Convenience result type used across bootreel.
pub type IntroResult<T> = Result<T, IntroError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum IntroError {
    /// Invalid animation configuration. Fatal to the run, never retried.
    #[error("config error: {0}")]
    Config(String),

    /// A single frame failed to render or composite.
    #[error("render failure at frame {frame}: {message}")]
    Render {
        /// Offending frame index.
        frame: u64,
        /// Human-readable cause.
        message: String,
    },

    /// Sequence generation was cancelled before `frame` was emitted.
    #[error("sequence cancelled before frame {frame}")]
    Cancelled {
        /// First frame index that was not emitted.
        frame: u64,
    },

    /// The downstream frame sink rejected a frame or failed to finish.
    #[error("sink error: {0}")]
    Sink(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntroError {
    /// Build an [`IntroError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build an [`IntroError::Render`] value for `frame`.
    pub fn render(frame: u64, msg: impl Into<String>) -> Self {
        Self::Render {
            frame,
            message: msg.into(),
        }
    }

    /// Build an [`IntroError::Sink`] value.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// Frame index attached to this error, if any.
    pub fn frame(&self) -> Option<u64> {
        match self {
            Self::Render { frame, .. } | Self::Cancelled { frame } => Some(*frame),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
