use std::fmt;

/// Top-level error type for the wavesurf public API.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Media-type string has no `/`-delimited subtype. Non-fatal: callers
    /// fall back to a default extension hint.
    UnrecognizedMediaType(String),
    /// Malformed data URI or undecodable base64 payload.
    InvalidPayload(String),
    /// No linked decoder handles this container.
    UnsupportedFormat(String),
    /// Truncated or corrupt audio stream.
    CorruptStream(String),
    /// The decoded buffer is shorter than one analysis window.
    InsufficientSamples { needed: usize, got: usize },
    /// The entire power grid is silent and cannot be normalized.
    DegenerateSpectrum,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::UnrecognizedMediaType(s) => {
                write!(f, "unrecognized media type: {:?}", s)
            }
            PipelineError::InvalidPayload(msg) => write!(f, "invalid payload: {}", msg),
            PipelineError::UnsupportedFormat(msg) => write!(f, "unsupported format: {}", msg),
            PipelineError::CorruptStream(msg) => write!(f, "corrupt audio stream: {}", msg),
            PipelineError::InsufficientSamples { needed, got } => write!(
                f,
                "insufficient samples: need at least {} for one window, got {}",
                needed, got
            ),
            PipelineError::DegenerateSpectrum => {
                write!(f, "degenerate spectrum: all power values are zero")
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// Convenience alias so callers can write `Result<T>` instead of
/// `Result<T, PipelineError>`.
pub type Result<T> = std::result::Result<T, PipelineError>;
