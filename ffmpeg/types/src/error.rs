/*!
    Error types for the frame pipeline crates.
*/

use thiserror::Error as ThisError;

/**
    Error type for the frame pipeline crates.

    Transient signals (busy, need more input, end of stream) are not errors
    and live in [`Flow`](crate::Flow) instead.
*/
#[derive(Debug, ThisError)]
pub enum Error {
    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The source or session could not be opened.
    #[error("open failed: {message}")]
    Open { message: String },
    /// No decoder exists for the stream's codec, or the stream is not video.
    #[error("unsupported codec: {message}")]
    UnsupportedCodec { message: String },
    /// A lookup (e.g. best video stream) found nothing.
    #[error("not found: {message}")]
    NotFound { message: String },
    /// Malformed container data.
    #[error("invalid data: {message}")]
    Decode { message: String },
    /// The decoder failed; the session is unusable afterwards.
    #[error("fatal decode error: {message}")]
    FatalDecode { message: String },
    /// Frame geometry unusable for building a stage.
    #[error("invalid geometry: {message}")]
    InvalidGeometry { message: String },
    /// The filter graph could not be compiled.
    #[error("filter graph build failed: {message}")]
    GraphBuild { message: String },
    /// The filter graph failed at runtime; the stage is unusable afterwards.
    #[error("filter graph error: {message}")]
    Graph { message: String },
    /// The engine rejected the scaler's format pair.
    #[error("scaler init failed: {message}")]
    ScalerInit { message: String },
    /// A scaling conversion failed.
    #[error("conversion failed: {message}")]
    Conversion { message: String },
    /// A stage was called after an earlier unrecoverable failure.
    #[error("{stage} is unusable after an earlier failure")]
    Unusable { stage: &'static str },
}

impl Error {
    pub fn open(message: impl Into<String>) -> Self {
        Self::Open {
            message: message.into(),
        }
    }

    pub fn unsupported_codec(message: impl Into<String>) -> Self {
        Self::UnsupportedCodec {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn fatal_decode(message: impl Into<String>) -> Self {
        Self::FatalDecode {
            message: message.into(),
        }
    }

    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    pub fn graph_build(message: impl Into<String>) -> Self {
        Self::GraphBuild {
            message: message.into(),
        }
    }

    pub fn graph(message: impl Into<String>) -> Self {
        Self::Graph {
            message: message.into(),
        }
    }

    pub fn scaler_init(message: impl Into<String>) -> Self {
        Self::ScalerInit {
            message: message.into(),
        }
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }

    /**
        Returns true for errors that retrying with the same inputs can never fix:
        construction and configuration failures.
    */
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::Open { .. }
                | Self::UnsupportedCodec { .. }
                | Self::NotFound { .. }
                | Self::InvalidGeometry { .. }
                | Self::GraphBuild { .. }
                | Self::ScalerInit { .. }
        )
    }
}

/**
    Result type alias for the frame pipeline crates.
*/
pub type Result<T> = std::result::Result<T, Error>;
