//! Error handling module for VExport

use thiserror::Error;

/// Main error type for VExport operations
#[derive(Error, Debug)]
pub enum ExportError {
    /// Project document is missing, malformed, or fails validation
    #[error("Invalid project format: {message}")]
    InvalidProjectFormat { message: String },

    /// A media asset referenced by the project could not be resolved
    #[error("Media not found: {path}")]
    MediaNotFound { path: String },

    /// The engine timeline could not be opened for reading
    #[error("Failed to open timeline: {message}")]
    TimelineOpenFailed { message: String },

    /// Requested codec is not available in the engine
    #[error("Unsupported codec: {codec}")]
    UnsupportedCodec { codec: String },

    /// Output file could not be created or opened for writing
    #[error("Failed to open output file: {message}")]
    OutputOpenFailed { message: String },

    /// A composited frame could not be fetched from the timeline
    #[error("Failed to read frame {frame}: {message}")]
    FrameReadFailed { frame: i64, message: String },

    /// A frame could not be encoded or written to the output
    #[error("Failed to write frame {frame}: {message}")]
    FrameWriteFailed { frame: i64, message: String },

    /// Configuration file error
    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },

    /// Engine-level failure with no more specific classification
    #[error("Engine error: {message}")]
    EngineError { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ExportError {
    /// Process exit status for this error kind
    ///
    /// Every failure is fatal at this layer; the exit code identifies which
    /// stage failed (load, timeline-open, writer-open, or the frame loop).
    pub fn exit_code(&self) -> i32 {
        match self {
            ExportError::InvalidProjectFormat { .. } => 2,
            ExportError::MediaNotFound { .. } => 3,
            ExportError::TimelineOpenFailed { .. } => 4,
            ExportError::UnsupportedCodec { .. } => 5,
            ExportError::OutputOpenFailed { .. } => 6,
            ExportError::FrameReadFailed { .. } => 7,
            ExportError::FrameWriteFailed { .. } => 8,
            _ => 1,
        }
    }
}

/// Result type alias for VExport operations
pub type ExportResult<T> = std::result::Result<T, ExportError>;
