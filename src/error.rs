//! Error types and handling for Shrinkset

use thiserror::Error;

/// Result type alias for Shrinkset operations
pub type Result<T> = std::result::Result<T, ShrinkError>;

/// Main error type for Shrinkset operations
#[derive(Debug, Error)]
pub enum ShrinkError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image decode or encode errors
    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    /// Source pixel buffer rejected by the resampler
    #[error("Resample buffer error: {0}")]
    BufferError(#[from] fast_image_resize::ImageBufferError),

    /// Resampling failed
    #[error("Resample error: {0}")]
    ResampleError(#[from] fast_image_resize::ResizeError),

    /// Resampling algorithm name outside the supported set
    #[error("Unknown resampling algorithm: {name}")]
    UnknownAlgorithm { name: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Worker pool or runtime errors
    #[error("System error: {message}")]
    SystemError { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerdeError(String),
}

impl ShrinkError {
    /// Create a new unknown-algorithm error
    pub fn unknown_algorithm<S: Into<String>>(name: S) -> Self {
        Self::UnknownAlgorithm { name: name.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new system error
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::SystemError {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (processing can continue)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Per-file errors: the owning folder task logs them and moves on
            Self::IoError(_)
            | Self::ImageError(_)
            | Self::BufferError(_)
            | Self::ResampleError(_) => true,

            // An unsupported algorithm skips the folder but not the run
            Self::UnknownAlgorithm { .. } => true,

            // Setup errors should stop processing
            Self::ConfigError { .. } | Self::SystemError { .. } | Self::SerdeError(_) => false,
        }
    }
}

// Convert serde errors to our error type
impl From<toml::de::Error> for ShrinkError {
    fn from(err: toml::de::Error) -> Self {
        Self::SerdeError(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for ShrinkError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerdeError(format!("YAML parsing error: {}", err))
    }
}
