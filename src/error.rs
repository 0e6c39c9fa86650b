//! Error types for the measurement pipeline.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The capture device could not be opened at startup
    #[error("Video device {0} is unavailable")]
    DeviceUnavailable(i32),

    /// Frames could not be read from an opened device
    #[error("Capture error: {0}")]
    Capture(String),

    /// A frame handed to the pipeline was empty or had an unusable layout
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// A still image could not be decoded
    #[error("Image load error: {0}")]
    ImageLoad(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
