//! Error types for the fitting engine.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or processing failed
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Landmark detector backend failed or returned an unusable mesh
    #[error("Detector error: {0}")]
    Detector(String),

    /// Remote measurement service failed
    #[error("Measurement service error: {0}")]
    Measurement(String),

    /// Frame catalog source failed or returned malformed records
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Capture session could not be serialized or restored
    #[error("Session error: {0}")]
    Session(String),

    /// Camera device failure
    #[error("Camera error: {0}")]
    Camera(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
