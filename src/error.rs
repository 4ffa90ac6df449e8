//! Error types for the gesture control library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[cfg(feature = "opencv")]
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A landmark stream line or detector reply was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Landmark set had the wrong shape for the requested measurement
    #[error("Landmark error: {0}")]
    Landmarks(String),

    /// Pointer, button or wheel command failed
    #[error("Cursor control error: {0}")]
    CursorControl(String),

    /// Image or video sink operation failed
    #[error("Media error: {0}")]
    Media(String),

    /// External landmark detector process misbehaved
    #[error("Detector bridge error: {0}")]
    Bridge(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Application-specific error type (alias for main Error type)
pub type AppError = Error;

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Landmarks("expected 21 hand points, got 3".to_string());
        assert_eq!(err.to_string(), "Landmark error: expected 21 hand points, got 3");

        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.to_string().starts_with("IO error"));
    }
}
