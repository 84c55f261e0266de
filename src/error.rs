// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the post-processing library.

use std::fmt;

/// Result type alias for post-processing operations.
pub type Result<T> = std::result::Result<T, PostprocessError>;

/// Main error type for the post-processing library.
#[derive(Debug)]
pub enum PostprocessError {
    /// Input buffer does not match the expected shape.
    InvalidInput(String),
    /// Wrapped `std::io::Error` (label file loading).
    Io(std::io::Error),
}

impl fmt::Display for PostprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for PostprocessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<std::io::Error> for PostprocessError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PostprocessError::InvalidInput("test".to_string());
        assert_eq!(err.to_string(), "Invalid input: test");

        let err = PostprocessError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "IO error: gone");
    }

    #[test]
    fn test_error_source() {
        let err = PostprocessError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(std::error::Error::source(&err).is_some());

        let err = PostprocessError::InvalidInput("test".to_string());
        assert!(std::error::Error::source(&err).is_none());
    }
}
