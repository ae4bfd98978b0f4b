//! Error types for the taxi crate
//!
//! Every error here is raised while building the game or the agent. Once a
//! driver exists, stepping and training never fail.

use thiserror::Error;

/// Main error type for the taxi crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid grid: {message}")]
    InvalidGrid { message: String },

    #[error("unknown cell symbol '{symbol}' at row {row}, column {col}")]
    UnknownCellSymbol { symbol: char, row: usize, col: usize },

    #[error("invalid depot configuration: {message}")]
    InvalidDepots { message: String },

    #[error("position ({row}, {col}) is {reason}")]
    InvalidPosition {
        row: usize,
        col: usize,
        reason: &'static str,
    },

    #[error("{name} must be {expected}, got {value}")]
    InvalidHyperparameter {
        name: &'static str,
        expected: &'static str,
        value: f64,
    },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyperparameter_message() {
        let err = Error::InvalidHyperparameter {
            name: "learning_rate",
            expected: "in (0, 1]",
            value: 1.5,
        };
        assert_eq!(err.to_string(), "learning_rate must be in (0, 1], got 1.5");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("missing"));
    }
}
