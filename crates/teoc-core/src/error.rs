//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Allocation error: {0}")]
    Allocation(String),

    #[error("No capacity: {0}")]
    NoCapacity(String),

    #[error("Invalid offset: index {index} is outside the wrap domain of range {range}")]
    InvalidOffset { index: i64, range: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(err: std::collections::TryReserveError) -> Self {
        Error::Allocation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_offset_message() {
        let err = Error::InvalidOffset {
            index: 600,
            range: 256,
        };
        assert_eq!(
            err.to_string(),
            "Invalid offset: index 600 is outside the wrap domain of range 256"
        );
    }

    #[test]
    fn test_reserve_failure_maps_to_allocation() {
        let mut buf: Vec<u8> = Vec::new();
        let err: Error = buf.try_reserve_exact(usize::MAX).unwrap_err().into();
        assert!(matches!(err, Error::Allocation(_)));
    }
}
