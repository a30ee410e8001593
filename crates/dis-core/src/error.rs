//! Error types for the DIS stack

use thiserror::Error;

/// Core DIS errors
#[derive(Error, Debug)]
pub enum DisError {
    // Wire errors
    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Field {field} must be exactly {expected} bytes, got {actual}")]
    FieldLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    // Registry errors
    #[error("Record family {0} has no default decoder")]
    MissingDefaultDecoder(&'static str),

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DisError {
    /// Shorthand for a fixed-size field receiving the wrong number of bytes
    pub fn field_length(field: &'static str, expected: usize, actual: usize) -> Self {
        DisError::FieldLength {
            field,
            expected,
            actual,
        }
    }

    /// Whether the error was caused by malformed or truncated input
    pub fn is_wire_error(&self) -> bool {
        matches!(
            self,
            DisError::BufferTooShort { .. } | DisError::InvalidWireFormat(_)
        )
    }
}

/// Result type for DIS operations
pub type DisResult<T> = Result<T, DisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_error_classification() {
        assert!(DisError::BufferTooShort { expected: 12, actual: 3 }.is_wire_error());
        assert!(DisError::InvalidWireFormat("bad length".into()).is_wire_error());
        assert!(!DisError::field_length("marking", 11, 12).is_wire_error());
        assert!(!DisError::Transport("closed".into()).is_wire_error());
        assert!(!DisError::MissingDefaultDecoder("datum").is_wire_error());
    }

    #[test]
    fn test_field_length_message() {
        let err = DisError::field_length("marking", 11, 12);
        assert_eq!(
            err.to_string(),
            "Field marking must be exactly 11 bytes, got 12"
        );
    }
}
