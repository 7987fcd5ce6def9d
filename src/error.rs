//! Error types and handling for meterlink
//!
//! Every fallible operation in the gateway returns [`MeterLinkError`]. The
//! variants mirror the failure taxonomy of the pipeline: transport failures
//! are retried and degrade the snapshot, capacity failures abort a single
//! send, parse failures abort a single inbound decode.

use thiserror::Error;

/// Result type alias for meterlink operations
pub type Result<T> = std::result::Result<T, MeterLinkError>;

/// Main error type for meterlink
#[derive(Debug, Error)]
pub enum MeterLinkError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Modbus connection or read failures
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Timeout errors
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Encoded payload does not fit the target buffer
    #[error("Capacity error: payload needs {required} bytes, buffer holds {capacity}")]
    Capacity { required: usize, capacity: usize },

    /// Malformed inbound message
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Integer property value outside its accepted range
    #[error("Out of range: {field} - {message}")]
    OutOfRange { field: String, message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl MeterLinkError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        MeterLinkError::Config {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        MeterLinkError::Transport {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        MeterLinkError::Timeout {
            message: message.into(),
        }
    }

    /// Create a new capacity error
    pub fn capacity(required: usize, capacity: usize) -> Self {
        MeterLinkError::Capacity { required, capacity }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        MeterLinkError::Parse {
            message: message.into(),
        }
    }

    /// Create a new out-of-range error
    pub fn out_of_range<S: Into<String>>(field: S, message: S) -> Self {
        MeterLinkError::OutOfRange {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        MeterLinkError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        MeterLinkError::Io {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for MeterLinkError {
    fn from(err: std::io::Error) -> Self {
        MeterLinkError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for MeterLinkError {
    fn from(err: serde_yaml::Error) -> Self {
        MeterLinkError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MeterLinkError {
    fn from(err: serde_json::Error) -> Self {
        MeterLinkError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = MeterLinkError::config("test config error");
        assert!(matches!(err, MeterLinkError::Config { .. }));

        let err = MeterLinkError::transport("test transport error");
        assert!(matches!(err, MeterLinkError::Transport { .. }));

        let err = MeterLinkError::parse("bad token");
        assert!(matches!(err, MeterLinkError::Parse { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = MeterLinkError::config("test error");
        assert_eq!(format!("{}", err), "Configuration error: test error");

        let err = MeterLinkError::capacity(130, 129);
        assert_eq!(
            format!("{}", err),
            "Capacity error: payload needs 130 bytes, buffer holds 129"
        );

        let err = MeterLinkError::out_of_range("telemetryFrequencySecs", "must be positive");
        assert_eq!(
            format!("{}", err),
            "Out of range: telemetryFrequencySecs - must be positive"
        );
    }
}
