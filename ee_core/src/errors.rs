//! # Error Types
//!
//! Structured error types for ee_core. Calculations fail with exactly one
//! kind of error, [`CalcError::InvalidInput`], which carries every violation
//! found in the input rather than stopping at the first one. The remaining
//! variants belong to the ambient layers (library exchange, config files).
//!
//! ## Example
//!
//! ```rust
//! use ee_core::errors::{CalcError, CalcResult};
//!
//! fn check_voltage(voltage: f64) -> CalcResult<()> {
//!     if voltage <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "voltage",
//!             voltage.to_string(),
//!             "Voltage must be greater than 0.",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! let err = check_voltage(-5.0).unwrap_err();
//! assert_eq!(err.error_code(), "INVALID_INPUT");
//! assert_eq!(err.violations().len(), 1);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for ee_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Input field name (e.g. "cable_od_mm")
    pub field: String,
    /// Raw value as received, or empty when the field was absent
    pub value: String,
    /// Human-readable reason (e.g. "Cable OD must be greater than 0.")
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Violation {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.reason.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Structured error type for calculation operations.
///
/// Each variant provides specific context about what went wrong,
/// enabling programmatic error handling by callers.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// One or more input fields are absent, non-numeric, or out of range
    #[error("Invalid input: {}", join_violations(.violations))]
    InvalidInput { violations: Vec<Violation> },

    /// A replacement library snapshot breaks a table invariant
    #[error("Invalid library: {reason}")]
    InvalidLibrary { reason: String },

    /// Module id not recognized
    #[error("Unknown module: {module}")]
    UnknownModule { module: String },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// File I/O error (config or library files)
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },
}

impl CalcError {
    /// Create an InvalidInput error holding a single violation
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            violations: vec![Violation::new(field, value, reason)],
        }
    }

    /// Create an InvalidLibrary error
    pub fn invalid_library(reason: impl Into<String>) -> Self {
        CalcError::InvalidLibrary {
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl ToString) -> Self {
        CalcError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Violations carried by an InvalidInput error (empty for other kinds)
    pub fn violations(&self) -> &[Violation] {
        match self {
            CalcError::InvalidInput { violations } => violations,
            _ => &[],
        }
    }

    /// Flat list of messages, one per violation, for the `errors` envelope
    pub fn messages(&self) -> Vec<String> {
        match self {
            CalcError::InvalidInput { violations } => {
                violations.iter().map(|v| v.reason.clone()).collect()
            }
            other => vec![other.to_string()],
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::InvalidLibrary { .. } => "INVALID_LIBRARY",
            CalcError::UnknownModule { .. } => "UNKNOWN_MODULE",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::FileError { .. } => "FILE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("voltage", "-5", "Voltage must be greater than 0.");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::invalid_library("empty catalog").error_code(), "INVALID_LIBRARY");
        assert_eq!(CalcError::serialization("bad json").error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_messages_list_every_violation() {
        let error = CalcError::InvalidInput {
            violations: vec![
                Violation::new("kva", "", "Transformer kVA must be greater than 0."),
                Violation::new("percent_z", "0", "%Z must be greater than 0."),
            ],
        };
        assert_eq!(
            error.messages(),
            vec![
                "Transformer kVA must be greater than 0.".to_string(),
                "%Z must be greater than 0.".to_string(),
            ]
        );
        assert!(error.to_string().contains("%Z must be greater than 0."));
    }

    #[test]
    fn test_non_input_errors_have_no_violations() {
        let error = CalcError::file_error("read", "/tmp/lib.json", "not found");
        assert!(error.violations().is_empty());
        assert_eq!(error.messages().len(), 1);
    }
}
