// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for golden-model operations

use thiserror::Error;

/// Result type alias for golden-model operations
pub type Result<T> = std::result::Result<T, FuzzyError>;

/// Errors that can occur while configuring or driving the model
#[derive(Debug, Error)]
pub enum FuzzyError {
    /// An external-facing input does not fit its register width
    #[error("Invalid input {name}={value}: expected signed 8-bit (-128..=127)")]
    InvalidInput {
        /// Input name (`T`, `dT`, ...)
        name: &'static str,
        /// Offending value
        value: i64,
    },

    /// The requested evaluation cannot run with the supplied state
    #[error("Configuration error: {reason}")]
    Configuration {
        /// Reason for failure
        reason: String,
    },

    /// Trapezoid corners out of order
    #[error("Invalid threshold: expected a <= b <= c <= d, got ({a}, {b}, {c}, {d})")]
    InvalidThreshold {
        /// Left foot
        a: i8,
        /// Left shoulder
        b: i8,
        /// Right shoulder
        c: i8,
        /// Right foot
        d: i8,
    },

    /// Consequent singleton above 100%
    #[error("Invalid consequent #{index}: {value}% (expected 0..=100)")]
    InvalidConsequent {
        /// Row-major rule index
        index: usize,
        /// Offending percentage
        value: u8,
    },

    /// Malformed batch or capture file
    #[error("Parse error at line {line}: {reason}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Reason for failure
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

impl FuzzyError {
    /// Create an invalid input error
    pub fn invalid_input(name: &'static str, value: impl Into<i64>) -> Self {
        Self::InvalidInput {
            name,
            value: value.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }
}

/// Narrow an external input to s8 or fail with [`FuzzyError::InvalidInput`].
///
/// # Errors
///
/// Returns `InvalidInput` if `value` is outside `-128..=127`.
pub fn checked_s8(name: &'static str, value: impl Into<i64>) -> Result<i8> {
    let value = value.into();
    i8::try_from(value).map_err(|_| FuzzyError::invalid_input(name, value))
}
