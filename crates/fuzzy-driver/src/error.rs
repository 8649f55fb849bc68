// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for coprocessor driver operations

use fuzzy_model::FuzzyError;
use thiserror::Error;

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors that can occur while talking to the coprocessor
#[derive(Debug, Error)]
pub enum DriverError {
    /// Golden-model error (bad input, missing estimator, parse failure)
    #[error("Model error: {source}")]
    Model {
        /// Underlying model error
        #[from]
        source: FuzzyError,
    },

    /// Address not decoded by the register file
    #[error("Invalid register address 0x{addr:02X}")]
    InvalidRegister {
        /// Offending address
        addr: u8,
    },

    /// STATUS.valid never came up
    #[error("VALID timeout after {polls} STATUS polls ({waited_ms}ms)")]
    ValidTimeout {
        /// STATUS reads issued
        polls: u32,
        /// Polling budget in milliseconds
        waited_ms: u64,
    },

    /// Bus-level failure reported by a `RegisterBus` implementation
    #[error("Bus error: {reason}")]
    Bus {
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

impl DriverError {
    /// Create a bus error
    pub fn bus(reason: impl Into<String>) -> Self {
        Self::Bus {
            reason: reason.into(),
        }
    }
}
