// SPDX-License-Identifier: AGPL-3.0-only

//! Backend abstraction for coprocessor access
//!
//! One interface over "call the golden model directly" and "drive the
//! register protocol", so capture and parity tooling do not care which one
//! produced a result.

use crate::error::Result;
use fuzzy_model::{DtSource, RuleMode};
use std::fmt::Debug;

/// Coprocessor backend trait - unified interface for model and register access
pub trait CoprocessorBackend: Debug + Send {
    /// Select the rule grid and the dT source for subsequent runs
    ///
    /// # Errors
    ///
    /// Returns error if the mode write fails.
    fn configure(&mut self, mode: RuleMode, source: DtSource) -> Result<()>;

    /// Arm the derivative estimator with `t` as its baseline (INIT)
    ///
    /// # Errors
    ///
    /// Returns error if the INIT cannot be issued.
    fn init(&mut self, t: i8) -> Result<()>;

    /// Run one evaluation and return G
    ///
    /// `dt` is ignored when the estimator supplies dT.
    ///
    /// # Errors
    ///
    /// Returns error if the evaluation fails (bus error, VALID timeout).
    fn run(&mut self, t: i8, dt: i8) -> Result<u8>;

    /// Get backend type for logging
    fn backend_type(&self) -> BackendType;

    /// Currently configured rule grid
    fn rule_mode(&self) -> RuleMode;

    /// Currently configured dT source
    fn dt_source(&self) -> DtSource;
}

/// Backend type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Direct golden-model calls
    Model,

    /// Register protocol over a `RegisterBus`
    Register,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model => write!(f, "Model (golden reference)"),
            Self::Register => write!(f, "Register protocol"),
        }
    }
}
