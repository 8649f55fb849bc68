// SPDX-License-Identifier: AGPL-3.0-only

//! Model backend: direct golden-model calls.
//!
//! No register traffic at all. This is the reference side of every parity
//! comparison.

use crate::backend::{BackendType, CoprocessorBackend};
use crate::error::Result;
use fuzzy_model::{
    evaluate, CoprocessorConfig, DerivativeEstimator, DtSource, EstimatorParams, RuleMode,
    SampleResult,
};
use tracing::info;

/// Backend that evaluates the golden model in-process.
#[derive(Debug)]
pub struct ModelBackend {
    config: CoprocessorConfig,
    estimator: DerivativeEstimator,
    mode: RuleMode,
    source: DtSource,
    last: Option<SampleResult>,
}

impl ModelBackend {
    /// Create a backend for `config` with the RTL estimator parameters.
    pub fn new(config: CoprocessorConfig) -> Self {
        info!("Model backend: golden reference, no register traffic");
        Self {
            config,
            estimator: DerivativeEstimator::new(EstimatorParams::default()),
            mode: RuleMode::Full,
            source: DtSource::External,
            last: None,
        }
    }

    /// Replace the estimator parameters (resets the estimator).
    #[must_use]
    pub fn with_estimator(mut self, params: EstimatorParams) -> Self {
        self.estimator = DerivativeEstimator::new(params);
        self
    }

    /// Datapath internals of the last run.
    pub const fn last_result(&self) -> Option<&SampleResult> {
        self.last.as_ref()
    }

    /// Estimator state.
    pub const fn estimator(&self) -> &DerivativeEstimator {
        &self.estimator
    }
}

impl Default for ModelBackend {
    fn default() -> Self {
        Self::new(CoprocessorConfig::default())
    }
}

impl CoprocessorBackend for ModelBackend {
    fn configure(&mut self, mode: RuleMode, source: DtSource) -> Result<()> {
        self.mode = mode;
        self.source = source;
        Ok(())
    }

    fn init(&mut self, t: i8) -> Result<()> {
        self.estimator.init_pulse(t);
        Ok(())
    }

    fn run(&mut self, t: i8, dt: i8) -> Result<u8> {
        let r = evaluate(
            t.into(),
            dt.into(),
            &self.config,
            self.mode,
            self.source,
            Some(&mut self.estimator),
        )?;
        self.last = Some(r);
        Ok(r.g)
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Model
    }

    fn rule_mode(&self) -> RuleMode {
        self.mode
    }

    fn dt_source(&self) -> DtSource {
        self.source
    }
}
