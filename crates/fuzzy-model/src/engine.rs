// SPDX-License-Identifier: AGPL-3.0-only

//! Per-sample coordinator (`top_step`).
//!
//! Selects the dT source, fuzzifies both inputs, fires the rule grid,
//! aggregates and defuzzifies. Each call is one deterministic pass; the only
//! state involved is the caller-owned [`DerivativeEstimator`].

use crate::aggregate::{aggregate, Sums};
use crate::config::CoprocessorConfig;
use crate::defuzz::defuzz;
use crate::error::{checked_s8, FuzzyError, Result};
use crate::estimator::DerivativeEstimator;
use crate::membership::Degrees;
use crate::rules::{fire, RuleMode, RuleWeights};
use fuzzy_chip::regs::ctrl;
use tracing::debug;

/// Where dT comes from (CTRL `dt_mode`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DtSource {
    /// `dt_mode = 0`: the DT_IN register.
    #[default]
    External,
    /// `dt_mode = 1`: the on-chip estimator, fed with T.
    Estimator,
}

impl DtSource {
    /// Decode the `dt_mode` bit of a CTRL byte.
    pub const fn from_ctrl(bits: u8) -> Self {
        if bits & ctrl::DT_MODE != 0 {
            Self::Estimator
        } else {
            Self::External
        }
    }

    /// CTRL bit for this source.
    pub const fn ctrl_bits(self) -> u8 {
        match self {
            Self::External => 0,
            Self::Estimator => ctrl::DT_MODE,
        }
    }
}

impl std::fmt::Display for DtSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::External => write!(f, "external"),
            Self::Estimator => write!(f, "estimator"),
        }
    }
}

/// Output of one evaluation, with the datapath internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleResult {
    /// Crisp output, percent.
    pub g: u8,
    /// T as evaluated.
    pub t: i8,
    /// dT as evaluated (external or estimated).
    pub dt: i8,
    /// External dT: always `true`. Estimator: the `was_valid` flag.
    pub dt_valid: bool,
    /// Degrees of T.
    pub mu_t: Degrees,
    /// Degrees of dT.
    pub mu_dt: Degrees,
    /// Rule strengths before rule-mode gating.
    pub weights: RuleWeights,
    /// Aggregator outputs after gating.
    pub sums: Sums,
}

/// Evaluate one sample.
///
/// `t` is always range-checked. `dt_external` is only read, and only
/// range-checked, when `source` is [`DtSource::External`].
///
/// # Errors
///
/// - `InvalidInput` if `t` (or the used `dt_external`) is outside `-128..=127`
/// - `Configuration` if `source` is [`DtSource::Estimator`] and no estimator
///   is supplied
pub fn evaluate(
    t: i32,
    dt_external: i32,
    config: &CoprocessorConfig,
    mode: RuleMode,
    source: DtSource,
    estimator: Option<&mut DerivativeEstimator>,
) -> Result<SampleResult> {
    let t = checked_s8("T", t)?;
    let (dt, dt_valid) = match source {
        DtSource::External => (checked_s8("dT", dt_external)?, true),
        DtSource::Estimator => {
            let est = estimator.ok_or_else(|| {
                FuzzyError::configuration("dt_mode=1 requires a derivative estimator")
            })?;
            est.step(t)
        }
    };
    Ok(run(t, dt, dt_valid, config, mode))
}

/// Evaluate one sample with an external dT. Inputs are already s8, so this
/// cannot fail.
#[must_use]
pub fn infer(t: i8, dt: i8, config: &CoprocessorConfig, mode: RuleMode) -> SampleResult {
    run(t, dt, true, config, mode)
}

fn run(t: i8, dt: i8, dt_valid: bool, config: &CoprocessorConfig, mode: RuleMode) -> SampleResult {
    let mu_t = config.temperature().fuzzify(t);
    let mu_dt = config.derivative().fuzzify(dt);
    let weights = fire(&mu_t, &mu_dt);
    let sums = aggregate(mode, &weights, config.consequents());
    let g = defuzz(sums.sum_weight, sums.sum_weighted_output);

    debug!(
        "T={} dT={} ({}) -> S_w={} S_wg={} G={}",
        t, dt, mode, sums.sum_weight, sums.sum_weighted_output, g
    );

    SampleResult {
        g,
        t,
        dt,
        dt_valid,
        mu_t,
        mu_dt,
        weights,
        sums,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::EstimatorParams;

    #[test]
    fn golden_points() {
        let cfg = CoprocessorConfig::default();
        let r = infer(0, 0, &cfg, RuleMode::Full);
        assert_eq!(r.g, 50);
        assert_eq!(r.sums, Sums { sum_weight: 32_767, sum_weighted_output: 16_384 });

        assert_eq!(infer(-64, -10, &cfg, RuleMode::Full).g, 100);
        assert_eq!(infer(64, 10, &cfg, RuleMode::Full).g, 0);

        let r = infer(-128, 127, &cfg, RuleMode::Full);
        assert_eq!(r.g, 0);
        assert_eq!(r.sums, Sums::default());
    }

    #[test]
    fn diagnostics_are_filled() {
        let cfg = CoprocessorConfig::default();
        let r = infer(10, 5, &cfg, RuleMode::Full);
        assert_eq!(r.mu_t, Degrees { neg: 0, zero: 12_288, pos: 10_240 });
        assert_eq!(r.mu_dt, Degrees { neg: 0, zero: 16_384, pos: 0 });
        assert_eq!(r.sums, Sums { sum_weight: 22_528, sum_weighted_output: 11_264 });
        assert_eq!(r.g, 50);
        assert!(r.dt_valid);

        // Corner mode gates the sums but not the reported weights
        let c = infer(10, 5, &cfg, RuleMode::Corners);
        assert_eq!(c.weights, r.weights);
        assert_eq!(c.g, 0);
    }

    #[test]
    fn out_of_range_inputs_rejected() {
        let cfg = CoprocessorConfig::default();
        let e = evaluate(128, 0, &cfg, RuleMode::Full, DtSource::External, None);
        assert!(matches!(e, Err(FuzzyError::InvalidInput { name: "T", value: 128 })));
        let e = evaluate(0, -129, &cfg, RuleMode::Full, DtSource::External, None);
        assert!(matches!(e, Err(FuzzyError::InvalidInput { name: "dT", value: -129 })));
    }

    #[test]
    fn estimator_source_requires_estimator() {
        let cfg = CoprocessorConfig::default();
        let e = evaluate(0, 0, &cfg, RuleMode::Full, DtSource::Estimator, None);
        assert!(matches!(e, Err(FuzzyError::Configuration { .. })));
    }

    #[test]
    fn estimator_source_ignores_external_dt() {
        let cfg = CoprocessorConfig::default();
        let mut est = DerivativeEstimator::new(EstimatorParams::default());
        est.init_pulse(0);
        let r = evaluate(0, 999, &cfg, RuleMode::Full, DtSource::Estimator, Some(&mut est)).unwrap();
        assert_eq!(r.dt, 0);
        assert!(!r.dt_valid);
        assert_eq!(r.g, 50);
        let r = evaluate(0, 999, &cfg, RuleMode::Full, DtSource::Estimator, Some(&mut est)).unwrap();
        assert!(r.dt_valid);
    }

    #[test]
    fn external_source_ignores_estimator() {
        let cfg = CoprocessorConfig::default();
        let mut est = DerivativeEstimator::default();
        est.init_pulse(0);
        let before = est.state();
        let r = evaluate(64, 10, &cfg, RuleMode::Full, DtSource::External, Some(&mut est)).unwrap();
        assert_eq!(r.g, 0);
        assert_eq!(est.state(), before);
    }

    #[test]
    fn repeated_evaluation_is_identical() {
        let cfg = CoprocessorConfig::symmetric();
        let a = evaluate(-37, 22, &cfg, RuleMode::Full, DtSource::External, None).unwrap();
        let b = evaluate(-37, 22, &cfg, RuleMode::Full, DtSource::External, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn dt_source_ctrl_bits() {
        assert_eq!(DtSource::from_ctrl(DtSource::Estimator.ctrl_bits()), DtSource::Estimator);
        assert_eq!(DtSource::from_ctrl(ctrl::REG_MODE), DtSource::External);
    }
}
