// SPDX-License-Identifier: AGPL-3.0-only

//! Bit-exact derivative estimator (`dt_estimator.sv`).
//!
//! A single-pole IIR over successive T samples, evaluated at the RTL's bus
//! widths:
//!
//! ```text
//! delta_q8     = sxt9(T_cur - T_prev)
//! delta_q15    = sxt16(delta_q8 << 7)
//! delta_scaled = sxt16(delta_q15 >>> k_dt)
//! term1        = dT_prev_q15 * sxt24((256 - alpha) << 8)
//! term2        = delta_scaled * sxt24(alpha << 8)
//! dT_new_q15   = sxt16(sxt32(term1 + term2) >> 16)
//! clip         = clamp(dT_new_q15, ±(d_max << 7))
//! dT_out       = clip[14:7]
//! ```
//!
//! Every stage is computed in `i64` and folded back with
//! [`sign_extend`] so intermediate overflow wraps where the hardware wraps.
//!
//! # Output slice
//!
//! `dT_out` drops the low 7 bits of `clip`. Non-negative values shift
//! right; negative values add 127 first, so the result truncates toward
//! zero (`-1..=-127` in Q1.15 all read as 0). The asymmetry is what the
//! bitstream does and is kept.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──init_pulse──▶ Armed ──step──▶ Steady ──step──▶ Steady
//!        ▲                        ▲                │
//!        └──────── reset ─────────┴── init_pulse ──┘
//! ```
//!
//! [`DerivativeEstimator::step`] returns the validity flag from *before*
//! the call, so the first sample after an INIT is reported as not valid.
//! One estimator models one register bank; it is owned by exactly one
//! sample stream and is deliberately not `Sync`-shared.

use crate::error::{FuzzyError, Result};
use fuzzy_chip::fixed::{mask, sign_extend, width};
use fuzzy_chip::params::estimator;
use tracing::{info, trace, warn};

/// Estimator synthesis parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EstimatorParams {
    alpha: u8,
    k_dt: u8,
    d_max: u8,
}

impl EstimatorParams {
    /// Validate and build a parameter set.
    ///
    /// - `alpha`: Q8.8 gain, `alpha / 256` of the new delta enters the state.
    /// - `k_dt`: pre-scale shift, `0..=7`.
    /// - `d_max`: output clamp magnitude in Q7.0, `0..=127`.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if `k_dt` or `d_max` is out of range.
    pub fn new(alpha: u8, k_dt: u8, d_max: u8) -> Result<Self> {
        if k_dt > estimator::K_DT_MAX {
            return Err(FuzzyError::configuration(format!(
                "k_dt={k_dt} out of range (0..={})",
                estimator::K_DT_MAX
            )));
        }
        if d_max > estimator::D_MAX_LIMIT {
            return Err(FuzzyError::configuration(format!(
                "d_max={d_max} out of range (0..={})",
                estimator::D_MAX_LIMIT
            )));
        }
        Ok(Self { alpha, k_dt, d_max })
    }

    /// Filter gain.
    pub const fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Pre-scale shift.
    pub const fn k_dt(&self) -> u8 {
        self.k_dt
    }

    /// Output clamp magnitude.
    pub const fn d_max(&self) -> u8 {
        self.d_max
    }
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self {
            alpha: estimator::ALPHA,
            k_dt: estimator::K_DT,
            d_max: estimator::D_MAX,
        }
    }
}

/// Where the estimator is in its INIT/step cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EstimatorPhase {
    /// Reset values, no INIT seen yet.
    Uninitialized,
    /// INIT captured a baseline; no sample produced since.
    Armed,
    /// At least one sample produced since the last INIT.
    Steady,
}

impl std::fmt::Display for EstimatorPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Armed => write!(f, "armed"),
            Self::Steady => write!(f, "steady"),
        }
    }
}

/// Snapshot of the estimator register bank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EstimatorState {
    /// Previous T sample (Q7.0).
    pub t_prev: i8,
    /// Filter state (Q1.15 container, signed).
    pub dt_prev_q15: i16,
    /// `dt_valid` register.
    pub valid: bool,
}

/// Stateful derivative estimator.
#[derive(Debug, Clone)]
pub struct DerivativeEstimator {
    params: EstimatorParams,
    state: EstimatorState,
    phase: EstimatorPhase,
}

impl DerivativeEstimator {
    /// Create an estimator in its reset state.
    pub fn new(params: EstimatorParams) -> Self {
        info!(
            "Derivative estimator: alpha={}/256, k_dt={}, d_max={}",
            params.alpha, params.k_dt, params.d_max
        );
        Self {
            params,
            state: EstimatorState::default(),
            phase: EstimatorPhase::Uninitialized,
        }
    }

    /// Parameters this estimator was built with.
    pub const fn params(&self) -> &EstimatorParams {
        &self.params
    }

    /// Register bank snapshot.
    pub const fn state(&self) -> EstimatorState {
        self.state
    }

    /// Current lifecycle phase.
    pub const fn phase(&self) -> EstimatorPhase {
        self.phase
    }

    /// Return to the power-on values.
    pub fn reset(&mut self) {
        self.state = EstimatorState::default();
        self.phase = EstimatorPhase::Uninitialized;
    }

    /// INIT pulse: take `t` as the baseline, clear the filter, drop `valid`.
    pub fn init_pulse(&mut self, t: i8) {
        self.state = EstimatorState {
            t_prev: t,
            dt_prev_q15: 0,
            valid: false,
        };
        self.phase = EstimatorPhase::Armed;
        trace!("Estimator INIT at T={}", t);
    }

    /// Consume one T sample; returns `(dT_out, was_valid)`.
    pub fn step(&mut self, t: i8) -> (i8, bool) {
        if self.phase == EstimatorPhase::Uninitialized {
            warn!("Estimator stepped before INIT; running from reset values");
        }

        let clip = self.filter(t);
        let dt = output_slice(clip);

        // Stored in a 16-bit container; `filter` sign-extends to 16 bits.
        #[allow(clippy::cast_possible_truncation)]
        let dt_prev_q15 = clip as i16;
        let was_valid = self.state.valid;
        self.state = EstimatorState {
            t_prev: t,
            dt_prev_q15,
            valid: true,
        };
        self.phase = EstimatorPhase::Steady;

        trace!("Estimator T={} state={} dT={} was_valid={}", t, clip, dt, was_valid);
        (dt, was_valid)
    }

    // One IIR update; returns the clamped Q1.15 state.
    fn filter(&self, t: i8) -> i64 {
        let alpha = i64::from(self.params.alpha);

        let delta_q8 = sign_extend(i64::from(t) - i64::from(self.state.t_prev), width::DELTA);
        let delta_q15 = sign_extend(delta_q8 << 7, width::FRAC);
        let delta_scaled = sign_extend(delta_q15 >> self.params.k_dt, width::FRAC);

        let inv_a = mask(256 - alpha, width::FRAC);
        let term1 = i64::from(self.state.dt_prev_q15) * sign_extend(inv_a << 8, width::MULTIPLICAND);
        let term2 = delta_scaled * sign_extend(alpha << 8, width::MULTIPLICAND);
        let sum32 = sign_extend(term1 + term2, width::PRODUCT);
        let dt_new_q15 = sign_extend(sum32 >> 16, width::FRAC);

        let hi = sign_extend(i64::from(self.params.d_max) << 7, width::FRAC);
        sign_extend(dt_new_q15.clamp(-hi, hi), width::FRAC)
    }
}

impl Default for DerivativeEstimator {
    fn default() -> Self {
        Self::new(EstimatorParams::default())
    }
}

// clip[14:7], truncating toward zero for negative values.
#[allow(clippy::cast_possible_truncation)]
fn output_slice(clip: i64) -> i8 {
    let shifted = if clip < 0 { (clip + 127) >> 7 } else { clip >> 7 };
    sign_extend(mask(shifted, width::OUT), width::OUT) as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn est(alpha: u8, k_dt: u8, d_max: u8) -> DerivativeEstimator {
        DerivativeEstimator::new(EstimatorParams::new(alpha, k_dt, d_max).unwrap())
    }

    fn run(e: &mut DerivativeEstimator, samples: &[i8]) -> Vec<i8> {
        samples.iter().map(|&t| e.step(t).0).collect()
    }

    #[test]
    fn first_sample_after_init_is_not_valid() {
        let mut e = DerivativeEstimator::default();
        e.init_pulse(0);
        assert_eq!(e.step(0), (0, false));
        assert_eq!(e.step(0), (0, true));
        assert_eq!(e.step(0), (0, true));
    }

    #[test]
    fn max_gain_hits_clamp_both_ways() {
        let mut e = est(255, 0, 10);
        e.init_pulse(0);
        assert_eq!(e.step(20), (10, false));
        assert_eq!(e.step(0), (-10, true));
    }

    #[test]
    fn negative_output_truncates_toward_zero() {
        let mut e = est(255, 0, 127);
        e.init_pulse(0);
        assert_eq!(run(&mut e, &[-1, -2, -1, 127, -128]), vec![-1, -1, 0, 127, -127]);
    }

    #[test]
    fn unity_like_gain_tracks_delta() {
        let mut e = est(255, 0, 64);
        e.init_pulse(0);
        assert_eq!(
            run(&mut e, &[10, 20, 30, 30, 30, 0, -100, 100]),
            vec![9, 9, 9, 0, 0, -29, -64, 64]
        );
    }

    #[test]
    fn slow_filter_ramp() {
        let mut e = est(64, 3, 20);
        e.init_pulse(0);
        assert_eq!(run(&mut e, &[0, 16, 32, 48, 64, 80]), vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn default_filter_on_steady_ramp_stays_small() {
        let mut e = DerivativeEstimator::default();
        e.init_pulse(-40);
        for t in (-38..=40).step_by(2) {
            let (dt, _) = e.step(t);
            assert!((0..=1).contains(&dt), "dT={dt} at T={t}");
        }
    }

    #[test]
    fn phases() {
        let mut e = DerivativeEstimator::default();
        assert_eq!(e.phase(), EstimatorPhase::Uninitialized);
        e.init_pulse(5);
        assert_eq!(e.phase(), EstimatorPhase::Armed);
        assert_eq!(e.state(), EstimatorState { t_prev: 5, dt_prev_q15: 0, valid: false });
        e.step(7);
        assert_eq!(e.phase(), EstimatorPhase::Steady);
        assert!(e.state().valid);
        assert_eq!(e.state().t_prev, 7);
        e.init_pulse(7);
        assert_eq!(e.phase(), EstimatorPhase::Armed);
        assert!(!e.state().valid);
        e.reset();
        assert_eq!(e.phase(), EstimatorPhase::Uninitialized);
        assert_eq!(e.state(), EstimatorState::default());
    }

    #[test]
    fn step_without_init_runs_from_reset_values() {
        let mut a = est(255, 0, 64);
        let mut b = est(255, 0, 64);
        b.init_pulse(0);
        assert_eq!(a.step(30), b.step(30));
        assert_eq!(a.phase(), EstimatorPhase::Steady);
    }

    #[test]
    fn init_clears_history() {
        let mut e = est(255, 0, 64);
        e.init_pulse(0);
        run(&mut e, &[50, 100]);
        e.init_pulse(100);
        assert_eq!(e.step(100), (0, false));
    }

    #[test]
    fn params_validated() {
        assert!(EstimatorParams::new(0, 7, 127).is_ok());
        assert!(matches!(
            EstimatorParams::new(32, 8, 64),
            Err(FuzzyError::Configuration { .. })
        ));
        assert!(EstimatorParams::new(32, 3, 128).is_err());
        let p = EstimatorParams::default();
        assert_eq!((p.alpha(), p.k_dt(), p.d_max()), (32, 3, 64));
    }

    #[test]
    fn output_slice_asymmetry() {
        assert_eq!(output_slice(127), 0);
        assert_eq!(output_slice(128), 1);
        assert_eq!(output_slice(-127), 0);
        assert_eq!(output_slice(-128), -1);
        assert_eq!(output_slice(-129), -1);
        assert_eq!(output_slice(-256), -2);
    }
}
