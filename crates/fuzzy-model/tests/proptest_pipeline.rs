// SPDX-License-Identifier: AGPL-3.0-only

//! Property-based tests for the fixed-point pipeline.
//!
//! These cover the universally quantified guarantees: membership range,
//! support and plateau, defuzzifier range, estimator clamp and determinism.

use fuzzy_chip::fixed::{percent_to_q15, Q15_MAX};
use fuzzy_model::{
    defuzz, evaluate, trapezoid, ConsequentTable, CoprocessorConfig, DerivativeEstimator,
    DtSource, EstimatorParams, FuzzyError, MembershipSet, RuleMode, Threshold,
};
use proptest::prelude::*;

/// Strategy for ordered trapezoid corners
fn corners() -> impl Strategy<Value = [i8; 4]> {
    prop::array::uniform4(any::<i8>()).prop_map(|mut v| {
        v.sort_unstable();
        v
    })
}

fn threshold() -> impl Strategy<Value = Threshold> {
    corners().prop_map(|[a, b, c, d]| Threshold::new(a, b, c, d).unwrap())
}

fn membership_set() -> impl Strategy<Value = MembershipSet> {
    (threshold(), threshold(), threshold()).prop_map(|(n, z, p)| MembershipSet::new(n, z, p))
}

/// Strategy for arbitrary valid configurations
fn config() -> impl Strategy<Value = CoprocessorConfig> {
    (
        membership_set(),
        membership_set(),
        prop::array::uniform9(0..=100u8),
    )
        .prop_map(|(t, d, g)| {
            CoprocessorConfig::new(t, d, ConsequentTable::new(g).unwrap())
        })
}

fn rule_mode() -> impl Strategy<Value = RuleMode> {
    prop_oneof![Just(RuleMode::Corners), Just(RuleMode::Full)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: degree is always within Q1.15
    #[test]
    fn trapezoid_in_range([a, b, c, d] in corners(), x in any::<i8>()) {
        prop_assert!(trapezoid(x, a, b, c, d) <= Q15_MAX);
    }

    /// Property: zero outside the open support
    #[test]
    fn trapezoid_zero_outside_support([a, b, c, d] in corners(), x in any::<i8>()) {
        if x <= a || x >= d {
            prop_assert_eq!(trapezoid(x, a, b, c, d), 0);
        }
    }

    /// Property: full scale on the plateau inside the support
    #[test]
    fn trapezoid_full_on_plateau([a, b, c, d] in corners(), x in any::<i8>()) {
        if a < x && x < d && b <= x && x <= c {
            prop_assert_eq!(trapezoid(x, a, b, c, d), Q15_MAX);
        }
    }

    /// Property: rising edge never decreases up to the right shoulder
    #[test]
    fn trapezoid_rising_edge_monotone([a, b, c, d] in corners(), x in any::<i8>(), y in any::<i8>()) {
        let (lo, hi) = if x <= y { (x, y) } else { (y, x) };
        if a < lo && hi <= c && hi < d {
            prop_assert!(trapezoid(lo, a, b, c, d) <= trapezoid(hi, a, b, c, d));
        }
    }

    /// Property: defuzzified output is a percentage
    #[test]
    fn defuzz_is_percentage(sw in 0..=Q15_MAX, swg in 0..=Q15_MAX) {
        prop_assert!(defuzz(sw, swg) <= 100);
    }

    /// Property: a single rule firing with a usable weight returns its own consequent (±1)
    #[test]
    fn single_rule_returns_consequent(w in 1024..=Q15_MAX, g in 0..=100u8) {
        let wg = fuzzy_chip::fixed::mul_q15_round(w, percent_to_q15(g));
        let out = defuzz(w, wg);
        prop_assert!(out.abs_diff(g) <= 1, "w={} g={} out={}", w, g, out);
    }

    /// Property: evaluation is pure and bounded for any valid configuration
    #[test]
    fn evaluate_is_deterministic(cfg in config(), mode in rule_mode(), t in any::<i8>(), dt in any::<i8>()) {
        let a = evaluate(t.into(), dt.into(), &cfg, mode, DtSource::External, None).unwrap();
        let b = evaluate(t.into(), dt.into(), &cfg, mode, DtSource::External, None).unwrap();
        prop_assert_eq!(a, b);
        prop_assert!(a.g <= 100);
        prop_assert!(a.sums.sum_weight <= Q15_MAX);
    }

    /// Property: inputs outside s8 are rejected, never wrapped
    #[test]
    fn wide_inputs_rejected(t in 128..10_000i32, neg in any::<bool>()) {
        let t = if neg { -t - 1 } else { t };
        let cfg = CoprocessorConfig::default();
        let r = evaluate(t, 0, &cfg, RuleMode::Full, DtSource::External, None);
        prop_assert!(
            matches!(r, Err(FuzzyError::InvalidInput { name: "T", .. })),
            "expected InvalidInput"
        );
    }

    /// Property: estimator output never exceeds its clamp
    #[test]
    fn estimator_respects_clamp(
        alpha in any::<u8>(),
        k_dt in 0..=7u8,
        d_max in 0..=127u8,
        init in any::<i8>(),
        samples in prop::collection::vec(any::<i8>(), 1..64),
    ) {
        let mut est = DerivativeEstimator::new(EstimatorParams::new(alpha, k_dt, d_max).unwrap());
        est.init_pulse(init);
        for (i, t) in samples.into_iter().enumerate() {
            let (dt, was_valid) = est.step(t);
            prop_assert!(i16::from(dt).unsigned_abs() <= u16::from(d_max));
            prop_assert_eq!(was_valid, i > 0);
        }
    }
}
