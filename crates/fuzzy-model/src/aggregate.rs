// SPDX-License-Identifier: AGPL-3.0-only

//! Weighted aggregation of rule singletons.
//!
//! Each gated weight multiplies its consequent (converted to Q1.15 with
//! [`percent_to_q15`]) through [`mul_q15_round`]. Weights and weighted terms
//! are summed in `u32` and then saturated independently to Q1.15, like the
//! RTL's saturating accumulators. A total above the ceiling reads as the
//! ceiling, never as a wrapped value.

use crate::config::ConsequentTable;
use crate::rules::{gate, RuleMode, RuleWeights};
use fuzzy_chip::fixed::{mul_q15_round, percent_to_q15, sat_q15};

/// Saturated accumulator outputs, both Q1.15.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Sums {
    /// `S_w`: sum of active rule weights.
    pub sum_weight: u16,
    /// `S_wg`: sum of weight × consequent.
    pub sum_weighted_output: u16,
}

/// Gate, weight and sum the nine rules.
#[must_use]
pub fn aggregate(mode: RuleMode, weights: &RuleWeights, consequents: &ConsequentTable) -> Sums {
    let gated = gate(mode, weights);
    let (sw, swg) = gated
        .iter()
        .zip(consequents.as_array())
        .fold((0u32, 0u32), |(sw, swg), (&w, &g)| {
            let wg = mul_q15_round(w, percent_to_q15(g));
            (sw + u32::from(w), swg + u32::from(wg))
        });
    Sums {
        sum_weight: sat_q15(i64::from(sw)),
        sum_weighted_output: sat_q15(i64::from(swg)),
    }
}
