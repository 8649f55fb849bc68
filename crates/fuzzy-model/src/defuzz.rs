// SPDX-License-Identifier: AGPL-3.0-only

//! Weighted-average defuzzification.
//!
//! ```text
//! den     = max(S_w, 1)
//! ratio   = (S_wg << 15) / den            truncating
//! percent = (ratio * 100 + 2^14) >> 15    half-LSB round, then clamp to 0..=100
//! ```
//!
//! Multiply by 100 after the ratio, not before. The `+ 2^14` rounding term
//! matches the RTL divider and the aggregator's rounding convention.

use fuzzy_chip::fixed::{Q15_HALF, Q15_SHIFT};
use fuzzy_chip::params::G_MAX;

/// Crisp output percentage from the aggregated sums.
///
/// A zero `sum_weight` is not an error: the denominator becomes 1, and with
/// `S_wg <= S_w` the numerator is 0 as well, so the result is 0.
#[must_use]
pub fn defuzz(sum_weight: u16, sum_weighted_output: u16) -> u8 {
    let den = u64::from(sum_weight.max(1));
    let ratio = (u64::from(sum_weighted_output) << Q15_SHIFT) / den;
    let percent = (ratio * 100 + u64::from(Q15_HALF)) >> Q15_SHIFT;
    u8::try_from(percent.min(u64::from(G_MAX))).unwrap_or(G_MAX)
}
