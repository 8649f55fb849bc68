// SPDX-License-Identifier: AGPL-3.0-only

//! Trapezoidal membership functions.
//!
//! ```text
//!  32767 ┤      b────────c
//!        │     /          \
//!        │    /            \
//!      0 ┼───a              d───
//! ```
//!
//! The support test runs first: `x <= a` or `x >= d` is always 0, even when
//! a zero-width ramp puts `x` on the plateau edge. Zero-width ramps divide by
//! 1 instead of 0, giving a full-scale step one count past the foot. Both
//! behaviours match the RTL `ref_mu` and stay as they are.

use fuzzy_chip::fixed::{Q15_MAX, Q15_SHIFT};

/// Degrees of one input in its three fuzzy sets, Q1.15.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Degrees {
    /// Degree in "negative"
    pub neg: u16,
    /// Degree in "zero"
    pub zero: u16,
    /// Degree in "positive"
    pub pos: u16,
}

impl Degrees {
    /// `[neg, zero, pos]`, rule-grid order.
    pub const fn as_array(&self) -> [u16; 3] {
        [self.neg, self.zero, self.pos]
    }
}

/// Membership degree of `x` in the trapezoid `(a, b, c, d)`, Q1.15.
///
/// Assumes `a <= b <= c <= d`; [`crate::Threshold::new`] enforces it.
#[must_use]
pub fn trapezoid(x: i8, a: i8, b: i8, c: i8, d: i8) -> u16 {
    if x <= a || x >= d {
        return 0;
    }
    if b <= x && x <= c {
        return Q15_MAX;
    }
    let (num, den) = if x < b {
        (i32::from(x) - i32::from(a), i32::from(b) - i32::from(a))
    } else {
        (i32::from(d) - i32::from(x), i32::from(d) - i32::from(c))
    };
    ramp(num, den)
}

// `(num << 15) / den`, den of 0 replaced by 1, capped at full scale.
fn ramp(num: i32, den: i32) -> u16 {
    let den = den.max(1);
    let value = (num << Q15_SHIFT) / den;
    u16::try_from(value.clamp(0, i32::from(Q15_MAX))).unwrap_or(Q15_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outside_support_is_zero() {
        assert_eq!(trapezoid(-5, 0, 10, 10, 30), 0);
        assert_eq!(trapezoid(0, 0, 10, 10, 30), 0);
        assert_eq!(trapezoid(30, 0, 10, 10, 30), 0);
        assert_eq!(trapezoid(127, 0, 10, 10, 30), 0);
    }

    #[test]
    fn plateau_is_full_scale() {
        assert_eq!(trapezoid(10, 0, 10, 10, 30), Q15_MAX);
        assert_eq!(trapezoid(-40, -64, -50, -30, 0), Q15_MAX);
    }

    #[test]
    fn ramps_truncate() {
        // (1 << 15) / 10
        assert_eq!(trapezoid(1, 0, 10, 10, 30), 3276);
        // (10 << 15) / 20
        assert_eq!(trapezoid(20, 0, 10, 10, 30), 16_384);
        // (1 << 15) / 20
        assert_eq!(trapezoid(29, 0, 10, 10, 30), 1638);
    }

    #[test]
    fn zero_width_ramps() {
        // The foot wins over the plateau when a == b
        assert_eq!(trapezoid(-128, -128, -128, -64, 0), 0);
        assert_eq!(trapezoid(-127, -128, -128, -64, 0), Q15_MAX);
        assert_eq!(trapezoid(127, 0, 64, 127, 127), 0);
        assert_eq!(trapezoid(126, 0, 64, 127, 127), Q15_MAX);
        // Single-point trapezoid never fires
        for x in i8::MIN..=i8::MAX {
            assert_eq!(trapezoid(x, 5, 5, 5, 5), 0);
        }
    }

    #[test]
    fn bench_sets_at_known_points() {
        // T = 10 against the bench T sets
        assert_eq!(trapezoid(10, -128, -64, -32, 0), 0);
        assert_eq!(trapezoid(10, -16, 0, 0, 16), 12_288);
        assert_eq!(trapezoid(10, 0, 32, 64, 127), 10_240);
        // dT = -10 against the bench dT "negative" set
        assert_eq!(trapezoid(-10, -100, -50, -30, -5), 6553);
    }

    #[test]
    fn degrees_order() {
        let d = Degrees { neg: 1, zero: 2, pos: 3 };
        assert_eq!(d.as_array(), [1, 2, 3]);
    }
}
