// SPDX-License-Identifier: AGPL-3.0-only

//! Fixed-point arithmetic of the datapath.
//!
//! Two number formats cross the chip:
//!
//! - **Q1.15 unsigned** (`u16`, 0..=32767): membership degrees, rule weights,
//!   aggregated sums. Every producer saturates into this range.
//! - **Q7.0 signed** (`i8`): T, dT and the threshold registers.
//!
//! The derivative estimator additionally runs through fixed-width buses
//! (9-bit delta, 16-bit fractional state, 24-bit multiplicands, 32-bit
//! product). Those stages are emulated in `i64` and then folded back with
//! [`sign_extend`], so overflow wraps exactly where the RTL wraps.
//!
//! Rounding points are part of the contract: [`percent_to_q15`] adds 50
//! before the divide and [`mul_q15_round`] adds half an LSB before the shift.
//! Moving either by one step changes outputs by ±1 on boundary values.

/// Largest Q1.15 value (0.99997).
pub const Q15_MAX: u16 = 0x7FFF;

/// Q1.15 fractional bits.
pub const Q15_SHIFT: u32 = 15;

/// Half an LSB at the Q1.15 product scale (`1 << 14`).
pub const Q15_HALF: u32 = 1 << (Q15_SHIFT - 1);

/// RTL bus widths of the derivative estimator pipeline.
pub mod width {
    /// `delta_q8 = T_cur - T_prev`, signed.
    pub const DELTA: u32 = 9;
    /// Fractional state container (`delta_q15`, `dT_prev_q15`).
    pub const FRAC: u32 = 16;
    /// Alpha-path multiplicand (`alpha << 8`, `(256 - alpha) << 8`).
    pub const MULTIPLICAND: u32 = 24;
    /// Product/accumulator (`sum32`).
    pub const PRODUCT: u32 = 32;
    /// Output bus (`dT_out`).
    pub const OUT: u32 = 8;
}

/// Saturate to the unsigned Q1.15 range `[0, 32767]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn sat_q15(x: i64) -> u16 {
    if x < 0 {
        0
    } else if x > Q15_MAX as i64 {
        Q15_MAX
    } else {
        x as u16
    }
}

/// Clamp to the signed 8-bit range `[-128, 127]`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn clamp_s8(x: i64) -> i8 {
    if x < i8::MIN as i64 {
        i8::MIN
    } else if x > i8::MAX as i64 {
        i8::MAX
    } else {
        x as i8
    }
}

/// Convert a consequent percentage to Q1.15: `(p * 32767 + 50) / 100`, saturated.
///
/// The `+ 50` is the RTL's round-half-up before the truncating divide.
#[must_use]
pub const fn percent_to_q15(percent: u8) -> u16 {
    let tmp = (percent as i64) * (Q15_MAX as i64) + 50;
    sat_q15(tmp / 100)
}

/// Q1.15 × Q1.15 with `+ (1 << 14)` before `>> 15`, saturated.
#[must_use]
pub const fn mul_q15_round(a: u16, b: u16) -> u16 {
    let mul = (a as u64) * (b as u64) + Q15_HALF as u64;
    sat_q15((mul >> Q15_SHIFT) as i64)
}

/// Treat the low `bits` bits of `value` as two's complement and widen.
///
/// `bits` must be in `1..=64`.
#[must_use]
pub const fn sign_extend(value: i64, bits: u32) -> i64 {
    debug_assert!(bits >= 1 && bits <= 64);
    let shift = 64 - bits;
    (value << shift) >> shift
}

/// Keep the low `bits` bits of `value` (zero-extended).
#[must_use]
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub const fn mask(value: i64, bits: u32) -> i64 {
    if bits >= 64 {
        value
    } else {
        ((value as u64) & ((1u64 << bits) - 1)) as i64
    }
}
