// SPDX-License-Identifier: AGPL-3.0-only

//! Synthesis parameters and the firmware polling budget.
//!
//! Source: `dt_estimator.sv` parameter block and the bring-up board wiring.

/// Derivative estimator parameters baked into the bitstream.
pub mod estimator {
    /// Filter gain in Q8.8 (`alpha / 256`), `ALPHA_P`.
    pub const ALPHA: u8 = 32;
    /// Pre-scale shift (`delta >>> k_dt`), `KDT_P`.
    pub const K_DT: u8 = 3;
    /// Largest legal `k_dt` (3-bit field).
    pub const K_DT_MAX: u8 = 7;
    /// Output clamp magnitude in Q7.0, `DMAX_P`.
    pub const D_MAX: u8 = 64;
    /// Largest legal clamp (positive s8).
    pub const D_MAX_LIMIT: u8 = 127;
}

/// STATUS polling contract of the bring-up firmware.
pub mod bus {
    /// STATUS.valid polling budget used by the bring-up firmware (ms).
    pub const VALID_TIMEOUT_MS: u64 = 1_000;
    /// Interval between STATUS polls (ms).
    pub const VALID_POLL_MS: u64 = 5;
}

/// Output range of G_OUT.
pub const G_MAX: u8 = 100;

/// Rules in the full grid.
pub const RULE_COUNT: usize = 9;
