// SPDX-License-Identifier: AGPL-3.0-only

//! Register map of the coprocessor's 8-bit parallel bus.
//!
//! Five byte-wide registers behind a 6-bit address decoder:
//!
//! ```text
//! 0x00  STATUS  R    bit0 = result valid (sticky, clears on read)
//! 0x01  CTRL    W/R  bit0 START (W1P)  bit1 reg_mode  bit2 dt_mode  bit3 INIT (W1P)
//! 0x02  T_IN    W    temperature input, two's complement Q7.0
//! 0x03  DT_IN   W    external derivative, two's complement Q7.0 (dt_mode = 0)
//! 0x04  G_OUT   R    result percentage 0..100
//! ```
//!
//! W1P = write-one-pulse: the bit fires once on the write cycle and is never
//! latched. Mode bits are latched; reading CTRL returns them.

// ── Register addresses ───────────────────────────────────────────────────────

/// Status register.
pub const STATUS: u8 = 0x00;

/// Control register: pulses and mode bits.
pub const CTRL: u8 = 0x01;

/// Temperature input (s8).
pub const T_IN: u8 = 0x02;

/// External derivative input (s8), used when `dt_mode = 0`.
pub const DT_IN: u8 = 0x03;

/// Result register (0..100).
pub const G_OUT: u8 = 0x04;

/// Every decoded address, in map order.
pub const ALL: [u8; 5] = [STATUS, CTRL, T_IN, DT_IN, G_OUT];

/// Human-readable register name for logging.
#[must_use]
pub const fn name(addr: u8) -> Option<&'static str> {
    match addr {
        STATUS => Some("STATUS"),
        CTRL => Some("CTRL"),
        T_IN => Some("T_IN"),
        DT_IN => Some("DT_IN"),
        G_OUT => Some("G_OUT"),
        _ => None,
    }
}

// ── Status register bit definitions ──────────────────────────────────────────

pub mod status {
    //! STATUS bits.

    /// A result is waiting in G_OUT. Sticky until STATUS is read.
    pub const VALID: u8 = 1 << 0;
}

// ── Control register bit definitions ─────────────────────────────────────────

pub mod ctrl {
    //! CTRL bits.

    /// Start one evaluation (pulse).
    pub const START: u8 = 1 << 0;
    /// Rule grid: 0 = four corner rules, 1 = full 3×3 grid.
    pub const REG_MODE: u8 = 1 << 1;
    /// Derivative source: 0 = DT_IN register, 1 = on-chip estimator.
    pub const DT_MODE: u8 = 1 << 2;
    /// Re-arm the estimator from the current T_IN (pulse).
    pub const INIT: u8 = 1 << 3;

    /// Bits that are latched by a write.
    pub const MODE_MASK: u8 = REG_MODE | DT_MODE;
    /// Bits that fire once and are never latched.
    pub const PULSE_MASK: u8 = START | INIT;
}

/// Decoded CTRL write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CtrlWord {
    /// START pulse requested.
    pub start: bool,
    /// Full 3×3 grid (`reg_mode = 1`).
    pub reg_mode: bool,
    /// On-chip estimator supplies dT (`dt_mode = 1`).
    pub dt_mode: bool,
    /// INIT pulse requested.
    pub init: bool,
}

impl CtrlWord {
    /// Decode a raw CTRL byte. Reserved bits 4..7 are ignored.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            start: bits & ctrl::START != 0,
            reg_mode: bits & ctrl::REG_MODE != 0,
            dt_mode: bits & ctrl::DT_MODE != 0,
            init: bits & ctrl::INIT != 0,
        }
    }

    /// Encode back to a CTRL byte.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        let mut b = 0;
        if self.start {
            b |= ctrl::START;
        }
        if self.reg_mode {
            b |= ctrl::REG_MODE;
        }
        if self.dt_mode {
            b |= ctrl::DT_MODE;
        }
        if self.init {
            b |= ctrl::INIT;
        }
        b
    }

    /// Whether this write fires START or INIT.
    #[must_use]
    pub const fn has_pulse(&self) -> bool {
        self.start || self.init
    }
}

// ── Canonical CTRL values used by the bring-up firmware ──────────────────────

/// INIT pulse alone.
pub const CTRL_PULSE_INIT: u8 = ctrl::INIT;
/// START pulse alone.
pub const CTRL_PULSE_START: u8 = ctrl::START;
/// 9 rules, external dT.
pub const CTRL_FULL_EXTERNAL: u8 = ctrl::REG_MODE;
/// 9 rules, estimator dT.
pub const CTRL_FULL_INTERNAL: u8 = ctrl::REG_MODE | ctrl::DT_MODE;
