// SPDX-License-Identifier: AGPL-3.0-only

//! Rule grid: `w[i][j] = min(muT[i], muD[j])`.

use crate::membership::Degrees;
use fuzzy_chip::params::RULE_COUNT;
use fuzzy_chip::regs::ctrl;

/// Which rules of the 3×3 grid take part in aggregation (CTRL `reg_mode`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RuleMode {
    /// `reg_mode = 0`: only the four corner rules.
    Corners,
    /// `reg_mode = 1`: all nine rules.
    #[default]
    Full,
}

impl RuleMode {
    /// Decode the `reg_mode` bit of a CTRL byte.
    pub const fn from_ctrl(bits: u8) -> Self {
        if bits & ctrl::REG_MODE != 0 {
            Self::Full
        } else {
            Self::Corners
        }
    }

    /// CTRL bit for this mode.
    pub const fn ctrl_bits(self) -> u8 {
        match self {
            Self::Corners => 0,
            Self::Full => ctrl::REG_MODE,
        }
    }

    /// Whether row-major rule `index` is active in this mode.
    pub const fn is_active(self, index: usize) -> bool {
        match self {
            Self::Full => index < RULE_COUNT,
            Self::Corners => matches!(index, 0 | 2 | 6 | 8),
        }
    }
}

impl From<bool> for RuleMode {
    fn from(full: bool) -> Self {
        if full {
            Self::Full
        } else {
            Self::Corners
        }
    }
}

impl std::fmt::Display for RuleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Corners => write!(f, "4-rule"),
            Self::Full => write!(f, "9-rule"),
        }
    }
}

/// Nine rule strengths, row-major (T set outer, dT set inner), Q1.15.
pub type RuleWeights = [u16; RULE_COUNT];

/// Fire the full grid with the `min` t-norm.
///
/// No gating happens here; [`gate`] applies the rule mode.
#[must_use]
pub fn fire(t: &Degrees, dt: &Degrees) -> RuleWeights {
    let mut w = [0; RULE_COUNT];
    for (i, mu_t) in t.as_array().into_iter().enumerate() {
        for (j, mu_d) in dt.as_array().into_iter().enumerate() {
            w[i * 3 + j] = mu_t.min(mu_d);
        }
    }
    w
}

/// Zero every rule the mode disables.
#[must_use]
pub fn gate(mode: RuleMode, weights: &RuleWeights) -> RuleWeights {
    let mut w = *weights;
    for (i, wi) in w.iter_mut().enumerate() {
        if !mode.is_active(i) {
            *wi = 0;
        }
    }
    w
}

/// [`fire`] followed by [`gate`].
#[must_use]
pub fn rules(mode: RuleMode, t: &Degrees, dt: &Degrees) -> RuleWeights {
    gate(mode, &fire(t, dt))
}
