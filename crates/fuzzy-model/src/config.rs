// SPDX-License-Identifier: AGPL-3.0-only

//! Coprocessor configuration: membership thresholds and rule consequents.
//!
//! Everything here is an immutable value. A [`CoprocessorConfig`] is built
//! once at startup and shared by reference with every evaluation stream;
//! it is `Copy + Send + Sync` and never mutated after construction.
//!
//! Validation happens at construction, so the datapath can assume
//! `a <= b <= c <= d` and consequents in `0..=100`.

use crate::error::{FuzzyError, Result};
use crate::membership::{trapezoid, Degrees};
use fuzzy_chip::params::{G_MAX, RULE_COUNT};

/// One of the three fuzzy sets covering an input dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuzzySet {
    /// "negative"
    Negative,
    /// "zero"
    Zero,
    /// "positive"
    Positive,
}

impl FuzzySet {
    /// Row/column order of the rule grid.
    pub const ALL: [Self; 3] = [Self::Negative, Self::Zero, Self::Positive];

    /// Row or column index in the rule grid.
    pub const fn index(self) -> usize {
        match self {
            Self::Negative => 0,
            Self::Zero => 1,
            Self::Positive => 2,
        }
    }
}

/// Trapezoid corners in Q7.0: support `[a, d]`, plateau `[b, c]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Threshold {
    a: i8,
    b: i8,
    c: i8,
    d: i8,
}

impl Threshold {
    /// Create a threshold, rejecting corners out of order.
    ///
    /// Zero-width ramps (`a == b` or `c == d`) are legal.
    ///
    /// # Errors
    ///
    /// Returns `InvalidThreshold` unless `a <= b <= c <= d`.
    pub fn new(a: i8, b: i8, c: i8, d: i8) -> Result<Self> {
        if a <= b && b <= c && c <= d {
            Ok(Self { a, b, c, d })
        } else {
            Err(FuzzyError::InvalidThreshold { a, b, c, d })
        }
    }

    // Presets only; callers go through `new`.
    const fn preset(a: i8, b: i8, c: i8, d: i8) -> Self {
        Self { a, b, c, d }
    }

    /// Left foot.
    pub const fn a(&self) -> i8 {
        self.a
    }

    /// Left shoulder.
    pub const fn b(&self) -> i8 {
        self.b
    }

    /// Right shoulder.
    pub const fn c(&self) -> i8 {
        self.c
    }

    /// Right foot.
    pub const fn d(&self) -> i8 {
        self.d
    }

    /// Corners as `(a, b, c, d)`.
    pub const fn corners(&self) -> (i8, i8, i8, i8) {
        (self.a, self.b, self.c, self.d)
    }

    /// Membership degree of `x` in Q1.15.
    pub fn degree(&self, x: i8) -> u16 {
        trapezoid(x, self.a, self.b, self.c, self.d)
    }
}

/// The three fuzzy sets of one input dimension. Sets may overlap freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MembershipSet {
    /// "negative" set
    pub neg: Threshold,
    /// "zero" set
    pub zero: Threshold,
    /// "positive" set
    pub pos: Threshold,
}

impl MembershipSet {
    /// Bundle three validated thresholds.
    pub const fn new(neg: Threshold, zero: Threshold, pos: Threshold) -> Self {
        Self { neg, zero, pos }
    }

    /// Threshold of one set.
    pub const fn get(&self, set: FuzzySet) -> &Threshold {
        match set {
            FuzzySet::Negative => &self.neg,
            FuzzySet::Zero => &self.zero,
            FuzzySet::Positive => &self.pos,
        }
    }

    /// Evaluate all three trapezoids at `x`.
    pub fn fuzzify(&self, x: i8) -> Degrees {
        Degrees {
            neg: self.neg.degree(x),
            zero: self.zero.degree(x),
            pos: self.pos.degree(x),
        }
    }
}

/// Nine singleton outputs in percent, row-major (T set outer, dT set inner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsequentTable([u8; RULE_COUNT]);

impl ConsequentTable {
    /// Test-bench singletons `G00..G22`.
    pub const BENCH: Self = Self([100, 50, 30, 50, 50, 50, 80, 50, 0]);

    /// Create a table, rejecting percentages above 100.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConsequent` for the first entry above 100.
    pub fn new(values: [u8; RULE_COUNT]) -> Result<Self> {
        if let Some((index, &value)) = values.iter().enumerate().find(|&(_, &v)| v > G_MAX) {
            return Err(FuzzyError::InvalidConsequent { index, value });
        }
        Ok(Self(values))
    }

    /// Consequent of rule (`t`, `dt`).
    pub const fn get(&self, t: FuzzySet, dt: FuzzySet) -> u8 {
        self.0[t.index() * 3 + dt.index()]
    }

    /// Row-major view.
    pub const fn as_array(&self) -> &[u8; RULE_COUNT] {
        &self.0
    }
}

impl Default for ConsequentTable {
    fn default() -> Self {
        Self::BENCH
    }
}

/// Complete, immutable coprocessor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoprocessorConfig {
    temperature: MembershipSet,
    derivative: MembershipSet,
    consequents: ConsequentTable,
}

impl CoprocessorConfig {
    /// Test-bench configuration (`set_mf_defaults()` in the RTL bench).
    pub const BENCH: Self = Self {
        temperature: MembershipSet::new(
            Threshold::preset(-128, -64, -32, 0),
            Threshold::preset(-16, 0, 0, 16),
            Threshold::preset(0, 32, 64, 127),
        ),
        derivative: MembershipSet::new(
            Threshold::preset(-100, -50, -30, -5),
            Threshold::preset(-10, 0, 0, 10),
            Threshold::preset(5, 25, 35, 60),
        ),
        consequents: ConsequentTable::BENCH,
    };

    /// Symmetric shoulders at ±64 on both inputs.
    pub const SYMMETRIC: Self = {
        let set = MembershipSet::new(
            Threshold::preset(-128, -128, -64, 0),
            Threshold::preset(-64, 0, 0, 64),
            Threshold::preset(0, 64, 127, 127),
        );
        Self {
            temperature: set,
            derivative: set,
            consequents: ConsequentTable::BENCH,
        }
    };

    /// Assemble a configuration from validated parts.
    pub const fn new(
        temperature: MembershipSet,
        derivative: MembershipSet,
        consequents: ConsequentTable,
    ) -> Self {
        Self {
            temperature,
            derivative,
            consequents,
        }
    }

    /// Preset with symmetric ±64 shoulders.
    pub const fn symmetric() -> Self {
        Self::SYMMETRIC
    }

    /// Membership sets for T.
    pub const fn temperature(&self) -> &MembershipSet {
        &self.temperature
    }

    /// Membership sets for dT.
    pub const fn derivative(&self) -> &MembershipSet {
        &self.derivative
    }

    /// Rule consequents.
    pub const fn consequents(&self) -> &ConsequentTable {
        &self.consequents
    }

    /// Copy with a different T membership set.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: MembershipSet) -> Self {
        self.temperature = temperature;
        self
    }

    /// Copy with a different dT membership set.
    #[must_use]
    pub const fn with_derivative(mut self, derivative: MembershipSet) -> Self {
        self.derivative = derivative;
        self
    }

    /// Copy with a different consequent table.
    #[must_use]
    pub const fn with_consequents(mut self, consequents: ConsequentTable) -> Self {
        self.consequents = consequents;
        self
    }
}

impl Default for CoprocessorConfig {
    fn default() -> Self {
        Self::BENCH
    }
}
