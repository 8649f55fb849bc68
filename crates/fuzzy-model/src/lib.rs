// SPDX-License-Identifier: AGPL-3.0-only

#![deny(unsafe_code)]

//! Bit-accurate golden model of the fuzzy inference coprocessor.
//!
//! Two signed 8-bit inputs (temperature `T` and its rate of change `dT`)
//! map to an output `G` in percent through the same fixed-point pipeline the
//! FPGA runs:
//!
//! ```text
//! T ──fuzzify──┐                                   ┌─ S_w ──┐
//!              ├─ min grid (3×3) ─ gate ─ aggregate┤        ├─ defuzz ─ G
//! dT ─fuzzify──┘                                   └─ S_wg ─┘
//!  ▲
//!  └── DT_IN register, or DerivativeEstimator fed with T
//! ```
//!
//! All arithmetic is integer: Q1.15 degrees, rounding multiplies and
//! bus-width emulation come from [`fuzzy_chip::fixed`]. Any change of a
//! rounding point shows up as a ±1 difference against hardware captures.
//!
//! # Example
//!
//! ```
//! use fuzzy_model::{evaluate, CoprocessorConfig, DtSource, RuleMode};
//!
//! # fn main() -> fuzzy_model::Result<()> {
//! let cfg = CoprocessorConfig::default();
//! let r = evaluate(-64, -10, &cfg, RuleMode::Full, DtSource::External, None)?;
//! assert_eq!(r.g, 100);
//! # Ok(())
//! # }
//! ```
//!
//! # Module organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | `config` | [`Threshold`], [`MembershipSet`], [`ConsequentTable`], [`CoprocessorConfig`] presets |
//! | `membership` | [`trapezoid`] and [`Degrees`] |
//! | `rules` | [`fire`], [`gate`], [`rules`] and [`RuleMode`] |
//! | `aggregate` | [`aggregate`] into saturated [`Sums`] |
//! | `defuzz` | [`defuzz`] |
//! | `estimator` | [`DerivativeEstimator`] and its parameters |
//! | `engine` | [`evaluate`] / [`infer`] coordinator |
//! | [`batch`] | vector files, result files, sweep generators |
//! | [`parity`] | hardware capture comparison |

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod aggregate;
pub mod batch;
mod config;
mod csv;
mod defuzz;
mod engine;
mod error;
mod estimator;
mod membership;
pub mod parity;
mod rules;

pub use aggregate::{aggregate, Sums};
pub use config::{ConsequentTable, CoprocessorConfig, FuzzySet, MembershipSet, Threshold};
pub use defuzz::defuzz;
pub use engine::{evaluate, infer, DtSource, SampleResult};
pub use error::{checked_s8, FuzzyError, Result};
pub use estimator::{DerivativeEstimator, EstimatorParams, EstimatorPhase, EstimatorState};
pub use membership::{trapezoid, Degrees};
pub use rules::{fire, gate, rules, RuleMode, RuleWeights};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        evaluate, infer, CoprocessorConfig, DerivativeEstimator, DtSource, EstimatorParams,
        FuzzyError, Result, RuleMode, SampleResult,
    };
}
