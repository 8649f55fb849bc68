// SPDX-License-Identifier: AGPL-3.0-only

//! Silicon model for the fuzzy-logic inference coprocessor.
//!
//! This crate has **no dependencies** and **no hardware access**. It is a
//! pure description of the RTL: register addresses, control/status bits,
//! the fixed-point arithmetic the datapath performs, and the synthesis
//! parameters the bitstream was built with.
//!
//! Everything that has to be *bit-identical* to the FPGA lives here so that
//! the golden model (`fuzzy-model`) and the register-level driver
//! (`fuzzy-driver`) agree on one definition.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`regs`] | 5-register map, CTRL/STATUS bit definitions, decoded [`regs::CtrlWord`] |
//! | [`fixed`] | Q1.15 / s8 saturation, rounding multiply, sign extension, RTL bus widths |
//! | [`params`] | Synthesis parameters (estimator ALPHA/KDT/DMAX) and the STATUS polling budget |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod fixed;
pub mod params;
pub mod regs;
