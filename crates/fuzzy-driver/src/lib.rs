// SPDX-License-Identifier: AGPL-3.0-only

#![deny(unsafe_code)]

//! Host-side driver for the fuzzy inference coprocessor.
//!
//! Speaks the five-register protocol over any [`RegisterBus`], and provides
//! an in-process [`SoftwareCoprocessor`] that answers that protocol with the
//! golden model, so the same sequencing code runs with or without an FPGA.
//!
//! # Backend hierarchy
//!
//! ```text
//! Reference:
//!   ModelBackend     direct fuzzy_model::evaluate calls
//!
//! Register protocol:
//!   RegisterBackend<B: RegisterBus>
//!     over SoftwareCoprocessor   (in-process register file)
//!     over a hardware bus        (UART bridge, GPIO bit-bang, ...)
//! ```
//!
//! # Quick start
//!
//! ```
//! use fuzzy_driver::{Coprocessor, SoftwareCoprocessor};
//!
//! # fn main() -> fuzzy_driver::Result<()> {
//! let mut dev = Coprocessor::new(SoftwareCoprocessor::default());
//! assert_eq!(dev.run_once_external(-64, -10)?, 100);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod backend;
pub mod backends;
mod bus;
pub mod capture;
mod device;
mod error;

/// Register map constants (re-exported from fuzzy-chip).
pub mod regs {
    pub use fuzzy_chip::regs::*;
}

pub use backend::{BackendType, CoprocessorBackend};
pub use backends::{ModelBackend, RegisterBackend, SoftwareCoprocessor};
pub use bus::{PollConfig, RegisterBus};
pub use capture::{capture, capture_stream, write_captures, CaptureRun};
pub use device::Coprocessor;
pub use error::{DriverError, Result};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        capture, capture_stream, Coprocessor, CoprocessorBackend, DriverError, ModelBackend,
        PollConfig, RegisterBackend, RegisterBus, Result, SoftwareCoprocessor,
    };
    pub use fuzzy_model::{CoprocessorConfig, DtSource, RuleMode};
}
