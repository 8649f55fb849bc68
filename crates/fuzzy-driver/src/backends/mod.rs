// SPDX-License-Identifier: AGPL-3.0-only

//! Backend implementations
//!
//! - **Model**: direct golden-model calls (reference)
//! - **Register**: the bus protocol over any [`RegisterBus`](crate::RegisterBus)
//! - **Software coprocessor**: an in-process register file that a
//!   `RegisterBackend` can drive when no FPGA is attached

pub mod model;
pub mod register;
pub mod software;

pub use model::ModelBackend;
pub use register::RegisterBackend;
pub use software::SoftwareCoprocessor;
