// SPDX-License-Identifier: AGPL-3.0-only

//! Register backend: the full bus protocol through [`Coprocessor`].
//!
//! Works over any [`RegisterBus`]. With a
//! [`SoftwareCoprocessor`](super::SoftwareCoprocessor) underneath it checks
//! the protocol sequencing against the model; with a hardware bus it is the
//! capture side of a parity run.

use crate::backend::{BackendType, CoprocessorBackend};
use crate::bus::{PollConfig, RegisterBus};
use crate::device::Coprocessor;
use crate::error::Result;
use fuzzy_model::{DtSource, RuleMode};
use tracing::info;

/// Backend that drives the register protocol.
#[derive(Debug)]
pub struct RegisterBackend<B: RegisterBus> {
    device: Coprocessor<B>,
    source: DtSource,
}

impl<B: RegisterBus> RegisterBackend<B> {
    /// Create a backend over `bus`.
    pub fn new(bus: B) -> Self {
        info!("Register backend over {}", std::any::type_name::<B>());
        Self {
            device: Coprocessor::new(bus),
            source: DtSource::External,
        }
    }

    /// Use a different STATUS polling budget.
    #[must_use]
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.device = self.device.with_poll(poll);
        self
    }

    /// Protocol driver.
    pub const fn device(&self) -> &Coprocessor<B> {
        &self.device
    }

    /// Release the bus.
    pub fn into_inner(self) -> B {
        self.device.into_inner()
    }
}

impl<B: RegisterBus> CoprocessorBackend for RegisterBackend<B> {
    fn configure(&mut self, mode: RuleMode, source: DtSource) -> Result<()> {
        self.source = source;
        self.device.set_modes(mode, source)
    }

    fn init(&mut self, t: i8) -> Result<()> {
        self.device.arm_estimator(t)
    }

    fn run(&mut self, t: i8, dt: i8) -> Result<u8> {
        match self.source {
            DtSource::External => self.device.run_once_external(t, dt),
            DtSource::Estimator => self.device.run_once_internal(t),
        }
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Register
    }

    fn rule_mode(&self) -> RuleMode {
        self.device.rule_mode()
    }

    fn dt_source(&self) -> DtSource {
        self.source
    }
}
