// SPDX-License-Identifier: AGPL-3.0-only

//! Register bus abstraction.
//!
//! The coprocessor exposes five byte-wide registers behind a 6-bit address
//! decoder. Anything that can move a byte to or from an address is a
//! [`RegisterBus`]: the GPIO bit-banged parallel bus of the bring-up board,
//! an RTL simulator bridge, or the in-process
//! [`SoftwareCoprocessor`](crate::backends::SoftwareCoprocessor).

use crate::error::Result;
use fuzzy_chip::params::bus;
use std::fmt::Debug;
use std::time::Duration;

/// Byte-wide register access.
pub trait RegisterBus: Debug + Send {
    /// Write one register.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRegister` for undecoded addresses or `Bus` for
    /// transport failures.
    fn write_reg(&mut self, addr: u8, value: u8) -> Result<()>;

    /// Read one register. Reads may have side effects (STATUS clears VALID).
    ///
    /// # Errors
    ///
    /// Returns `InvalidRegister` for undecoded addresses or `Bus` for
    /// transport failures (RDY timeout).
    fn read_reg(&mut self, addr: u8) -> Result<u8>;
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn write_reg(&mut self, addr: u8, value: u8) -> Result<()> {
        (**self).write_reg(addr, value)
    }

    fn read_reg(&mut self, addr: u8) -> Result<u8> {
        (**self).read_reg(addr)
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for Box<B> {
    fn write_reg(&mut self, addr: u8, value: u8) -> Result<()> {
        (**self).write_reg(addr, value)
    }

    fn read_reg(&mut self, addr: u8) -> Result<u8> {
        (**self).read_reg(addr)
    }
}

/// STATUS.valid polling budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Give up after this long.
    pub timeout: Duration,
    /// Sleep between STATUS reads.
    pub interval: Duration,
}

impl PollConfig {
    /// Create a polling configuration.
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Set the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the poll interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// STATUS reads before giving up: one initial read plus one per interval.
    pub fn max_polls(&self) -> u32 {
        if self.interval.is_zero() {
            return 1;
        }
        let n = self.timeout.as_nanos() / self.interval.as_nanos();
        u32::try_from(n).unwrap_or(u32::MAX).saturating_add(1)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(bus::VALID_TIMEOUT_MS),
            Duration::from_millis(bus::VALID_POLL_MS),
        )
    }
}
