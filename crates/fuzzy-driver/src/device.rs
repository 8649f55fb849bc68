// SPDX-License-Identifier: AGPL-3.0-only

//! Register-level protocol driver.
//!
//! [`Coprocessor`] owns its bus handle and issues the same register sequence
//! as the bring-up firmware:
//!
//! ```text
//! external dT:  CTRL=modes  T_IN  DT_IN  CTRL=INIT  CTRL=START  poll STATUS  G_OUT
//! estimator dT: CTRL=modes  T_IN         CTRL=START  poll STATUS  G_OUT
//! ```
//!
//! The estimator is armed separately with [`Coprocessor::arm_estimator`],
//! since an INIT on every sample would clear its history.

use crate::bus::{PollConfig, RegisterBus};
use crate::error::{DriverError, Result};
use fuzzy_chip::params::G_MAX;
use fuzzy_chip::regs::{self, status, CTRL_PULSE_INIT, CTRL_PULSE_START};
use fuzzy_model::{DtSource, RuleMode};
use tracing::{debug, info};

/// Single-owner handle to one coprocessor behind a register bus.
#[derive(Debug)]
pub struct Coprocessor<B: RegisterBus> {
    bus: B,
    poll: PollConfig,
    mode: RuleMode,
}

impl<B: RegisterBus> Coprocessor<B> {
    /// Wrap a bus. Runs use the full 9-rule grid until [`Self::set_modes`]
    /// says otherwise.
    pub fn new(bus: B) -> Self {
        info!("Coprocessor driver attached to {}", std::any::type_name::<B>());
        Self {
            bus,
            poll: PollConfig::default(),
            mode: RuleMode::Full,
        }
    }

    /// Use a different STATUS polling budget.
    #[must_use]
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Borrow the bus.
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Release the bus.
    pub fn into_inner(self) -> B {
        self.bus
    }

    /// Rule mode used by the `run_once_*` helpers.
    pub const fn rule_mode(&self) -> RuleMode {
        self.mode
    }

    /// Latch `reg_mode` and `dt_mode`.
    ///
    /// # Errors
    ///
    /// Propagates bus errors.
    pub fn set_modes(&mut self, mode: RuleMode, source: DtSource) -> Result<()> {
        self.mode = mode;
        self.bus.write_reg(regs::CTRL, mode.ctrl_bits() | source.ctrl_bits())
    }

    /// Write T_IN and DT_IN.
    ///
    /// # Errors
    ///
    /// Propagates bus errors.
    pub fn write_inputs(&mut self, t: i8, dt: i8) -> Result<()> {
        self.bus.write_reg(regs::T_IN, t.to_le_bytes()[0])?;
        self.bus.write_reg(regs::DT_IN, dt.to_le_bytes()[0])
    }

    /// Fire INIT.
    ///
    /// # Errors
    ///
    /// Propagates bus errors.
    pub fn pulse_init(&mut self) -> Result<()> {
        self.bus.write_reg(regs::CTRL, CTRL_PULSE_INIT)
    }

    /// Fire START.
    ///
    /// # Errors
    ///
    /// Propagates bus errors.
    pub fn pulse_start(&mut self) -> Result<()> {
        self.bus.write_reg(regs::CTRL, CTRL_PULSE_START)
    }

    /// Poll STATUS until VALID is set; returns the number of reads issued.
    ///
    /// # Errors
    ///
    /// Returns `ValidTimeout` when the budget runs out, or bus errors.
    pub fn poll_valid(&mut self) -> Result<u32> {
        let max = self.poll.max_polls();
        for n in 1..=max {
            if self.bus.read_reg(regs::STATUS)? & status::VALID != 0 {
                return Ok(n);
            }
            if n < max {
                std::thread::sleep(self.poll.interval);
            }
        }
        Err(DriverError::ValidTimeout {
            polls: max,
            waited_ms: u64::try_from(self.poll.timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// Read G_OUT.
    ///
    /// # Errors
    ///
    /// Returns `Bus` if the value is outside 0..=100, or bus errors.
    pub fn read_result(&mut self) -> Result<u8> {
        let g = self.bus.read_reg(regs::G_OUT)?;
        if g > G_MAX {
            return Err(DriverError::bus(format!("G_OUT={g} outside 0..={G_MAX}")));
        }
        Ok(g)
    }

    /// One evaluation with an external dT.
    ///
    /// # Errors
    ///
    /// Propagates bus errors and `ValidTimeout`.
    pub fn run_once_external(&mut self, t: i8, dt: i8) -> Result<u8> {
        self.set_modes(self.mode, DtSource::External)?;
        self.write_inputs(t, dt)?;
        self.pulse_init()?;
        self.pulse_start()?;
        let polls = self.poll_valid()?;
        let g = self.read_result()?;
        debug!("T={} dT={} -> G={} ({} polls)", t, dt, g, polls);
        Ok(g)
    }

    /// Capture `t` as the estimator baseline (T_IN, then INIT).
    ///
    /// # Errors
    ///
    /// Propagates bus errors.
    pub fn arm_estimator(&mut self, t: i8) -> Result<()> {
        self.set_modes(self.mode, DtSource::Estimator)?;
        self.bus.write_reg(regs::T_IN, t.to_le_bytes()[0])?;
        self.pulse_init()
    }

    /// One evaluation with the on-chip estimator supplying dT.
    ///
    /// # Errors
    ///
    /// Propagates bus errors and `ValidTimeout`.
    pub fn run_once_internal(&mut self, t: i8) -> Result<u8> {
        self.set_modes(self.mode, DtSource::Estimator)?;
        self.bus.write_reg(regs::T_IN, t.to_le_bytes()[0])?;
        self.pulse_start()?;
        let polls = self.poll_valid()?;
        let g = self.read_result()?;
        debug!("T={} (estimator) -> G={} ({} polls)", t, g, polls);
        Ok(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::SoftwareCoprocessor;
    use std::time::Duration;

    /// Bus that records writes and never raises VALID.
    #[derive(Debug, Default)]
    struct StuckBus {
        writes: Vec<(u8, u8)>,
        status_reads: u32,
        g_out: u8,
    }

    impl RegisterBus for StuckBus {
        fn write_reg(&mut self, addr: u8, value: u8) -> Result<()> {
            self.writes.push((addr, value));
            Ok(())
        }

        fn read_reg(&mut self, addr: u8) -> Result<u8> {
            match addr {
                regs::STATUS => {
                    self.status_reads += 1;
                    Ok(0)
                }
                regs::G_OUT => Ok(self.g_out),
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn external_sequence_matches_firmware() {
        let mut dev = Coprocessor::new(StuckBus::default())
            .with_poll(PollConfig::new(Duration::from_millis(2), Duration::from_millis(1)));
        let e = dev.run_once_external(-64, -10);
        assert!(matches!(e, Err(DriverError::ValidTimeout { polls: 3, .. })));
        let bus = dev.into_inner();
        assert_eq!(
            bus.writes,
            vec![
                (regs::CTRL, 0b0010),
                (regs::T_IN, 0xC0),
                (regs::DT_IN, 0xF6),
                (regs::CTRL, 0b1000),
                (regs::CTRL, 0b0001),
            ]
        );
        assert_eq!(bus.status_reads, 3);
    }

    #[test]
    fn internal_sequence_has_no_init() {
        let mut dev = Coprocessor::new(StuckBus::default())
            .with_poll(PollConfig::default().with_interval(Duration::ZERO));
        dev.set_modes(RuleMode::Corners, DtSource::External).unwrap();
        assert!(dev.run_once_internal(5).is_err());
        let bus = dev.into_inner();
        assert_eq!(
            bus.writes[1..],
            [(regs::CTRL, 0b0100), (regs::T_IN, 5), (regs::CTRL, 0b0001)]
        );
    }

    #[test]
    fn out_of_range_result_rejected() {
        let mut dev = Coprocessor::new(StuckBus {
            g_out: 101,
            ..StuckBus::default()
        });
        assert!(matches!(dev.read_result(), Err(DriverError::Bus { .. })));
    }

    #[test]
    fn software_coprocessor_round_trip() {
        let mut dev = Coprocessor::new(SoftwareCoprocessor::default());
        assert_eq!(dev.run_once_external(0, 0).unwrap(), 50);
        assert_eq!(dev.run_once_external(-64, -10).unwrap(), 100);
        assert_eq!(dev.run_once_external(64, 10).unwrap(), 0);

        dev.set_modes(RuleMode::Corners, DtSource::External).unwrap();
        assert_eq!(dev.run_once_external(0, 0).unwrap(), 0);
        assert_eq!(dev.bus().evaluations(), 4);
    }

    #[test]
    fn estimator_over_registers() {
        let mut dev = Coprocessor::new(SoftwareCoprocessor::default());
        dev.arm_estimator(0).unwrap();
        assert_eq!(dev.run_once_internal(0).unwrap(), 50);
        let r = dev.bus().last_result().unwrap();
        assert!(!r.dt_valid);
        dev.run_once_internal(0).unwrap();
        assert!(dev.bus().last_result().unwrap().dt_valid);
    }

    #[test]
    fn borrowed_bus() {
        let mut sw = SoftwareCoprocessor::default();
        {
            let mut dev = Coprocessor::new(&mut sw);
            dev.run_once_external(0, 0).unwrap();
        }
        assert_eq!(sw.evaluations(), 1);
    }
}
