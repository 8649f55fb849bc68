// SPDX-License-Identifier: AGPL-3.0-only

//! Software coprocessor: the register file on top of the golden model.
//!
//! Implements [`RegisterBus`] with the register semantics of the bitstream,
//! so the register-level driver can be exercised end to end without an FPGA.
//!
//! ## Register behaviour
//!
//! | Register | Write | Read |
//! |----------|-------|------|
//! | STATUS | ignored | VALID bit, cleared by the read |
//! | CTRL | see below | latched `reg_mode`/`dt_mode` |
//! | T_IN | latch two's-complement byte | latched value |
//! | DT_IN | latch two's-complement byte | latched value |
//! | G_OUT | ignored | last result |
//!
//! A CTRL write with neither START nor INIT set latches the mode bits. A
//! write carrying a pulse fires it and leaves the latched modes alone; the
//! firmware writes pulses as bare `0b0001` / `0b1000`. When both pulses are
//! set, INIT runs before START.
//!
//! START evaluates the latched T_IN/DT_IN with the latched modes, stores G
//! in G_OUT and raises VALID. In `dt_mode = 1` the estimator is stepped with
//! T_IN and DT_IN is not read.

use crate::bus::RegisterBus;
use crate::error::{DriverError, Result};
use fuzzy_chip::regs::{self, ctrl, status, CtrlWord};
use fuzzy_model::{
    evaluate, CoprocessorConfig, DerivativeEstimator, DtSource, EstimatorParams, RuleMode,
    SampleResult,
};
use tracing::{debug, info, trace, warn};

/// In-process coprocessor with the bitstream's register file.
#[derive(Debug)]
pub struct SoftwareCoprocessor {
    config: CoprocessorConfig,
    estimator: DerivativeEstimator,

    // Register file
    t_in: u8,
    dt_in: u8,
    modes: u8,
    g_out: u8,
    valid: bool,

    last: Option<SampleResult>,
    evaluations: u64,
}

impl SoftwareCoprocessor {
    /// Power-on register file with the given configuration and the RTL
    /// estimator parameters.
    pub fn new(config: CoprocessorConfig) -> Self {
        info!("Software coprocessor: 5-register file over the golden model");
        Self {
            config,
            estimator: DerivativeEstimator::new(EstimatorParams::default()),
            t_in: 0,
            dt_in: 0,
            modes: 0,
            g_out: 0,
            valid: false,
            last: None,
            evaluations: 0,
        }
    }

    /// Replace the estimator parameters (resets the estimator).
    #[must_use]
    pub fn with_estimator(mut self, params: EstimatorParams) -> Self {
        self.estimator = DerivativeEstimator::new(params);
        self
    }

    /// Active configuration.
    pub const fn config(&self) -> &CoprocessorConfig {
        &self.config
    }

    /// Estimator register bank.
    pub const fn estimator(&self) -> &DerivativeEstimator {
        &self.estimator
    }

    /// Latched rule mode.
    pub const fn rule_mode(&self) -> RuleMode {
        RuleMode::from_ctrl(self.modes)
    }

    /// Latched dT source.
    pub const fn dt_source(&self) -> DtSource {
        DtSource::from_ctrl(self.modes)
    }

    /// Datapath internals of the last START.
    pub const fn last_result(&self) -> Option<&SampleResult> {
        self.last.as_ref()
    }

    /// START pulses served since power-on.
    pub const fn evaluations(&self) -> u64 {
        self.evaluations
    }

    fn write_ctrl(&mut self, value: u8) -> Result<()> {
        let word = CtrlWord::from_bits(value);
        if !word.has_pulse() {
            self.modes = value & ctrl::MODE_MASK;
            debug!("CTRL modes: {}, dT {}", self.rule_mode(), self.dt_source());
            return Ok(());
        }
        if word.init {
            self.estimator.init_pulse(i8::from_le_bytes([self.t_in]));
        }
        if word.start {
            self.start()?;
        }
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if self.valid {
            warn!("START while a result is unread; G_OUT is overwritten");
        }
        let t = i8::from_le_bytes([self.t_in]);
        let dt = i8::from_le_bytes([self.dt_in]);
        let (mode, source) = (self.rule_mode(), self.dt_source());
        let r = evaluate(
            t.into(),
            dt.into(),
            &self.config,
            mode,
            source,
            Some(&mut self.estimator),
        )?;
        self.g_out = r.g;
        self.valid = true;
        self.last = Some(r);
        self.evaluations += 1;
        Ok(())
    }
}

impl Default for SoftwareCoprocessor {
    fn default() -> Self {
        Self::new(CoprocessorConfig::default())
    }
}

impl RegisterBus for SoftwareCoprocessor {
    fn write_reg(&mut self, addr: u8, value: u8) -> Result<()> {
        trace!("WR {} <- 0x{:02X}", regs::name(addr).unwrap_or("?"), value);
        match addr {
            regs::CTRL => self.write_ctrl(value),
            regs::T_IN => {
                self.t_in = value;
                Ok(())
            }
            regs::DT_IN => {
                self.dt_in = value;
                Ok(())
            }
            regs::STATUS | regs::G_OUT => {
                debug!("Write to read-only register 0x{:02X} ignored", addr);
                Ok(())
            }
            _ => Err(DriverError::InvalidRegister { addr }),
        }
    }

    fn read_reg(&mut self, addr: u8) -> Result<u8> {
        let value = match addr {
            regs::STATUS => {
                let v = if self.valid { status::VALID } else { 0 };
                self.valid = false;
                v
            }
            regs::CTRL => self.modes,
            regs::T_IN => self.t_in,
            regs::DT_IN => self.dt_in,
            regs::G_OUT => self.g_out,
            _ => return Err(DriverError::InvalidRegister { addr }),
        };
        trace!("RD {} -> 0x{:02X}", regs::name(addr).unwrap_or("?"), value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzy_chip::regs::{CTRL_FULL_EXTERNAL, CTRL_FULL_INTERNAL, CTRL_PULSE_INIT, CTRL_PULSE_START};
    use fuzzy_model::EstimatorPhase;

    fn run_ext(sw: &mut SoftwareCoprocessor, t: i8, dt: i8) -> u8 {
        sw.write_reg(regs::T_IN, t.to_le_bytes()[0]).unwrap();
        sw.write_reg(regs::DT_IN, dt.to_le_bytes()[0]).unwrap();
        sw.write_reg(regs::CTRL, CTRL_PULSE_START).unwrap();
        assert_eq!(sw.read_reg(regs::STATUS).unwrap() & status::VALID, status::VALID);
        sw.read_reg(regs::G_OUT).unwrap()
    }

    #[test]
    fn firmware_sequence_external() {
        let mut sw = SoftwareCoprocessor::default();
        sw.write_reg(regs::CTRL, CTRL_FULL_EXTERNAL).unwrap();
        assert_eq!(run_ext(&mut sw, 0, 0), 50);
        assert_eq!(run_ext(&mut sw, -64, -10), 100);
        assert_eq!(run_ext(&mut sw, 64, 10), 0);
        assert_eq!(sw.evaluations(), 3);
    }

    #[test]
    fn pulses_do_not_touch_modes() {
        let mut sw = SoftwareCoprocessor::default();
        sw.write_reg(regs::CTRL, CTRL_FULL_EXTERNAL).unwrap();
        sw.write_reg(regs::CTRL, CTRL_PULSE_INIT).unwrap();
        sw.write_reg(regs::CTRL, CTRL_PULSE_START).unwrap();
        assert_eq!(sw.read_reg(regs::CTRL).unwrap(), CTRL_FULL_EXTERNAL);
        assert_eq!(sw.rule_mode(), RuleMode::Full);
    }

    #[test]
    fn corner_mode_after_power_on() {
        let mut sw = SoftwareCoprocessor::default();
        // Power-on modes are 0: 4 rules, external dT
        assert_eq!(run_ext(&mut sw, 0, 0), 0);
        assert_eq!(run_ext(&mut sw, -64, -10), 100);
    }

    #[test]
    fn status_is_sticky_until_read() {
        let mut sw = SoftwareCoprocessor::default();
        assert_eq!(sw.read_reg(regs::STATUS).unwrap(), 0);
        sw.write_reg(regs::CTRL, CTRL_PULSE_START).unwrap();
        sw.read_reg(regs::G_OUT).unwrap();
        assert_eq!(sw.read_reg(regs::STATUS).unwrap(), status::VALID);
        assert_eq!(sw.read_reg(regs::STATUS).unwrap(), 0);
    }

    #[test]
    fn init_then_start_in_one_write() {
        let mut sw = SoftwareCoprocessor::default();
        sw.write_reg(regs::CTRL, CTRL_FULL_INTERNAL).unwrap();
        sw.write_reg(regs::T_IN, 20).unwrap();
        sw.write_reg(regs::CTRL, ctrl::INIT | ctrl::START).unwrap();
        let r = sw.last_result().unwrap();
        // INIT captured T=20 first, so the step sees no delta
        assert_eq!(r.dt, 0);
        assert!(!r.dt_valid);
        assert_eq!(sw.estimator().phase(), EstimatorPhase::Steady);
    }

    #[test]
    fn internal_mode_ignores_dt_in() {
        let mut sw = SoftwareCoprocessor::default()
            .with_estimator(EstimatorParams::new(255, 0, 64).unwrap());
        sw.write_reg(regs::CTRL, CTRL_FULL_INTERNAL).unwrap();
        sw.write_reg(regs::T_IN, 0).unwrap();
        sw.write_reg(regs::DT_IN, 0x80).unwrap();
        sw.write_reg(regs::CTRL, CTRL_PULSE_INIT).unwrap();
        sw.write_reg(regs::CTRL, CTRL_PULSE_START).unwrap();
        assert_eq!(sw.last_result().unwrap().dt, 0);
        sw.write_reg(regs::T_IN, 10).unwrap();
        sw.write_reg(regs::CTRL, CTRL_PULSE_START).unwrap();
        let r = sw.last_result().unwrap();
        assert_eq!((r.dt, r.dt_valid, r.g), (9, true, 33));
    }

    #[test]
    fn inputs_are_twos_complement() {
        let mut sw = SoftwareCoprocessor::default();
        sw.write_reg(regs::CTRL, CTRL_FULL_EXTERNAL).unwrap();
        sw.write_reg(regs::T_IN, 0xC0).unwrap(); // -64
        sw.write_reg(regs::DT_IN, 0xF6).unwrap(); // -10
        sw.write_reg(regs::CTRL, CTRL_PULSE_START).unwrap();
        assert_eq!(sw.read_reg(regs::G_OUT).unwrap(), 100);
        assert_eq!(sw.last_result().unwrap().t, -64);
    }

    #[test]
    fn undecoded_address() {
        let mut sw = SoftwareCoprocessor::default();
        assert!(matches!(
            sw.write_reg(0x05, 1),
            Err(DriverError::InvalidRegister { addr: 0x05 })
        ));
        assert!(matches!(
            sw.read_reg(0x3F),
            Err(DriverError::InvalidRegister { addr: 0x3F })
        ));
        // Read-only registers swallow writes
        sw.write_reg(regs::G_OUT, 99).unwrap();
        assert_eq!(sw.read_reg(regs::G_OUT).unwrap(), 0);
    }
}
