// SPDX-License-Identifier: AGPL-3.0-only

//! Parity checking of hardware captures against the model.
//!
//! A capture row is `T,dT,REG_MODE,DT_MODE,G`. Only `DT_MODE = 0` rows are
//! comparable sample by sample; estimator rows depend on history and are
//! skipped. Compared rows must match exactly when the model's `S_w` is 0 or
//! both inputs are 0, and within ±1 otherwise. Over the whole capture the
//! mean absolute error must stay at or below [`MAX_MAE`].

use crate::config::CoprocessorConfig;
use crate::csv::{parse_int, parse_s8, read_table};
use crate::engine::{infer, DtSource};
use crate::error::{FuzzyError, Result};
use crate::rules::RuleMode;
use std::io::BufRead;
use tracing::{info, warn};

/// Largest mean absolute error accepted over a capture (percentage points).
pub const MAX_MAE: f64 = 1.0;

/// Tolerance on rows that are not plateau/zero-weight cases.
pub const TOLERANCE: u8 = 1;

/// One captured hardware result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureRecord {
    /// T_IN as written.
    pub t: i8,
    /// DT_IN as written.
    pub dt: i8,
    /// CTRL `reg_mode`.
    pub mode: RuleMode,
    /// CTRL `dt_mode`.
    pub dt_source: DtSource,
    /// G_OUT as read.
    pub g: u8,
}

/// A compared row outside its tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    /// Offending capture.
    pub record: CaptureRecord,
    /// Model output for the same inputs.
    pub expected: u8,
    /// Tolerance that applied (0 or 1).
    pub tolerance: u8,
}

/// Result of a parity run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParityReport {
    /// Rows compared (`DT_MODE = 0`).
    pub compared: usize,
    /// Rows skipped (`DT_MODE = 1`).
    pub skipped: usize,
    /// Compared rows that matched exactly.
    pub exact: usize,
    /// Rows outside tolerance.
    pub violations: Vec<Violation>,
    /// Mean absolute error over compared rows.
    pub mae: f64,
}

impl ParityReport {
    /// No violations, enough samples and MAE within [`MAX_MAE`].
    pub fn passes(&self, min_samples: usize) -> bool {
        self.violations.is_empty() && self.compared >= min_samples && self.mae <= MAX_MAE
    }
}

impl std::fmt::Display for ParityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "compared={} skipped={} exact={} violations={} mae={:.3}",
            self.compared,
            self.skipped,
            self.exact,
            self.violations.len(),
            self.mae
        )
    }
}

/// Parse a capture file with columns `T,dT,REG_MODE,DT_MODE,G`.
///
/// # Errors
///
/// `Parse` for malformed rows or flag/G values out of range,
/// `InvalidInput` for T/dT outside s8, `Io` for read failures.
pub fn read_captures<R: BufRead>(reader: R) -> Result<Vec<CaptureRecord>> {
    read_table(reader, &["T", "dT", "REG_MODE", "DT_MODE", "G"])?
        .into_iter()
        .map(|row| {
            let f = &row.fields;
            let flag = |text: &str| -> Result<bool> {
                match parse_int(text, row.line)? {
                    0 => Ok(false),
                    1 => Ok(true),
                    v => Err(FuzzyError::parse(row.line, format!("flag must be 0 or 1, got {v}"))),
                }
            };
            let g = parse_int(&f[4], row.line)?;
            let g = u8::try_from(g)
                .map_err(|_| FuzzyError::parse(row.line, format!("G={g} out of range")))?;
            Ok(CaptureRecord {
                t: parse_s8("T", &f[0], row.line)?,
                dt: parse_s8("dT", &f[1], row.line)?,
                mode: RuleMode::from(flag(&f[2])?),
                dt_source: if flag(&f[3])? {
                    DtSource::Estimator
                } else {
                    DtSource::External
                },
                g,
            })
        })
        .collect()
}

/// Recompute every external-dT capture and compare.
pub fn check_parity(captures: &[CaptureRecord], config: &CoprocessorConfig) -> ParityReport {
    let mut report = ParityReport::default();
    let mut abs_err = 0u64;

    for rec in captures {
        if rec.dt_source == DtSource::Estimator {
            report.skipped += 1;
            continue;
        }
        let model = infer(rec.t, rec.dt, config, rec.mode);
        let tolerance = if model.sums.sum_weight == 0 || (rec.t == 0 && rec.dt == 0) {
            0
        } else {
            TOLERANCE
        };
        let diff = rec.g.abs_diff(model.g);

        report.compared += 1;
        abs_err += u64::from(diff);
        if diff == 0 {
            report.exact += 1;
        }
        if diff > tolerance {
            warn!(
                "Parity violation at T={} dT={} ({}): hw={} model={}",
                rec.t, rec.dt, rec.mode, rec.g, model.g
            );
            report.violations.push(Violation {
                record: *rec,
                expected: model.g,
                tolerance,
            });
        }
    }

    if report.compared > 0 {
        #[allow(clippy::cast_precision_loss)]
        let mae = abs_err as f64 / report.compared as f64;
        report.mae = mae;
    }
    info!("Parity: {}", report);
    report
}
