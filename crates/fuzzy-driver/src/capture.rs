// SPDX-License-Identifier: AGPL-3.0-only

//! Capture runs through any backend
//!
//! Drives a list of input vectors (or a temperature stream for the
//! estimator) through a [`CoprocessorBackend`] and records what came back in
//! the `T,dT,REG_MODE,DT_MODE,G` capture format that
//! [`fuzzy_model::parity::check_parity`] consumes.

use crate::backend::CoprocessorBackend;
use crate::error::Result;
use fuzzy_model::batch::InputVector;
use fuzzy_model::parity::CaptureRecord;
use fuzzy_model::{DtSource, RuleMode};
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Captured records with timing
#[derive(Debug, Clone, Default)]
pub struct CaptureRun {
    /// One record per evaluation, in issue order
    pub records: Vec<CaptureRecord>,

    /// Wall time for the whole run
    pub total_duration: Duration,
}

impl CaptureRun {
    /// Evaluations per second
    pub fn throughput(&self) -> f64 {
        let secs = self.total_duration.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.records.len() as f64;
        n / secs
    }

    /// G values only
    pub fn outputs(&self) -> Vec<u8> {
        self.records.iter().map(|r| r.g).collect()
    }
}

/// Run every vector with an external dT.
///
/// # Errors
///
/// Stops at the first backend error.
pub fn capture(
    backend: &mut dyn CoprocessorBackend,
    vectors: &[InputVector],
    mode: RuleMode,
) -> Result<CaptureRun> {
    info!(
        "Capturing {} vectors on {} ({})",
        vectors.len(),
        backend.backend_type(),
        mode
    );
    backend.configure(mode, DtSource::External)?;

    let start = Instant::now();
    let mut records = Vec::with_capacity(vectors.len());
    for v in vectors {
        let g = backend.run(v.t, v.dt)?;
        records.push(CaptureRecord {
            t: v.t,
            dt: v.dt,
            mode,
            dt_source: DtSource::External,
            g,
        });
    }
    let run = CaptureRun {
        records,
        total_duration: start.elapsed(),
    };
    info!(
        "Captured {} results in {:?} ({:.0}/s)",
        run.records.len(),
        run.total_duration,
        run.throughput()
    );
    Ok(run)
}

/// Arm the estimator on the first sample, then run the whole stream with
/// the estimator supplying dT.
///
/// The dT column of the returned records is 0, since DT_IN is not written on
/// this path.
///
/// # Errors
///
/// Stops at the first backend error.
pub fn capture_stream(
    backend: &mut dyn CoprocessorBackend,
    samples: &[i8],
    mode: RuleMode,
) -> Result<CaptureRun> {
    info!(
        "Capturing {}-sample estimator stream on {} ({})",
        samples.len(),
        backend.backend_type(),
        mode
    );
    backend.configure(mode, DtSource::Estimator)?;
    let Some(&first) = samples.first() else {
        return Ok(CaptureRun::default());
    };
    backend.init(first)?;

    let start = Instant::now();
    let mut records = Vec::with_capacity(samples.len());
    for &t in samples {
        let g = backend.run(t, 0)?;
        records.push(CaptureRecord {
            t,
            dt: 0,
            mode,
            dt_source: DtSource::Estimator,
            g,
        });
    }
    Ok(CaptureRun {
        records,
        total_duration: start.elapsed(),
    })
}

/// Write records with header `T,dT,REG_MODE,DT_MODE,G`.
///
/// # Errors
///
/// `Io` if the writer fails.
pub fn write_captures<W: Write>(mut writer: W, records: &[CaptureRecord]) -> Result<()> {
    writeln!(writer, "T,dT,REG_MODE,DT_MODE,G")?;
    for r in records {
        writeln!(
            writer,
            "{},{},{},{},{}",
            r.t,
            r.dt,
            u8::from(r.mode == RuleMode::Full),
            u8::from(r.dt_source == DtSource::Estimator),
            r.g
        )?;
    }
    writer.flush()?;
    debug!("Wrote {} capture rows", records.len());
    Ok(())
}
