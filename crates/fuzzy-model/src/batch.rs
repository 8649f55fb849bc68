// SPDX-License-Identifier: AGPL-3.0-only

//! Batch evaluation over input vectors.
//!
//! Reads `T,dT` vector files, evaluates them on the external-dT path and
//! writes `T,dT,G_out,S_w,S_wg` result files. The generators reproduce the
//! sweeps the RTL bench and the bring-up firmware run, so model output can
//! be diffed against either.

use crate::config::CoprocessorConfig;
use crate::csv::{parse_s8, read_table};
use crate::engine::infer;
use crate::error::Result;
use crate::rules::RuleMode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{BufRead, Write};
use tracing::{debug, info};

/// Seed of the regression random block.
pub const REGRESSION_SEED: u64 = 0x00C0_FFEE;

/// One `(T, dT)` input pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputVector {
    /// Temperature input.
    pub t: i8,
    /// External derivative input.
    pub dt: i8,
}

impl InputVector {
    /// Pair up two inputs.
    pub const fn new(t: i8, dt: i8) -> Self {
        Self { t, dt }
    }
}

/// One evaluated vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchRecord {
    /// Temperature input.
    pub t: i8,
    /// External derivative input.
    pub dt: i8,
    /// Crisp output.
    pub g_out: u8,
    /// `S_w`
    pub sum_weight: u16,
    /// `S_wg`
    pub sum_weighted_output: u16,
}

/// Parse a vector file with `T` and `dT` columns (any order, extra columns
/// ignored). Values are decimal or `0x` hex.
///
/// # Errors
///
/// `Parse` for malformed files, `InvalidInput` for values outside s8,
/// `Io` for read failures.
pub fn read_vectors<R: BufRead>(reader: R) -> Result<Vec<InputVector>> {
    read_table(reader, &["T", "dT"])?
        .into_iter()
        .map(|row| {
            Ok(InputVector {
                t: parse_s8("T", &row.fields[0], row.line)?,
                dt: parse_s8("dT", &row.fields[1], row.line)?,
            })
        })
        .collect()
}

/// Evaluate every vector with its external dT.
pub fn evaluate_batch(
    vectors: &[InputVector],
    config: &CoprocessorConfig,
    mode: RuleMode,
) -> Vec<BatchRecord> {
    info!("Batch: {} vectors, {}", vectors.len(), mode);
    vectors
        .iter()
        .map(|v| {
            let r = infer(v.t, v.dt, config, mode);
            BatchRecord {
                t: v.t,
                dt: v.dt,
                g_out: r.g,
                sum_weight: r.sums.sum_weight,
                sum_weighted_output: r.sums.sum_weighted_output,
            }
        })
        .collect()
}

/// Write records with header `T,dT,G_out,S_w,S_wg`.
///
/// # Errors
///
/// `Io` if the writer fails.
pub fn write_records<W: Write>(mut writer: W, records: &[BatchRecord]) -> Result<()> {
    writeln!(writer, "T,dT,G_out,S_w,S_wg")?;
    for r in records {
        writeln!(
            writer,
            "{},{},{},{},{}",
            r.t, r.dt, r.g_out, r.sum_weight, r.sum_weighted_output
        )?;
    }
    writer.flush()?;
    debug!("Wrote {} records", records.len());
    Ok(())
}

// ── Vector generators ────────────────────────────────────────────────────────

fn product(ts: impl IntoIterator<Item = i8>, dts: &[i8]) -> Vec<InputVector> {
    ts.into_iter()
        .flat_map(|t| dts.iter().map(move |&dt| InputVector::new(t, dt)))
        .collect()
}

fn stepped(from: i8, to: i8, step: usize) -> Vec<i8> {
    (from..=to).step_by(step).collect()
}

/// 10 × 7 bench grid.
pub fn grid_vectors() -> Vec<InputVector> {
    const TS: [i8; 10] = [-128, -64, -32, -16, 0, 16, 32, 64, 96, 127];
    const DTS: [i8; 7] = [-60, -30, -10, 0, 10, 30, 60];
    product(TS, &DTS)
}

/// T from -128 to 126 in steps of 2, dT = 0.
pub fn t_sweep() -> Vec<InputVector> {
    product(stepped(-128, 127, 2), &[0])
}

/// T ∈ {-32, 0, 32} × dT from -60 to 60 in steps of 4.
pub fn dt_lines() -> Vec<InputVector> {
    product([-32, 0, 32], &stepped(-60, 60, 4))
}

/// T from -64 to 64 step 8 × dT from -60 to 60 step 5.
pub fn heatmap() -> Vec<InputVector> {
    product(stepped(-64, 64, 8), &stepped(-60, 60, 5))
}

/// `n` vectors uniform over `[-128, 127]²`, reproducible from `seed`.
pub fn random_vectors(seed: u64, n: usize) -> Vec<InputVector> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| InputVector::new(rng.gen_range(-128..=127), rng.gen_range(-128..=127)))
        .collect()
}
