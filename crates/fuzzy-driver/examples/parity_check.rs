// SPDX-License-Identifier: AGPL-3.0-only

//! Hardware parity check
//!
//! Compares a capture file (columns `T,dT,REG_MODE,DT_MODE,G`) against the
//! model. Without an argument, captures the heatmap through the software
//! register file first, which must come out exact.
//!
//! ```text
//! cargo run -p fuzzy-driver --example parity_check [captures.csv]
//! ```

use anyhow::{bail, Context, Result};
use fuzzy_driver::{capture, RegisterBackend, SoftwareCoprocessor};
use fuzzy_model::batch::heatmap;
use fuzzy_model::parity::{check_parity, read_captures};
use fuzzy_model::{CoprocessorConfig, RuleMode};
use std::fs::File;
use std::io::BufReader;
use tracing_subscriber::EnvFilter;

/// Minimum compared rows for a capture to count.
const MIN_SAMPLES: usize = 100;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fuzzy_driver=info,fuzzy_model=info".into()),
        )
        .init();

    let config = CoprocessorConfig::default();
    let captures = match std::env::args().nth(1) {
        Some(path) => {
            let file = File::open(&path).with_context(|| format!("opening {path}"))?;
            read_captures(BufReader::new(file)).with_context(|| format!("parsing {path}"))?
        }
        None => {
            let mut backend = RegisterBackend::new(SoftwareCoprocessor::new(config));
            capture(&mut backend, &heatmap(), RuleMode::Full)?.records
        }
    };

    let report = check_parity(&captures, &config);
    println!("{report}");
    for v in report.violations.iter().take(20) {
        println!(
            "  T={:>4} dT={:>4} {}: hw={:>3} model={:>3} (tol {})",
            v.record.t, v.record.dt, v.record.mode, v.record.g, v.expected, v.tolerance
        );
    }
    if !report.passes(MIN_SAMPLES) {
        bail!("parity check failed");
    }
    println!("PASS");
    Ok(())
}
