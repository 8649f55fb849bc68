// SPDX-License-Identifier: AGPL-3.0-only

//! Golden vector batch
//!
//! Evaluates a vector file (columns `T,dT`) or the built-in grid through the
//! model and prints `T,dT,G_out,S_w,S_wg` rows.
//!
//! ```text
//! cargo run -p fuzzy-driver --example golden_vectors [vectors.csv] [--corners]
//! ```

use anyhow::{Context, Result};
use fuzzy_model::batch::{evaluate_batch, grid_vectors, read_vectors, write_records};
use fuzzy_model::{CoprocessorConfig, RuleMode};
use std::fs::File;
use std::io::BufReader;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "fuzzy_model=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = if args.iter().any(|a| a == "--corners") {
        RuleMode::Corners
    } else {
        RuleMode::Full
    };

    let vectors = match args.iter().find(|a| !a.starts_with("--")) {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {path}"))?;
            read_vectors(BufReader::new(file)).with_context(|| format!("parsing {path}"))?
        }
        None => grid_vectors(),
    };

    let records = evaluate_batch(&vectors, &CoprocessorConfig::default(), mode);
    write_records(std::io::stdout().lock(), &records)?;
    Ok(())
}
