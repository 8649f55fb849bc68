// SPDX-License-Identifier: AGPL-3.0-only

//! Estimator over the register protocol
//!
//! Arms the on-chip derivative estimator and feeds it a heating ramp, a hold
//! and a sudden drop (door opened), printing T, the estimated dT and G per
//! sample.

use anyhow::Result;
use fuzzy_driver::{Coprocessor, SoftwareCoprocessor};
use fuzzy_model::{DtSource, RuleMode};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "fuzzy_driver=info".into()),
        )
        .init();

    let mut samples: Vec<i8> = (0..20).map(|i| -40 + i * 2).collect();
    samples.extend([0i8; 10]);
    samples.extend((0..10).map(|i| -i * 8));

    let mut dev = Coprocessor::new(SoftwareCoprocessor::default());
    dev.set_modes(RuleMode::Full, DtSource::Estimator)?;
    dev.arm_estimator(samples[0])?;

    println!("{:>4} {:>4} {:>5} {:>4}", "T", "dT", "valid", "G");
    for &t in &samples {
        let g = dev.run_once_internal(t)?;
        if let Some(r) = dev.bus().last_result() {
            println!("{:>4} {:>4} {:>5} {:>4}", t, r.dt, r.dt_valid, g);
        }
    }
    Ok(())
}
