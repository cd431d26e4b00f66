//! improver-spot-extract
//!
//! Extracts gridded diagnostic values at spot sites.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use spot_extract::{logging, run, Args, NetCdfStore};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // RUST_LOG takes precedence over --log-level
    let filter = logging::env_filter(&args.log_level);
    tracing::subscriber::set_global_default(logging::subscriber(filter, std::io::stderr))?;

    netcdf_parser::silence_hdf5_errors();

    let report = run(&NetCdfStore, &args.to_request())?;
    info!(
        method = %report.method,
        lapse_rate_applied = report.lapse_rate_applied,
        metadata_amended = report.metadata_amended,
        warnings = report.warnings.len(),
        "Spot extraction complete"
    );

    Ok(())
}
