//! Shared bootstrap for the two pipeline binaries.
//!
//! Each binary is a zero-argument operation: read `songlake.toml` from the
//! working directory (or `$SONGLAKE_CONFIG`), open the warehouse, run one
//! phase to completion. The first error propagates out of `main` and exits
//! the process non-zero with the underlying message; log lines already
//! emitted show how far the run progressed.

use anyhow::Result;

use songlake_core::Config;
use songlake_duckdb::WarehouseBackend;

/// Initialise logging. Level controlled via `RUST_LOG`, defaulting the
/// pipeline crates to `info`.
pub fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("songlake_duckdb=info".parse()?)
                .add_directive("songlake_cli=info".parse()?),
        )
        .init();
    Ok(())
}

/// Load the config and open the warehouse it points at.
pub fn open_warehouse() -> Result<(Config, WarehouseBackend)> {
    let config = Config::from_working_dir()?;
    let db = WarehouseBackend::open(&config.warehouse.path, &config.warehouse.memory_limit)?;
    Ok((config, db))
}
