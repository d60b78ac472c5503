use anyhow::Result;
use tracing::info;

fn main() -> Result<()> {
    songlake_cli::init_tracing()?;
    let (config, db) = songlake_cli::open_warehouse()?;
    songlake_duckdb::pipeline::run_load(&db, &config)?;
    info!("load finished");
    Ok(())
}
