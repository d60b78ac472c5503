use anyhow::Result;
use tracing::info;

fn main() -> Result<()> {
    songlake_cli::init_tracing()?;
    let (_config, db) = songlake_cli::open_warehouse()?;
    songlake_duckdb::pipeline::provision_schema(&db)?;
    info!("provisioning finished");
    Ok(())
}
