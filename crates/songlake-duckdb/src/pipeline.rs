//! The two operator-facing pipeline phases.
//!
//! Both share the same shape: obtain a connection, execute an ordered list of
//! statements (each committed on its own), stop at the first error. A failed
//! run is recovered by re-running from provisioning; partial state is never
//! patched up in place.

use anyhow::Result;
use tracing::info;

use songlake_core::Config;

use crate::backend::WarehouseBackend;
use crate::{copy, schema, transforms};

/// Drop and recreate the entire schema. Destroys all table contents
/// irrecoverably; safe to run repeatedly (drops are IF EXISTS).
pub fn provision_schema(db: &WarehouseBackend) -> Result<()> {
    info!("dropping tables");
    db.run_statements("drop", &schema::drop_statements())?;
    info!("creating tables");
    db.run_statements("create", &schema::create_statements())?;
    info!("schema provisioned");
    Ok(())
}

/// Bulk-load the staging tables from object storage, then transform them into
/// the star schema. Assumes a freshly provisioned schema: the staging loads
/// are appends and the dimension inserts collide with existing keys on rerun.
pub fn run_load(db: &WarehouseBackend, config: &Config) -> Result<()> {
    let copies = copy::copy_statements(config)?;
    info!("loading staging tables");
    db.run_statements("copy", &copies)?;
    info!("transforming staged rows into the star schema");
    db.run_statements("transform", &transforms::transform_statements())?;
    info!("load complete");
    Ok(())
}
