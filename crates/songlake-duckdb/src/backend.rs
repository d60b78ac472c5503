use anyhow::Result;
use duckdb::Connection;
use tracing::info;

use crate::schema::session_init_sql;

/// A DuckDB connection wrapper for the loading pipeline.
///
/// The pipeline is single-threaded and strictly sequential: one connection,
/// statements executed one at a time in source-list order, each auto-committed
/// before the next begins. A statement failure propagates immediately and
/// aborts the remaining queue — there is no retry and no partial-success
/// bookkeeping; the operator re-runs from provisioning after fixing the cause.
///
/// Running two pipeline instances against the same database file concurrently
/// is unsupported (interleaved drops/creates/inserts).
pub struct WarehouseBackend {
    conn: Connection,
}

impl WarehouseBackend {
    /// Open (or create) the warehouse database file at `path`.
    ///
    /// `memory_limit` is a DuckDB size string such as `"1GB"`; it is read from
    /// `Config.warehouse.memory_limit` at the call site.
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&session_init_sql(memory_limit))?;
        info!("warehouse opened at {} with memory_limit={}", path, memory_limit);
        Ok(Self { conn })
    }

    /// Open an **in-memory** warehouse.
    ///
    /// Intended for tests — data is discarded when the struct is dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&session_init_sql("1GB"))?;
        Ok(Self { conn })
    }

    /// Execute an ordered statement list, logging each statement before it
    /// runs. Each statement auto-commits on success; the first failure aborts
    /// the rest of the list and propagates the engine error unmodified.
    pub fn run_statements<S: AsRef<str>>(&self, phase: &str, statements: &[S]) -> Result<()> {
        for statement in statements {
            let statement = statement.as_ref();
            info!("[{phase}] running statement:\n{}", statement.trim());
            self.conn.execute_batch(statement)?;
        }
        Ok(())
    }

    /// Direct access to the underlying connection, for ad-hoc queries in
    /// tests and tooling.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
