pub mod backend;
pub mod copy;
pub mod pipeline;
pub mod schema;
pub mod transforms;

pub use backend::WarehouseBackend;

/// Re-export the `duckdb` crate so consumers (especially tests) can use
/// `songlake_duckdb::duckdb::params!` without an extra dependency.
pub use duckdb;
