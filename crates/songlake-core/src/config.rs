use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Default config file name, resolved against the working directory.
/// Override the location with the `SONGLAKE_CONFIG` env var.
pub const DEFAULT_CONFIG_FILE: &str = "songlake.toml";

/// Pipeline configuration, loaded once at startup and passed explicitly to
/// whichever component builds statements — statement construction must never
/// read global state.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub warehouse: WarehouseConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
}

/// Where the warehouse database lives and how much memory the engine may use.
#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseConfig {
    /// DuckDB database file path — the pipeline's connection string.
    pub path: String,
    /// DuckDB size string such as `"1GB"` or `"512MB"`. Always set an explicit
    /// limit; the engine default (80% of system RAM) is not acceptable for a
    /// batch process sharing a host.
    #[serde(default = "default_memory_limit")]
    pub memory_limit: String,
}

/// Identity used by the bulk-load statements to authenticate against object
/// storage. Optional: local file globs need no credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// IAM role ARN assumed for `s3://` reads. When absent, no storage secret
    /// is created and only unauthenticated/local paths work.
    pub role_arn: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            role_arn: None,
            region: default_region(),
        }
    }
}

/// Source locations for the two bulk loads.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Glob for the raw activity-log objects (newline-delimited JSON).
    pub log_data: String,
    /// Side-file describing how the log JSON fields map to staging columns.
    /// A JSON object of field name → column type, read from local disk.
    pub log_fields: PathBuf,
    /// Glob for the song-catalog objects (one JSON object per file).
    pub song_data: String,
}

fn default_memory_limit() -> String {
    "1GB".to_string()
}

fn default_region() -> String {
    "us-west-2".to_string()
}

impl Config {
    /// Read and parse the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `$SONGLAKE_CONFIG`, falling back to `./songlake.toml`.
    pub fn from_working_dir() -> Result<Self, ConfigError> {
        let path = std::env::var("SONGLAKE_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load(Path::new(&path))
    }
}
