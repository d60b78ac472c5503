//! Bulk-ingestion statement builders.
//!
//! The engine reads the source objects itself via `read_json`; the pipeline
//! never touches them. Paths, the IAM role and the region come from the
//! config and are embedded as literals, so everything interpolated here is
//! validated or escaped first — field names must be bare identifiers, column
//! types must come from a fixed allowlist, and string values have their
//! quotes doubled.
//!
//! These loads are non-idempotent appends: running them twice without
//! re-provisioning doubles the staging contents. Provisioning is expected to
//! run first in the same deployment cycle.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};

use songlake_core::Config;

/// Column types the log-fields side-file may declare.
const ALLOWED_COLUMN_TYPES: &[&str] = &[
    "VARCHAR", "INTEGER", "BIGINT", "SMALLINT", "DOUBLE", "FLOAT", "BOOLEAN",
];

/// Escape a string for embedding as a single-quoted SQL literal.
fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The events side-file: a JSON object mapping log JSON field names to
/// staging column types. It pins the shape of the events load the way a
/// path-schema file does for engines that cannot infer nested JSON — fields
/// absent from a given log line land as NULL, fields not listed are ignored.
#[derive(Debug, Clone)]
pub struct LogFieldMap {
    fields: BTreeMap<String, String>,
}

impl LogFieldMap {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read log-fields side-file {}", path.display()))?;
        let fields: BTreeMap<String, String> = serde_json::from_str(&raw)
            .with_context(|| format!("invalid log-fields side-file {}", path.display()))?;
        Self::new(fields)
    }

    pub fn new(fields: BTreeMap<String, String>) -> Result<Self> {
        if fields.is_empty() {
            bail!("log-fields side-file declares no fields");
        }
        for (name, column_type) in &fields {
            if !is_bare_identifier(name) {
                bail!("log field {name:?} is not a bare identifier");
            }
            let upper = column_type.to_ascii_uppercase();
            if !ALLOWED_COLUMN_TYPES.contains(&upper.as_str()) {
                bail!("log field {name:?} declares unsupported column type {column_type:?}");
            }
        }
        Ok(Self { fields })
    }

    /// Render the `columns = {...}` struct for `read_json`.
    fn columns_clause(&self) -> String {
        let entries: Vec<String> = self
            .fields
            .iter()
            .map(|(name, column_type)| {
                format!("{name}: '{}'", column_type.to_ascii_uppercase())
            })
            .collect();
        format!("{{{}}}", entries.join(", "))
    }
}

/// `CREATE SECRET` authenticating `s3://` reads via an assumed IAM role.
/// Only emitted when a role is configured — local file globs need none.
pub fn storage_secret_statement(role_arn: &str, region: &str) -> String {
    format!(
        "CREATE OR REPLACE SECRET songlake_storage (\n    \
            TYPE s3,\n    \
            PROVIDER credential_chain,\n    \
            ASSUME_ROLE_ARN {arn},\n    \
            REGION {region}\n\
        );",
        arn = sql_literal(role_arn),
        region = sql_literal(region),
    )
}

/// Events load: the side-file pins field names and types, so the JSON is read
/// with an explicit column schema and inserted by name.
pub fn staging_events_copy(log_data: &str, fields: &LogFieldMap) -> String {
    format!(
        "INSERT INTO staging_log_events BY NAME\n\
         SELECT *\n\
         FROM read_json({path}, format = 'auto', columns = {columns});",
        path = sql_literal(log_data),
        columns = fields.columns_clause(),
    )
}

/// Songs load: auto-inferred JSON shape. The catalog files carry extra keys
/// (e.g. `num_songs`), so the projection names exactly the staging columns
/// and casts the loosely-typed ones.
pub fn staging_songs_copy(song_data: &str) -> String {
    format!(
        "INSERT INTO staging_songs\n\
         SELECT artist_id,\n       \
                artist_name,\n       \
                artist_location,\n       \
                CAST(artist_latitude AS VARCHAR),\n       \
                CAST(artist_longitude AS VARCHAR),\n       \
                song_id,\n       \
                title,\n       \
                CAST(duration AS DOUBLE),\n       \
                CAST(year AS SMALLINT)\n\
         FROM read_json({path}, format = 'auto', union_by_name = true);",
        path = sql_literal(song_data),
    )
}

/// The full bulk-ingestion statement list for a config, in execution order:
/// storage secret (when a role is configured), events load, songs load.
pub fn copy_statements(config: &Config) -> Result<Vec<String>> {
    let fields = LogFieldMap::from_path(&config.storage.log_fields)?;
    let mut statements = Vec::new();
    if let Some(role_arn) = &config.identity.role_arn {
        statements.push(storage_secret_statement(role_arn, &config.identity.region));
    }
    statements.push(staging_events_copy(&config.storage.log_data, &fields));
    statements.push(staging_songs_copy(&config.storage.song_data));
    Ok(statements)
}
