//! Star-schema DDL for the songlake warehouse.
//!
//! Two unconstrained staging tables land the raw JSON, four dimension tables
//! and one fact table hold the transformed rows. Every provisioning run drops
//! and recreates the whole set — there is no migration versioning; a run that
//! fails partway is recovered by re-running the full drop/create cycle.
//!
//! DuckDB enforces the declared FOREIGN KEY constraints at statement execution
//! time, so ordering matters in both directions:
//!   - creates: a referenced table must exist before its referencing table
//!     (dim_artists before dim_songs; every dimension before fact_songplays);
//!   - drops: a referencing table must go before the table it references,
//!     and the fact table's id sequence only after the fact table.

/// Session settings applied once per connection, before any pipeline phase.
///
/// `memory_limit` comes from `Config.warehouse.memory_limit` (default `"1GB"`).
/// `threads = 2` keeps the engine's background pool small; the pipeline itself
/// is strictly sequential and gains nothing from a wide pool.
pub fn session_init_sql(memory_limit: &str) -> String {
    format!(
        "SET memory_limit = '{memory_limit}';\nSET threads = 2;",
        memory_limit = memory_limit.replace('\'', "''")
    )
}

pub const DROP_STAGING_LOG_EVENTS: &str = "DROP TABLE IF EXISTS staging_log_events;";
pub const DROP_STAGING_SONGS: &str = "DROP TABLE IF EXISTS staging_songs;";
pub const DROP_FACT_SONGPLAYS: &str = "DROP TABLE IF EXISTS fact_songplays;";
pub const DROP_DIM_SONGS: &str = "DROP TABLE IF EXISTS dim_songs;";
pub const DROP_DIM_USERS: &str = "DROP TABLE IF EXISTS dim_users;";
pub const DROP_DIM_TIME: &str = "DROP TABLE IF EXISTS dim_time;";
pub const DROP_DIM_ARTISTS: &str = "DROP TABLE IF EXISTS dim_artists;";
pub const DROP_SONGPLAY_ID_SEQ: &str = "DROP SEQUENCE IF EXISTS songplay_id_seq;";

/// Surrogate-key source for fact_songplays.
pub const CREATE_SONGPLAY_ID_SEQ: &str = "CREATE SEQUENCE songplay_id_seq START 1;";

/// Raw activity-log landing zone. Column names mirror the JSON field names of
/// the source logs; no constraints — duplicates and NULLs are expected here.
pub const CREATE_STAGING_LOG_EVENTS: &str = r#"
CREATE TABLE staging_log_events (
    artist          VARCHAR,
    auth            VARCHAR,
    firstName       VARCHAR,
    gender          VARCHAR,
    itemInSession   INTEGER,
    lastName        VARCHAR,
    length          DOUBLE,
    level           VARCHAR,
    location        VARCHAR,
    method          VARCHAR,
    page            VARCHAR,
    registration    DOUBLE,
    sessionId       INTEGER,
    song            VARCHAR,
    status          SMALLINT,
    ts              BIGINT,      -- epoch milliseconds
    userAgent       VARCHAR,
    userId          INTEGER
);
"#;

/// Song-catalog landing zone. Latitude/longitude land as VARCHAR — the
/// catalog emits them inconsistently and the dimension keeps them opaque.
pub const CREATE_STAGING_SONGS: &str = r#"
CREATE TABLE staging_songs (
    artist_id           VARCHAR,
    artist_name         VARCHAR,
    artist_location     VARCHAR,
    artist_latitude     VARCHAR,
    artist_longitude    VARCHAR,
    song_id             VARCHAR,
    title               VARCHAR,
    duration            DOUBLE,
    year                SMALLINT
);
"#;

pub const CREATE_DIM_USERS: &str = r#"
CREATE TABLE dim_users (
    user_id         BIGINT PRIMARY KEY,
    first_name      VARCHAR NOT NULL,
    last_name       VARCHAR,
    gender          VARCHAR(1) NOT NULL,
    level           VARCHAR NOT NULL     -- subscription level at the user's latest event
);
"#;

pub const CREATE_DIM_ARTISTS: &str = r#"
CREATE TABLE dim_artists (
    artist_id       VARCHAR PRIMARY KEY,
    name            VARCHAR NOT NULL,
    location        VARCHAR,
    latitude        VARCHAR,
    longitude       VARCHAR
);
"#;

/// Must be created after dim_artists (enforced FK).
pub const CREATE_DIM_SONGS: &str = r#"
CREATE TABLE dim_songs (
    song_id         VARCHAR PRIMARY KEY,
    title           VARCHAR NOT NULL,
    artist_id       VARCHAR NOT NULL REFERENCES dim_artists(artist_id),
    year            SMALLINT,
    duration        DOUBLE NOT NULL DEFAULT 0
);
"#;

/// One row per distinct event timestamp; the derived fields are a pure UTC
/// calendar decomposition of the epoch-millisecond key.
pub const CREATE_DIM_TIME: &str = r#"
CREATE TABLE dim_time (
    start_time      BIGINT PRIMARY KEY,  -- epoch milliseconds
    hour            SMALLINT NOT NULL,
    day             SMALLINT NOT NULL,
    week            SMALLINT NOT NULL,   -- ISO week
    month           SMALLINT NOT NULL,
    year            SMALLINT NOT NULL,
    weekday         VARCHAR NOT NULL     -- full day name, e.g. 'Friday'
);
"#;

/// Must be created last: references every dimension plus the id sequence.
/// song_id / artist_id are nullable — a play of a song missing from the
/// catalog is still recorded, with null linkage.
pub const CREATE_FACT_SONGPLAYS: &str = r#"
CREATE TABLE fact_songplays (
    songplay_id     BIGINT PRIMARY KEY DEFAULT nextval('songplay_id_seq'),
    start_time      BIGINT REFERENCES dim_time(start_time),
    user_id         BIGINT REFERENCES dim_users(user_id),
    level           VARCHAR,
    song_id         VARCHAR REFERENCES dim_songs(song_id),
    artist_id       VARCHAR REFERENCES dim_artists(artist_id),
    session_id      INTEGER NOT NULL,
    location        VARCHAR,
    user_agent      VARCHAR
);
"#;

/// Primary query pattern on the fact table is a time-range scan; the
/// dimensions already sort on their primary keys.
pub const CREATE_FACT_SONGPLAYS_TIME_INDEX: &str =
    "CREATE INDEX idx_fact_songplays_start_time ON fact_songplays(start_time);";

/// Drops in dependency order: staging first, then the fact table, then the
/// dimensions it references (dim_songs before dim_artists, which it
/// references), then the fact id sequence.
pub fn drop_statements() -> Vec<&'static str> {
    vec![
        DROP_STAGING_LOG_EVENTS,
        DROP_STAGING_SONGS,
        DROP_FACT_SONGPLAYS,
        DROP_DIM_SONGS,
        DROP_DIM_USERS,
        DROP_DIM_TIME,
        DROP_DIM_ARTISTS,
        DROP_SONGPLAY_ID_SEQ,
    ]
}

/// Creates in dependency order: sequence and staging first, dimensions next
/// (dim_artists strictly before dim_songs), fact table and its index last.
pub fn create_statements() -> Vec<&'static str> {
    vec![
        CREATE_SONGPLAY_ID_SEQ,
        CREATE_STAGING_LOG_EVENTS,
        CREATE_STAGING_SONGS,
        CREATE_DIM_USERS,
        CREATE_DIM_ARTISTS,
        CREATE_DIM_SONGS,
        CREATE_DIM_TIME,
        CREATE_FACT_SONGPLAYS,
        CREATE_FACT_SONGPLAYS_TIME_INDEX,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(list: &[&str], stmt: &str) -> usize {
        list.iter()
            .position(|s| *s == stmt)
            .unwrap_or_else(|| panic!("statement not in list: {stmt}"))
    }

    #[test]
    fn creates_referenced_tables_before_referencing_ones() {
        let creates = create_statements();
        assert!(position(&creates, CREATE_DIM_ARTISTS) < position(&creates, CREATE_DIM_SONGS));
        for dim in [CREATE_DIM_USERS, CREATE_DIM_ARTISTS, CREATE_DIM_SONGS, CREATE_DIM_TIME] {
            assert!(position(&creates, dim) < position(&creates, CREATE_FACT_SONGPLAYS));
        }
        assert!(
            position(&creates, CREATE_SONGPLAY_ID_SEQ)
                < position(&creates, CREATE_FACT_SONGPLAYS)
        );
    }

    #[test]
    fn drops_referencing_tables_before_referenced_ones() {
        let drops = drop_statements();
        for dim in [DROP_DIM_SONGS, DROP_DIM_USERS, DROP_DIM_TIME, DROP_DIM_ARTISTS] {
            assert!(position(&drops, DROP_FACT_SONGPLAYS) < position(&drops, dim));
        }
        assert!(position(&drops, DROP_DIM_SONGS) < position(&drops, DROP_DIM_ARTISTS));
        assert_eq!(drops.last(), Some(&DROP_SONGPLAY_ID_SEQ));
    }
}
