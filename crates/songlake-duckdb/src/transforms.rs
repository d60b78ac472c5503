//! Staging-to-star INSERT..SELECT statements.
//!
//! Five statements, each reading from staging and writing exactly one
//! dimension or fact table. Execution order is users, artists, songs, time,
//! songplays: every dimension before the fact table, and dim_artists strictly
//! before dim_songs because the engine enforces dim_songs.artist_id at insert
//! time.
//!
//! The enforced primary keys also force explicit dedup policies where the
//! staged data can repeat a key:
//!   - users: last writer wins — the row from the user's most recent event
//!     (by ts) supplies the subscription level;
//!   - artists and songs: one row per id, first row under a deterministic
//!     ordering wins when the catalog repeats an id with differing attributes.

/// One row per user id seen in the logs; the latest event's tuple wins, so a
/// returning user whose level changed carries the newer level.
pub const INSERT_DIM_USERS: &str = r#"
INSERT INTO dim_users (user_id, first_name, last_name, gender, level)
SELECT userId, firstName, lastName, gender, level
FROM staging_log_events
WHERE userId IS NOT NULL
QUALIFY row_number() OVER (PARTITION BY userId ORDER BY ts DESC) = 1
ORDER BY userId;
"#;

/// One row per artist id; ties between conflicting catalog rows resolve to
/// the first row ordered by artist_name.
pub const INSERT_DIM_ARTISTS: &str = r#"
INSERT INTO dim_artists (artist_id, name, location, latitude, longitude)
SELECT artist_id, artist_name, artist_location, artist_latitude, artist_longitude
FROM staging_songs
WHERE artist_id IS NOT NULL
QUALIFY row_number() OVER (PARTITION BY artist_id ORDER BY artist_name) = 1;
"#;

/// One row per song id; ties resolve to the first row ordered by
/// (title, year). A NULL catalog duration lands as the declared default 0.
pub const INSERT_DIM_SONGS: &str = r#"
INSERT INTO dim_songs (song_id, title, artist_id, year, duration)
SELECT song_id, title, artist_id, year, coalesce(duration, 0)
FROM staging_songs
WHERE song_id IS NOT NULL
QUALIFY row_number() OVER (PARTITION BY song_id ORDER BY title, year) = 1;
"#;

/// One row per distinct event timestamp. `epoch_ms` interprets the value as
/// milliseconds since the epoch in UTC — no timezone conversion — and the
/// calendar fields are derived from that instant (`weekofyear` is ISO week,
/// `dayname` the full weekday name).
pub const INSERT_DIM_TIME: &str = r#"
INSERT INTO dim_time (start_time, hour, day, week, month, year, weekday)
SELECT start_time,
       hour(date_time),
       day(date_time),
       weekofyear(date_time),
       month(date_time),
       year(date_time),
       dayname(date_time)
FROM (
    SELECT ts AS start_time, epoch_ms(ts) AS date_time
    FROM staging_log_events
    WHERE ts IS NOT NULL
    GROUP BY ts
) decomposed
ORDER BY start_time;
"#;

/// One fact row per staged 'NextSong' event. The catalog join is a left join
/// on exact (title, artist name); a miss still records the play, with null
/// song/artist linkage — the only place null dimension references can arise.
pub const INSERT_FACT_SONGPLAYS: &str = r#"
INSERT INTO fact_songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
SELECT e.ts,
       e.userId,
       e.level,
       s.song_id,
       s.artist_id,
       e.sessionId,
       e.location,
       e.userAgent
FROM staging_log_events e
LEFT JOIN staging_songs s
    ON e.song = s.title AND e.artist = s.artist_name
WHERE e.page = 'NextSong';
"#;

/// The transform statement list in execution order.
pub fn transform_statements() -> Vec<&'static str> {
    vec![
        INSERT_DIM_USERS,
        INSERT_DIM_ARTISTS,
        INSERT_DIM_SONGS,
        INSERT_DIM_TIME,
        INSERT_FACT_SONGPLAYS,
    ]
}
