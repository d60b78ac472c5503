//! End-to-end run: fixture JSON on disk → bulk load → star schema.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;

use songlake_core::config::{Config, IdentityConfig, StorageConfig, WarehouseConfig};
use songlake_duckdb::pipeline::{provision_schema, run_load};
use songlake_duckdb::{copy, WarehouseBackend};

const LOG_FIELDS: &str = r#"{
    "artist": "VARCHAR",
    "auth": "VARCHAR",
    "firstName": "VARCHAR",
    "gender": "VARCHAR",
    "itemInSession": "INTEGER",
    "lastName": "VARCHAR",
    "length": "DOUBLE",
    "level": "VARCHAR",
    "location": "VARCHAR",
    "method": "VARCHAR",
    "page": "VARCHAR",
    "registration": "DOUBLE",
    "sessionId": "INTEGER",
    "song": "VARCHAR",
    "status": "SMALLINT",
    "ts": "BIGINT",
    "userAgent": "VARCHAR",
    "userId": "INTEGER"
}"#;

#[allow(clippy::too_many_arguments)]
fn log_event(
    ts: i64,
    user_id: i64,
    first_name: &str,
    last_name: &str,
    level: &str,
    page: &str,
    song: Option<&str>,
    artist: Option<&str>,
    session_id: i32,
) -> Value {
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": first_name,
        "gender": "F",
        "itemInSession": 0,
        "lastName": last_name,
        "length": song.map(|_| 239.3),
        "level": level,
        "location": "Phoenix-Mesa-Scottsdale, AZ",
        "method": "PUT",
        "page": page,
        "registration": 1540344794796.0_f64,
        "sessionId": session_id,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": user_id,
    })
}

fn catalog_song(
    song_id: &str,
    title: &str,
    artist_id: &str,
    artist_name: &str,
    year: i32,
    latitude: Option<f64>,
) -> Value {
    // Catalog objects carry extra keys the staging table does not hold
    // (num_songs); the songs load must tolerate them.
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": latitude,
        "artist_longitude": latitude.map(|l| -l),
        "artist_location": "Dubai UAE",
        "artist_name": artist_name,
        "song_id": song_id,
        "title": title,
        "duration": 269.58,
        "year": year,
    })
}

fn write_fixture(dir: &Path) {
    // 5 events: 2 non-NextSong, 3 NextSong; one NextSong references a song
    // absent from the catalog. Users 8 and 26 both appear among the
    // qualifying events.
    let events = [
        log_event(1541121910000, 26, "Ryan", "Smith", "free", "Home", None, None, 169),
        log_event(1541121920000, 8, "Kaylee", "Summers", "free", "Settings", None, None, 139),
        log_event(
            1541121934796, 8, "Kaylee", "Summers", "free", "NextSong",
            Some("Setanta matins"), Some("Elena"), 139,
        ),
        log_event(
            1541121950000, 26, "Ryan", "Smith", "free", "NextSong",
            Some("Intro"), Some("The Box Tops"), 169,
        ),
        log_event(
            1541121960000, 26, "Ryan", "Smith", "free", "NextSong",
            Some("Phantom Limb"), Some("The Shins"), 169,
        ),
    ];
    let logs_dir = dir.join("log_data");
    fs::create_dir(&logs_dir).expect("log_data dir");
    let lines: Vec<String> = events.iter().map(|e| e.to_string()).collect();
    fs::write(logs_dir.join("2018-11-02-events.json"), lines.join("\n")).expect("write log file");

    let songs_dir = dir.join("songs");
    fs::create_dir(&songs_dir).expect("songs dir");
    let songs = [
        catalog_song("SOZCTXZ12AB0182364", "Setanta matins", "AR5KOSW1187FB35FF4", "Elena", 0, None),
        catalog_song("SOCIWDW12A8C13D406", "Intro", "ARMJAGH1187FB546F3", "The Box Tops", 1968, Some(35.14968)),
        catalog_song("SOXVLOJ12AB0189215", "Amor De Cabaret", "ARKRRTF1187B9984DA", "Sonora Santanera", 0, Some(19.43)),
    ];
    for (i, song) in songs.iter().enumerate() {
        fs::write(
            songs_dir.join(format!("song_{i}.json")),
            serde_json::to_string_pretty(song).expect("serialize song"),
        )
        .expect("write song file");
    }

    fs::write(dir.join("log_json_fields.json"), LOG_FIELDS).expect("write side-file");
}

fn fixture_config(dir: &Path) -> Config {
    let root = dir.to_str().expect("utf-8 tempdir");
    Config {
        warehouse: WarehouseConfig {
            path: ":memory:".to_string(),
            memory_limit: "1GB".to_string(),
        },
        identity: IdentityConfig::default(),
        storage: StorageConfig {
            log_data: format!("{root}/log_data/*.json"),
            log_fields: dir.join("log_json_fields.json"),
            song_data: format!("{root}/songs/*.json"),
        },
    }
}

fn count(db: &WarehouseBackend, sql: &str) -> i64 {
    db.conn()
        .prepare(sql)
        .expect("prepare")
        .query_row([], |row| row.get(0))
        .expect("count")
}

#[test]
fn full_pipeline_populates_the_star_schema() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(dir.path());
    let config = fixture_config(dir.path());

    let db = WarehouseBackend::open_in_memory().expect("db");
    provision_schema(&db).expect("provision");
    run_load(&db, &config).expect("load");

    assert_eq!(count(&db, "SELECT count(*) FROM staging_log_events"), 5);
    assert_eq!(count(&db, "SELECT count(*) FROM staging_songs"), 3);

    // Exactly the distinct users from the qualifying events.
    assert_eq!(count(&db, "SELECT count(*) FROM dim_users"), 2);
    assert_eq!(
        count(&db, "SELECT count(*) FROM dim_users WHERE user_id IN (8, 26)"),
        2
    );
    assert_eq!(count(&db, "SELECT count(*) FROM dim_songs"), 3);
    assert_eq!(count(&db, "SELECT count(*) FROM dim_artists"), 3);
    // One time row per distinct staged timestamp, NextSong or not.
    assert_eq!(count(&db, "SELECT count(*) FROM dim_time"), 5);

    // 3 NextSong events → 3 fact rows; the uncatalogued play keeps null refs.
    assert_eq!(count(&db, "SELECT count(*) FROM fact_songplays"), 3);
    assert_eq!(
        count(
            &db,
            "SELECT count(*) FROM fact_songplays \
             WHERE song_id IS NULL AND artist_id IS NULL",
        ),
        1
    );
    assert_eq!(
        count(
            &db,
            "SELECT count(*) FROM fact_songplays \
             WHERE song_id = 'SOZCTXZ12AB0182364' AND artist_id = 'AR5KOSW1187FB35FF4'",
        ),
        1
    );
    // Surrogate keys are distinct and assigned to every row.
    assert_eq!(
        count(&db, "SELECT count(DISTINCT songplay_id) FROM fact_songplays"),
        3
    );
}

#[test]
fn reloading_staging_without_reprovisioning_appends() {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(dir.path());
    let config = fixture_config(dir.path());

    let db = WarehouseBackend::open_in_memory().expect("db");
    provision_schema(&db).expect("provision");

    let copies = copy::copy_statements(&config).expect("copy statements");
    db.run_statements("copy", &copies).expect("first copy");
    db.run_statements("copy", &copies).expect("second copy");

    // By design the loads are plain appends; only reprovisioning truncates.
    assert_eq!(count(&db, "SELECT count(*) FROM staging_log_events"), 10);
    assert_eq!(count(&db, "SELECT count(*) FROM staging_songs"), 6);
}
