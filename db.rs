use crate::error::Result;
use crate::models::{PhotoRecord, StationInfo, StationRecord, UnmeasuredPhoto};
use crate::schema;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;
pub type DbConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Initializes the database connection pool and runs migrations.
pub fn init_database(db_path: &Path) -> Result<DbPool> {
    log::info!("Database path: {}", db_path.display());

    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")
    });
    let pool = r2d2::Pool::new(manager)?;

    run_migrations(&pool.get()?)?;

    Ok(pool)
}

/// Applies all pending database migrations.
fn run_migrations(connection: &DbConnection) -> Result<()> {
    // `DbConnection` dereferences to the underlying rusqlite `Connection`,
    // allowing us to call the rusqlite APIs directly.
    let connection: &Connection = &*connection;

    log::info!("Running database migrations...");

    // Migration 0001: Initial Schema
    connection.execute_batch(schema::MIGRATION_0001)?;

    log::info!("Migrations applied successfully.");
    Ok(())
}

pub fn get_station_id(conn: &Connection, code: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM stations WHERE code = ?1",
            params![code],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn insert_station(conn: &Connection, code: &str, info: Option<&StationInfo>) -> Result<i64> {
    conn.execute(
        "INSERT INTO stations (code, commune, latitude, longitude, reference_elevation)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            code,
            info.map(|i| i.commune.as_str()),
            info.and_then(|i| i.latitude),
            info.and_then(|i| i.longitude),
            info.and_then(|i| i.reference_elevation),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Re-attaches reference metadata to an existing station row, so that an
/// updated reference table heals previously unresolved stations on the
/// next reconcile.
pub fn update_station_reference(conn: &Connection, station_id: i64, info: &StationInfo) -> Result<()> {
    conn.execute(
        "UPDATE stations
         SET commune = ?2, latitude = ?3, longitude = ?4, reference_elevation = ?5
         WHERE id = ?1",
        params![
            station_id,
            info.commune,
            info.latitude,
            info.longitude,
            info.reference_elevation,
        ],
    )?;
    Ok(())
}

pub fn get_photo_id(conn: &Connection, station_id: i64, filename: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM photos WHERE station_id = ?1 AND filename = ?2",
            params![station_id, filename],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn insert_photo(
    conn: &Connection,
    station_id: i64,
    filename: &str,
    captured_at: Option<i64>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO photos (station_id, filename, captured_at) VALUES (?1, ?2, ?3)",
        params![station_id, filename, captured_at],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Refreshes the filename-derived capture timestamp. Never touches
/// `result_cm`; recorded measurements survive every reconcile.
pub fn refresh_captured_at(conn: &Connection, photo_id: i64, captured_at: Option<i64>) -> Result<()> {
    conn.execute(
        "UPDATE photos SET captured_at = ?2 WHERE id = ?1",
        params![photo_id, captured_at],
    )?;
    Ok(())
}

/// Resolves the (station code, photo id) pair callers address results by.
/// Returns None when the pair does not exist in the ledger.
pub fn resolve_target(conn: &Connection, station_code: &str, photo_id: i64) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT p.id FROM photos p
             JOIN stations s ON s.id = p.station_id
             WHERE s.code = ?1 AND p.id = ?2",
            params![station_code, photo_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn set_result(conn: &Connection, photo_id: i64, value_cm: f64) -> Result<()> {
    conn.execute(
        "UPDATE photos
         SET result_cm = ?2, updated_at = strftime('%s', 'now')
         WHERE id = ?1",
        params![photo_id, value_cm],
    )?;
    Ok(())
}

pub fn get_photo(
    conn: &Connection,
    station_code: &str,
    filename: &str,
) -> Result<Option<PhotoRecord>> {
    let photo = conn
        .query_row(
            "SELECT p.id, s.code, p.filename, p.captured_at, p.result_cm
             FROM photos p
             JOIN stations s ON s.id = p.station_id
             WHERE s.code = ?1 AND p.filename = ?2",
            params![station_code, filename],
            |row| {
                Ok(PhotoRecord {
                    id: row.get(0)?,
                    station_code: row.get(1)?,
                    filename: row.get(2)?,
                    captured_at: row
                        .get::<_, Option<i64>>(3)?
                        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
                        .map(|dt| dt.naive_utc()),
                    result_cm: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(photo)
}

pub fn list_unmeasured(conn: &Connection) -> Result<Vec<UnmeasuredPhoto>> {
    let mut stmt = conn.prepare(
        "SELECT s.code, p.id, p.filename FROM photos p
         JOIN stations s ON s.id = p.station_id
         WHERE p.result_cm IS NULL
         ORDER BY p.station_id, p.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(UnmeasuredPhoto {
            station_code: row.get(0)?,
            photo_id: row.get(1)?,
            filename: row.get(2)?,
        })
    })?;
    let mut photos = Vec::new();
    for row in rows {
        photos.push(row?);
    }
    Ok(photos)
}

/// One row per station in insertion order, with the ledger-truth photo
/// count recomputed by the query itself.
pub fn list_stations(conn: &Connection) -> Result<Vec<StationRecord>> {
    let mut stmt = conn.prepare(
        "SELECT s.code, s.commune, s.latitude, s.longitude, s.reference_elevation,
                COUNT(p.id)
         FROM stations s
         LEFT JOIN photos p ON p.station_id = s.id
         GROUP BY s.id
         ORDER BY s.id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(StationRecord {
            code: row.get(0)?,
            commune: row.get(1)?,
            latitude: row.get(2)?,
            longitude: row.get(3)?,
            reference_elevation: row.get(4)?,
            photo_count: row.get::<_, i64>(5)? as usize,
        })
    })?;
    let mut stations = Vec::new();
    for row in rows {
        stations.push(row?);
    }
    Ok(stations)
}
