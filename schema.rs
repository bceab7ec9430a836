/// MIGRATION 0001: Initial database schema.
pub const MIGRATION_0001: &str = r#"
-- Stations Table: One row per monitored station, keyed by its code.
-- Reference columns are NULL when the code has no match in the
-- station reference table.
CREATE TABLE IF NOT EXISTS stations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL UNIQUE,
    commune TEXT,
    latitude REAL,
    longitude REAL,
    reference_elevation REAL,
    created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
);

-- Photos Table: The measurement ledger, one row per discovered photo.
-- Rows are never deleted when the file disappears from disk.
CREATE TABLE IF NOT EXISTS photos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    station_id INTEGER NOT NULL,
    filename TEXT NOT NULL,
    captured_at INTEGER, -- Stored as Unix timestamp
    result_cm REAL,
    created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
    FOREIGN KEY (station_id) REFERENCES stations (id),
    UNIQUE (station_id, filename)
);

-- Indexes for faster queries
CREATE INDEX IF NOT EXISTS idx_photos_station_id ON photos (station_id);
CREATE INDEX IF NOT EXISTS idx_photos_result_cm ON photos (result_cm);
CREATE INDEX IF NOT EXISTS idx_stations_code ON stations (code);
"#;
