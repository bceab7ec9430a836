use crate::db::{self, DbPool};
use crate::error::{Error, Result};
use crate::models::{DirectoryScan, ReconcileSummary, StationRecord, UnmeasuredPhoto};
use crate::stations::{normalize_code, StationTable};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::TransactionBehavior;

/// The durable photo-measurement record.
///
/// Identity is content-addressed: a photo row is keyed by its station code
/// and filename, never by its position in any listing. Reconciliation only
/// adds rows and refreshes filename-derived fields; `record_result` is the
/// single path that writes a measurement. Rows are never deleted when the
/// underlying file disappears: the ledger is the source of truth for
/// history, the directory only a discovery feed.
pub struct LedgerStore {
    pool: DbPool,
    reference: StationTable,
}

impl LedgerStore {
    pub fn new(pool: DbPool, reference: StationTable) -> Self {
        Self { pool, reference }
    }

    /// Merges a directory scan into the ledger.
    ///
    /// Stations and photos seen for the first time get rows; photos already
    /// present keep their `result_cm` untouched. Station codes missing from
    /// the reference table are reported in the summary rather than dropped.
    /// The whole merge runs in one IMMEDIATE transaction so overlapping
    /// callers serialize on the database write lock.
    pub fn reconcile(&self, scan: &DirectoryScan) -> Result<ReconcileSummary> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut summary = ReconcileSummary::default();
        for station in &scan.stations {
            let code = normalize_code(&station.code);
            let info = self.reference.get(&code);
            if info.is_none() {
                log::warn!("Station {code} has no entry in the reference table");
                summary.unresolved_station_codes.push(code.clone());
            }

            let station_id = match db::get_station_id(&tx, &code)? {
                Some(id) => {
                    if let Some(info) = info {
                        db::update_station_reference(&tx, id, info)?;
                    }
                    id
                }
                None => db::insert_station(&tx, &code, info)?,
            };

            for filename in &station.photos {
                let captured_at = parse_capture_timestamp(filename).map(timestamp_secs);
                match db::get_photo_id(&tx, station_id, filename)? {
                    Some(photo_id) => db::refresh_captured_at(&tx, photo_id, captured_at)?,
                    None => {
                        db::insert_photo(&tx, station_id, filename, captured_at)?;
                        summary.photos_added += 1;
                    }
                }
            }
            summary.stations_seen += 1;
        }

        tx.commit()?;
        log::info!(
            "Reconciled {} stations, {} new photos, {} unresolved codes",
            summary.stations_seen,
            summary.photos_added,
            summary.unresolved_station_codes.len()
        );
        Ok(summary)
    }

    /// Every photo still waiting for a measurement, ordered by station
    /// insertion then photo insertion so "measure next" workflows see a
    /// stable sequence between writes.
    pub fn list_unmeasured(&self) -> Result<Vec<UnmeasuredPhoto>> {
        let conn = self.pool.get()?;
        db::list_unmeasured(&conn)
    }

    /// Writes a measurement for the addressed photo. This is the sanctioned
    /// overwrite path: an existing value is replaced. Fails without touching
    /// the ledger when the (station, photo) pair is unknown.
    pub fn record_result(&self, station_code: &str, photo_id: i64, value_cm: f64) -> Result<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let code = normalize_code(station_code);
        match db::resolve_target(&tx, &code, photo_id)? {
            Some(id) => {
                db::set_result(&tx, id, value_cm)?;
                tx.commit()?;
                Ok(())
            }
            None => Err(Error::UnknownTarget {
                station: code,
                photo_id,
            }),
        }
    }

    /// One row per station with reference metadata and the ledger-truth
    /// photo count.
    pub fn summary_view(&self) -> Result<Vec<StationRecord>> {
        let conn = self.pool.get()?;
        db::list_stations(&conn)
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Extracts the capture timestamp from a `YYYYMMDD_HHMMSS...` filename.
///
/// The date is the first 8-digit run starting with "20"; the time is the
/// following 6-digit run, either standalone or fused to the date digits.
/// A parsable date with no parsable time degrades to midnight; no date
/// means no timestamp. Malformed names never block ingestion.
pub fn parse_capture_timestamp(filename: &str) -> Option<NaiveDateTime> {
    let runs = digit_runs(filename);
    let (date_idx, date_run) = runs
        .iter()
        .enumerate()
        .find(|(_, run)| run.len() >= 8 && run.starts_with("20"))?;

    let date = parse_date(&date_run[..8])?;

    let time = if date_run.len() >= 14 {
        parse_time(&date_run[8..14])
    } else {
        runs[date_idx + 1..]
            .iter()
            .find(|run| run.len() == 6)
            .and_then(|run| parse_time(run))
    };

    match time {
        Some(time) => Some(date.and_time(time)),
        None => date.and_hms_opt(0, 0, 0),
    }
}

fn digit_runs(name: &str) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for ch in name.chars() {
        if ch.is_ascii_digit() {
            current.push(ch);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn parse_date(digits: &str) -> Option<NaiveDate> {
    let year = digits[..4].parse().ok()?;
    let month = digits[4..6].parse().ok()?;
    let day = digits[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_time(digits: &str) -> Option<chrono::NaiveTime> {
    let hour = digits[..2].parse().ok()?;
    let minute = digits[2..4].parse().ok()?;
    let second = digits[4..6].parse().ok()?;
    chrono::NaiveTime::from_hms_opt(hour, minute, second)
}

fn timestamp_secs(dt: NaiveDateTime) -> i64 {
    chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(dt, chrono::Utc).timestamp()
}
