use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Axis-aligned selection rectangle in photo pixel space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Static per-station metadata sourced from the reference table.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StationInfo {
    pub commune: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Z_CC49 datum elevation of the calibration stake.
    pub reference_elevation: Option<f64>,
    // Tide datums (meters NGF), present only in the extended table layout.
    pub phma: Option<f64>,
    pub pmve: Option<f64>,
    pub pmme: Option<f64>,
    pub nm: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationRecord {
    pub code: String,
    pub commune: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub reference_elevation: Option<f64>,
    pub photo_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: Option<i64>,
    pub station_code: String,
    pub filename: String,
    pub captured_at: Option<NaiveDateTime>,
    pub result_cm: Option<f64>,
}

/// One station directory and its photo filenames, as found on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedStation {
    pub code: String,
    pub photos: Vec<String>,
}

/// Ordered result of a directory scan, fed to `LedgerStore::reconcile`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DirectoryScan {
    pub stations: Vec<ScannedStation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReconcileSummary {
    pub stations_seen: usize,
    pub photos_added: usize,
    pub unresolved_station_codes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnmeasuredPhoto {
    pub station_code: String,
    pub photo_id: i64,
    pub filename: String,
}
