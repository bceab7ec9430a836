pub mod config;
pub mod db;
pub mod error;
pub mod estimate;
pub mod ledger;
pub mod models;
pub mod scan;
pub mod schema;
pub mod stations;

pub use config::{AppPaths, MeasureConfig, Settings};
pub use db::{init_database, DbConnection, DbPool};
pub use error::{Error, Result};
pub use estimate::estimate_height;
pub use ledger::{parse_capture_timestamp, LedgerStore};
pub use models::{
    DirectoryScan, PhotoRecord, PixelRect, ReconcileSummary, ScannedStation, StationInfo,
    StationRecord, UnmeasuredPhoto,
};
pub use scan::scan_stations;
pub use stations::{load_station_table, normalize_code, StationTable};
