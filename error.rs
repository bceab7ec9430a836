use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database Pool Error: {0}")]
    DbPool(#[from] r2d2::Error),

    #[error("Database Error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid calibration: ruler selection has no pixel height")]
    InvalidCalibration,

    #[error("Indeterminate geometry: subtended angle is zero")]
    IndeterminateGeometry,

    #[error("Unknown target: no photo {photo_id} recorded for station {station}")]
    UnknownTarget { station: String, photo_id: i64 },

    #[error("Path Error: {0}")]
    Path(String),

    #[error("Usage Error: {0}")]
    Usage(String),
}
