#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse POI rows: {0}")]
    Rows(#[from] serde_json::Error),
    #[error("POI rows must be a JSON array of objects")]
    RowsNotArray,
    #[error("failed to parse CSV rows: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse config: {0}")]
    Config(#[from] json5::Error),
    #[error("unknown label position: {0:?}")]
    InvalidPosition(String),
}

pub type Result<T> = std::result::Result<T, Error>;
