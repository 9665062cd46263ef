use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiskError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Nearest-neighbour lookup on empty {what} grid")]
    EmptyGrid { what: &'static str },

    #[error("Band table key mismatch: expected {expected}, found {found}")]
    CacheMismatch { expected: String, found: String },

    #[error("Band table is corrupt: {0}")]
    CacheCorrupt(String),

    #[error("Numerical domain error: {0}")]
    NumericalDomain(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DiskResult<T> = Result<T, DiskError>;
