use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unknown algorithm '{name}'")]
    UnknownAlgorithm { name: String },

    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Carries the file content so the CLI can render the error span.
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: String,
        content: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors raised while reading recordings or annotation files.
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("unsupported file format for '{path}'")]
    UnsupportedFormat { path: String },

    #[error("malformed {format} input at {location}: {reason}")]
    Malformed {
        format: &'static str,
        location: String,
        reason: String,
    },

    #[error("missing channel '{channel}' in '{path}'")]
    MissingChannel { channel: String, path: String },

    #[error("non-uniform sampling: expected {expected_secs}s between rows, found {found_secs}s at row {row}")]
    NonUniformSampling {
        expected_secs: i64,
        found_secs: i64,
        row: usize,
    },

    #[error("recording is empty: {path}")]
    Empty { path: String },

    #[error("'{path}' holds raw samples, not epoch counts; export epochs from the device software")]
    NotEpochData { path: String },

    #[error("gt3x archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by non-wear detection algorithms.
#[derive(Error, Debug)]
pub enum AlgorithmError {
    #[error("algorithm '{name}' requires epoch data; provide an epoch export or resample the recording")]
    EpochDataRequired { name: &'static str },

    #[error("algorithm '{name}' requires raw sample data")]
    RawDataRequired { name: &'static str },

    #[error("invalid parameter for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Reader(#[from] ReaderError),

    #[error(transparent)]
    Algorithm(#[from] AlgorithmError),

    #[error("export error: {0}")]
    Export(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("batch task failed: {0}")]
    Batch(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        // dialoguer::Error wraps an IO error
        Error::Io(std::io::Error::other(err.to_string()))
    }
}
