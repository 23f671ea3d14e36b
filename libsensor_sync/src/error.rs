use std::path::PathBuf;
use thiserror::Error;

use super::job_status::JobStatus;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not open store because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Store failed due to HDF5 error: {0}")]
    HDF5Error(#[from] hdf5::Error),
    #[error("Store has no group named '{0}'")]
    MissingGroup(String),
    #[error("Store group '{group}' has no dataset named '{dataset}'")]
    MissingDataset { group: String, dataset: String },
    #[error("Dataset '{dataset}' of group '{group}' holds floating point data and cannot be read as integers")]
    TypeMismatch { group: String, dataset: String },
}

#[derive(Debug, Clone, Error)]
pub enum ChannelError {
    #[error("Invalid sensor channel {0}; fiber sensors are numbered 1 through 5")]
    InvalidSensor(u8),
    #[error("Invalid vibration channel {0}; expected 101, 102, or 103")]
    InvalidVibration(u32),
}

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("Group '{group}' not found in the store. Available groups: {available:?}")]
    GroupNotFound {
        group: String,
        available: Vec<String>,
    },
    #[error("Dataset '{dataset}' not found in '{group}'")]
    DatasetNotFound { group: String, dataset: String },
    #[error("Length mismatch: {expected} timestamps vs {found} values in dataset '{dataset}' of '{group}'")]
    LengthMismatch {
        group: String,
        dataset: String,
        expected: usize,
        found: usize,
    },
    #[error("No datasets found in group '{0}'")]
    EmptyGroup(String),
    #[error("No data columns found in group '{0}'")]
    NoDataColumns(String),
    #[error("Reader failed due to store error: {0}")]
    StoreError(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum AlignError {
    #[error("Alignment precondition violated: {0}")]
    PrecondViolation(String),
    #[error("Invalid sample rate {0}; must be finite and greater than zero")]
    InvalidSampleRate(f64),
    #[error("Invalid asof tolerance {0} ns; must not be negative")]
    InvalidTolerance(i64),
    #[error("Timestamp could not be represented as a date-time: {0}")]
    TimestampOutOfRange(#[from] time::error::ComponentRange),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Export failed due to csv error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Export failed to format a timestamp: {0}")]
    FormatError(#[from] time::error::Format),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to Store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("Processor failed due to Reader error: {0}")]
    ReaderError(#[from] ReaderError),
    #[error("Processor failed due to Align error: {0}")]
    AlignError(#[from] AlignError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to Export error: {0}")]
    ExportError(#[from] ExportError),
    #[error("Processor failed due to Send error: {0}")]
    SendError(#[from] std::sync::mpsc::SendError<JobStatus>),
}
