use std::path::PathBuf;
use thiserror::Error;

/// Faults raised while building the unified dataset.
///
/// Discovery faults ([`LoadError::DataSourceUnavailable`],
/// [`LoadError::NoStationFiles`]) are recoverable: the loader falls back to
/// the precomputed merged file. Everything else is fatal for the load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot enumerate data directory '{path}'")]
    DataSourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No station CSV files found in '{path}'")]
    NoStationFiles { path: PathBuf },

    #[error("Failed to read '{file}'")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("{file}: row {row}: {year:04}-{month:02}-{day:02} hour {hour} is not a valid timestamp")]
    MalformedRecord {
        file: String,
        row: usize,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
    },

    #[error("{file}: row {row}: cannot parse timestamp '{value}'")]
    MalformedTimestamp {
        file: String,
        row: usize,
        value: String,
    },
}

impl LoadError {
    /// Whether the fallback merged-file load should be attempted.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LoadError::DataSourceUnavailable { .. } | LoadError::NoStationFiles { .. }
        )
    }
}
