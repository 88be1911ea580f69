//! Error types for loading and aggregating tabular data.

use std::path::PathBuf;

/// Fatal failures while turning a source into a [`Table`](crate::table::Table).
#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("data source not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tabular data in {origin}: {source}")]
    Malformed {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("{origin} has no header row")]
    NoColumns { origin: String },

    #[error("duplicate column {column:?} in {origin}")]
    DuplicateColumn { origin: String, column: String },

    #[error("record {record} in {origin} does not match the table's column set")]
    InconsistentRecord { origin: String, record: usize },
}

/// Errors raised by the aggregation layer.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AnalysisError {
    #[error("column {0:?} is not present")]
    MissingColumn(String),

    #[error("column {column:?} holds non-numeric value {value:?} at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("band table is empty")]
    EmptyBands,

    #[error("band {0:?} has its lower bound at or above its upper bound")]
    InvertedBand(String),

    #[error("band {later:?} overlaps or precedes band {earlier:?}")]
    UnorderedBands { earlier: String, later: String },

    #[error("band {later:?} does not start where band {earlier:?} ends")]
    BandGap { earlier: String, later: String },
}
