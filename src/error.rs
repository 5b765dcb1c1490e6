//! Error types for the density map pipeline.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Download failed (transport error or non-success status)
    #[error("Failed to fetch {url}: {source}")]
    NetworkFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Archive missing, corrupt, or without a readable vector layer
    #[error("Failed to load {path:?}: {reason}")]
    DataLoad { path: PathBuf, reason: String },

    /// Filter position past the end of the table
    #[error("Row position {position} out of bounds for table of {len} rows")]
    IndexOutOfBounds { position: usize, len: usize },

    /// Keyed filter named a region the table does not contain
    #[error("No region with {column} = {key:?}")]
    UnknownRegion { column: String, key: String },

    #[error("Row {row} has no numeric value for column '{column}'")]
    MissingAttribute { row: usize, column: String },

    #[error("Row {row} has zero land area")]
    DivisionByZero { row: usize },

    /// Every value in the sequence is equal, so there is no range to scale by
    #[error("Cannot normalize: all {len} values equal {value}")]
    DegenerateRange { len: usize, value: f64 },

    #[error("Cannot {0} an empty sequence")]
    EmptySequence(&'static str),

    #[error("Column '{column}' has {got} values, table has {expected} rows")]
    ColumnLength {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
