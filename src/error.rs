//! Crate-wide error type
//!
//! One enum covers the whole pipeline: CSV conversion, resource
//! fetching, pack resolution, and the host calls issued while
//! replacing a pack's entries. The positional variants (`DeleteEntry`, `CreateEntry`)
//! record how far a run got before aborting, since a failed import
//! leaves the pack partially modified with no rollback.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImportError>;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("host API error: {message} (status {status})")]
    HostApi { status: u16, message: String },

    #[error("invalid pack reference '{0}': expected '<namespace>.<collection>'")]
    InvalidPackRef(String),

    #[error("no compendium pack named '{0}' in the host registry")]
    PackNotFound(String),

    #[error("failed to fetch resource '{path}' (status {status})")]
    Fetch { path: String, status: u16 },

    #[error("failed to read resource '{path}': {source}")]
    ResourceRead {
        path: String,
        source: std::io::Error,
    },

    #[error("resource is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("resource must be a top-level JSON array of records, got {0}")]
    NotRecordArray(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot convert row '{row}' in table '{table}': first cell is not a roll range")]
    BadTableRow { table: String, row: String },

    #[error("host rejected the operation: {0}")]
    HostOp(String),

    #[error("delete of entry '{id}' rejected after {deleted} deletions: {source}")]
    DeleteEntry {
        id: String,
        deleted: usize,
        #[source]
        source: Box<ImportError>,
    },

    #[error("create of record '{name}' rejected after {created} of {total} records: {source}")]
    CreateEntry {
        name: String,
        created: usize,
        total: usize,
        #[source]
        source: Box<ImportError>,
    },
}
