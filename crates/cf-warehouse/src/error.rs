//! Error types for cf-warehouse

use cf_core::CoreError;
use cf_db::DbError;
use thiserror::Error;

/// Warehouse errors
#[derive(Error, Debug)]
pub enum WarehouseError {
    /// W001: Underlying database error
    #[error(transparent)]
    Db(#[from] DbError),

    /// W002: Configuration or dependency-graph error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// W003: Source file missing
    #[error("[W003] Source file not found for {table}: {path}")]
    SourceNotFound { table: String, path: String },

    /// W004: Chart URL does not carry a song id in the expected shape
    #[error("[W004] Malformed song URL '{url}': {reason}")]
    MalformedSongUrl { url: String, reason: String },

    /// W005: Reference file line is not a flat JSON object of scalars
    #[error("[W005] Malformed reference record in {path} line {line}: {message}")]
    MalformedReference {
        path: String,
        line: usize,
        message: String,
    },

    /// W006: IO error with file path context
    #[error("[W006] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for WarehouseError
pub type WarehouseResult<T> = Result<T, WarehouseError>;
