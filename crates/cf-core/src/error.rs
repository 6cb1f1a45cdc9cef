//! Error types for cf-core

use thiserror::Error;

/// Core error type for Chartflow
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Circular dependency between transforms
    #[error("[C004] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// C005: Two transforms write the same table
    #[error("[C005] Table '{table}' is written by more than one transform")]
    DuplicateWriter { table: String },

    /// C006: Empty identifier
    #[error("[C006] Empty name in {context}")]
    EmptyName { context: String },

    /// C007: IO error with file path context
    #[error("[C007] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
