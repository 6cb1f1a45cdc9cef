//! Error types for cf-quality

use thiserror::Error;

/// Errors assembling the check list
#[derive(Error, Debug)]
pub enum QualityError {
    /// Q001: Severity override names a check that does not exist
    #[error("[Q001] Severity override for unknown check '{name}'")]
    UnknownCheck { name: String },

    /// Q002: Config check name collides with a built-in check
    #[error("[Q002] Check '{name}' is already defined as a built-in check")]
    DuplicateCheck { name: String },

    /// Q003: Literal in the config is not a scalar
    #[error("[Q003] Check '{name}' has an invalid literal: {message}")]
    InvalidLiteral { name: String, message: String },
}

/// Result type alias for QualityError
pub type QualityResult<T> = Result<T, QualityError>;
