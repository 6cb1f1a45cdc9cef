//! Configuration types for data-quality checks

use serde::{Deserialize, Serialize};

/// How a failing check affects the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Check failure fails the run (non-zero exit status)
    Error,
    /// Check failure is reported but the run still succeeds
    Warn,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
        }
    }
}

/// Expected side of a check comparison, as written in the config file
///
/// ```yaml
/// expected: { literal: 0 }
/// expected: { query: "SELECT COUNT(*) FROM dim_artists" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedConfig {
    /// Compare against a literal scalar
    Literal(serde_yaml::Value),
    /// Compare against the scalar result of a second query
    Query(String),
}

/// A user-defined check appended after the built-in checks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    /// Unique check name
    pub name: String,

    /// Query returning a single scalar
    pub sql: String,

    /// Value the scalar must equal, written as a single-key map
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub expected: ExpectedConfig,

    /// Declared explicitly; there is no implicit default
    pub severity: Severity,
}
