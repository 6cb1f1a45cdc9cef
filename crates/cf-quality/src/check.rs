//! Check definitions: built-in warehouse assertions and config-declared checks

use crate::error::{QualityError, QualityResult};
use cf_core::{CheckConfig, ExpectedConfig, QualityConfig, Severity};
use cf_db::ScalarValue;
use std::collections::HashSet;

/// Right-hand side of a check comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    /// A fixed value
    Literal(ScalarValue),
    /// The scalar returned by another query
    Query(String),
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Literal(value) => write!(f, "{}", value),
            Expected::Query(sql) => write!(f, "result of `{}`", sql),
        }
    }
}

/// A single data-quality assertion
#[derive(Debug, Clone)]
pub struct QualityCheck {
    /// Unique check name
    pub name: String,

    /// Query returning the observed scalar
    pub sql: String,

    /// Value the observed scalar must equal
    pub expected: Expected,

    /// Whether a failure is fatal
    pub severity: Severity,
}

impl QualityCheck {
    /// A check against a literal value
    pub fn literal(name: &str, sql: &str, expected: ScalarValue, severity: Severity) -> Self {
        Self {
            name: name.to_string(),
            sql: sql.to_string(),
            expected: Expected::Literal(expected),
            severity,
        }
    }

    /// A check against the result of a second query
    pub fn query(name: &str, sql: &str, expected_sql: &str, severity: Severity) -> Self {
        Self {
            name: name.to_string(),
            sql: sql.to_string(),
            expected: Expected::Query(expected_sql.to_string()),
            severity,
        }
    }

    /// Convert a config-declared check
    pub fn from_config(config: &CheckConfig) -> QualityResult<Self> {
        let expected = match &config.expected {
            ExpectedConfig::Literal(value) => {
                Expected::Literal(literal_from_yaml(value).map_err(|message| {
                    QualityError::InvalidLiteral {
                        name: config.name.clone(),
                        message,
                    }
                })?)
            }
            ExpectedConfig::Query(sql) => Expected::Query(sql.clone()),
        };

        Ok(Self {
            name: config.name.clone(),
            sql: config.sql.clone(),
            expected,
            severity: config.severity,
        })
    }
}

/// Key columns that must never be null, one check per warehouse table
const KEY_COLUMNS: &[(&str, &str, &str)] = &[
    ("artist_keys_not_null", "dim_artists", "artist_id"),
    ("song_keys_not_null", "dim_songs", "song_id"),
    ("chart_keys_not_null", "dim_charts", "chart_id"),
    ("calendar_keys_not_null", "dim_calendar", "chart_date"),
    ("stream_keys_not_null", "fact_streams", "stream_id"),
];

/// The built-in checks, in execution order.
///
/// All are advisory; config overrides can raise them to [`Severity::Error`].
pub fn builtin_checks() -> Vec<QualityCheck> {
    let mut checks = Vec::new();

    for (name, table, key) in KEY_COLUMNS {
        checks.push(QualityCheck::literal(
            name,
            &format!("SELECT COUNT({key}) FROM {table} WHERE {key} IS NULL"),
            ScalarValue::Integer(0),
            Severity::Warn,
        ));
    }

    for (_, table, _) in KEY_COLUMNS {
        checks.push(QualityCheck::literal(
            &format!("{table}_populated"),
            &format!("SELECT COUNT(*) > 0 FROM {table}"),
            ScalarValue::Boolean(true),
            Severity::Warn,
        ));
    }

    checks.push(QualityCheck::query(
        "artists_unique_by_name",
        "SELECT COUNT(DISTINCT name) FROM dim_artists",
        "SELECT COUNT(*) FROM dim_artists",
        Severity::Warn,
    ));
    checks.push(QualityCheck::query(
        "stream_totals_preserved",
        "SELECT SUM(streams) FROM fact_streams",
        "SELECT SUM(streams) FROM staging_charts
         WHERE artist IS NOT NULL AND chart IS NOT NULL AND url IS NOT NULL AND date IS NOT NULL",
        Severity::Warn,
    ));

    checks
}

/// Built-in checks with config severity overrides applied, followed by the
/// config-declared checks
pub fn checks_from_config(config: &QualityConfig) -> QualityResult<Vec<QualityCheck>> {
    let mut checks = builtin_checks();

    let known: HashSet<String> = checks.iter().map(|c| c.name.clone()).collect();
    if let Some(name) = config
        .severity_overrides
        .keys()
        .find(|name| !known.contains(name.as_str()))
    {
        return Err(QualityError::UnknownCheck { name: name.clone() });
    }

    for check in &mut checks {
        if let Some(&severity) = config.severity_overrides.get(&check.name) {
            log::debug!("Check '{}' severity set to {}", check.name, severity);
            check.severity = severity;
        }
    }

    for extra in &config.checks {
        if known.contains(&extra.name) {
            return Err(QualityError::DuplicateCheck {
                name: extra.name.clone(),
            });
        }
        checks.push(QualityCheck::from_config(extra)?);
    }

    Ok(checks)
}

/// Convert a YAML scalar into a [`ScalarValue`]
fn literal_from_yaml(value: &serde_yaml::Value) -> Result<ScalarValue, String> {
    use serde_yaml::Value;

    match value {
        Value::Null => Ok(ScalarValue::Null),
        Value::Bool(b) => Ok(ScalarValue::Boolean(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(ScalarValue::Integer(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(ScalarValue::Integer(u.into()))
            } else if let Some(f) = n.as_f64() {
                Ok(ScalarValue::Float(f))
            } else {
                Err(format!("unsupported number {n}"))
            }
        }
        Value::String(s) => Ok(ScalarValue::Text(s.clone())),
        Value::Sequence(_) | Value::Mapping(_) => {
            Err("expected a scalar, found a collection".to_string())
        }
        Value::Tagged(_) => Err("tagged values are not supported".to_string()),
    }
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
