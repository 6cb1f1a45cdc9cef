//! Check execution

use crate::check::{Expected, QualityCheck};
use cf_core::Severity;
use cf_db::{Database, ScalarValue};
use std::time::{Duration, Instant};

/// Result of a single check execution
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// 1-based position in the check list
    pub position: usize,

    /// Check name
    pub name: String,

    /// Whether observed equals expected
    pub passed: bool,

    /// Value the check query returned
    pub observed: Option<ScalarValue>,

    /// Value it was compared against
    pub expected: Option<ScalarValue>,

    /// Error message if a query failed to execute
    pub error: Option<String>,

    /// Declared severity
    pub severity: Severity,

    /// Execution time
    pub duration: Duration,
}

impl CheckResult {
    /// Whether this result fails the run
    pub fn is_fatal(&self) -> bool {
        !self.passed && self.severity == Severity::Error
    }

    /// One-line description used for logs and terminal output
    pub fn describe(&self) -> String {
        if let Some(err) = &self.error {
            return format!("check {} '{}' errored: {}", self.position, self.name, err);
        }
        let observed = self.observed.clone().unwrap_or(ScalarValue::Null);
        let expected = self.expected.clone().unwrap_or(ScalarValue::Null);
        if self.passed {
            format!("check {} '{}' passed ({})", self.position, self.name, observed)
        } else {
            format!(
                "check {} '{}' failed: got {}, expected {}",
                self.position, self.name, observed, expected
            )
        }
    }
}

/// Summary of a check run
#[derive(Debug, Clone)]
pub struct QualitySummary {
    /// Checks run
    pub total: usize,

    /// Checks passed
    pub passed: usize,

    /// Checks whose comparison failed
    pub failed: usize,

    /// Checks whose queries failed to execute
    pub errors: usize,

    /// Failed or errored checks declared `error`
    pub fatal: usize,

    /// Total execution time
    pub duration: Duration,
}

impl QualitySummary {
    /// Create a summary from check results
    pub fn from_results(results: &[CheckResult], duration: Duration) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let errors = results.iter().filter(|r| r.error.is_some()).count();
        let failed = results
            .iter()
            .filter(|r| !r.passed && r.error.is_none())
            .count();
        let fatal = results.iter().filter(|r| r.is_fatal()).count();

        Self {
            total,
            passed,
            failed,
            errors,
            fatal,
            duration,
        }
    }

    /// Check if every check passed
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }

    /// Whether any `error`-severity check failed or errored
    pub fn has_fatal_failures(&self) -> bool {
        self.fatal > 0
    }
}

/// Runs quality checks against the warehouse
pub struct QualityRunner<'a> {
    db: &'a dyn Database,
}

impl<'a> QualityRunner<'a> {
    /// Create a new check runner
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Run one check. Query failures become an errored result.
    pub async fn run_check(&self, position: usize, check: &QualityCheck) -> CheckResult {
        let start = Instant::now();
        let outcome = self.evaluate(check).await;
        let duration = start.elapsed();

        let result = match outcome {
            Ok((observed, expected)) => CheckResult {
                position,
                name: check.name.clone(),
                passed: observed.matches(&expected),
                observed: Some(observed),
                expected: Some(expected),
                error: None,
                severity: check.severity,
                duration,
            },
            Err(e) => CheckResult {
                position,
                name: check.name.clone(),
                passed: false,
                observed: None,
                expected: None,
                error: Some(e.to_string()),
                severity: check.severity,
                duration,
            },
        };

        log_result(&result);
        result
    }

    /// Run checks in order; a failing check never stops the ones after it
    pub async fn run_all(&self, checks: &[QualityCheck]) -> (Vec<CheckResult>, QualitySummary) {
        let start = Instant::now();
        let mut results = Vec::with_capacity(checks.len());

        for (idx, check) in checks.iter().enumerate() {
            results.push(self.run_check(idx + 1, check).await);
        }

        let summary = QualitySummary::from_results(&results, start.elapsed());
        log::info!(
            "Quality checks: {} passed, {} failed, {} errored",
            summary.passed,
            summary.failed,
            summary.errors
        );
        (results, summary)
    }

    async fn evaluate(&self, check: &QualityCheck) -> cf_db::DbResult<(ScalarValue, ScalarValue)> {
        log::debug!("{}", check.sql);
        let observed = self.db.query_scalar(&check.sql).await?;
        let expected = match &check.expected {
            Expected::Literal(value) => value.clone(),
            Expected::Query(sql) => {
                log::debug!("{}", sql);
                self.db.query_scalar(sql).await?
            }
        };
        Ok((observed, expected))
    }
}

fn log_result(result: &CheckResult) {
    if result.passed {
        log::info!("{}", result.describe());
    } else if result.severity == Severity::Error {
        log::error!("{}", result.describe());
    } else {
        log::warn!("{}", result.describe());
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
