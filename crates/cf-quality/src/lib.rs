//! cf-quality - Data-quality checks for Chartflow
//!
//! A check runs one query returning a single scalar and compares it with an
//! expected scalar, either a literal or the result of a second query. Failed
//! checks are results, not errors; only their severity decides whether the
//! run fails.

pub mod check;
pub mod error;
pub mod runner;

pub use check::{builtin_checks, checks_from_config, Expected, QualityCheck};
pub use error::{QualityError, QualityResult};
pub use runner::{CheckResult, QualityRunner, QualitySummary};
