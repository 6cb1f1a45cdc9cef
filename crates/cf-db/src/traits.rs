//! Database trait definition

use crate::error::DbResult;
use crate::value::ScalarValue;
use async_trait::async_trait;
use cf_core::TableName;
use std::path::Path;

/// Database abstraction trait for Chartflow
///
/// Every call is a self-contained unit of work: statements auto-commit
/// unless the method documents an enclosing transaction.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single SQL statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple `;`-separated SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and return the first column of its first row.
    ///
    /// A query returning no rows yields [`ScalarValue::Null`].
    async fn query_scalar(&self, sql: &str) -> DbResult<ScalarValue>;

    /// Number of rows a query returns
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Bulk-load a headed, comma-delimited file into an existing table using
    /// the engine's native copy facility. Columns are matched by position.
    async fn copy_csv(&self, table: &TableName, path: &Path) -> DbResult<()>;

    /// Execute a parameterized statement once per row inside one transaction.
    ///
    /// `None` binds SQL `NULL`. Returns the number of rows executed.
    async fn execute_rows(&self, sql: &str, rows: &[Vec<Option<String>>]) -> DbResult<usize>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
