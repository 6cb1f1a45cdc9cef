//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use crate::value::ScalarValue;
use async_trait::async_trait;
use cf_core::TableName;
use duckdb::types::Value;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
///
/// Holds the single connection used for the whole run.
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Close the connection, surfacing any error the engine reports on shutdown
    pub fn close(self) -> DbResult<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        conn.close()
            .map_err(|(_, e)| DbError::ConnectionError(format!("close failed: {e}")))
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, [])
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql.trim())))
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql.trim())))
    }

    /// Query the first column of the first row synchronously
    fn query_scalar_sync(&self, sql: &str) -> DbResult<ScalarValue> {
        let conn = self.lock()?;
        let value = conn.query_row(sql, [], |row| row.get::<_, Value>(0));
        match value {
            Ok(value) => ScalarValue::try_from(value),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(ScalarValue::Null),
            Err(e) => Err(DbError::from(e)),
        }
    }

    /// Query count synchronously
    fn query_count_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })
            .map_err(DbError::from)?;
        Ok(count as usize)
    }

    /// Check if relation exists synchronously
    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;

        // Handle schema-qualified names
        let (schema, table) = match name.rfind('.') {
            Some(pos) => (&name[..pos], &name[pos + 1..]),
            None => ("main", name),
        };

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
                duckdb::params![schema, table],
                |row| row.get(0),
            )
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;

        Ok(count > 0)
    }

    /// Bulk copy synchronously
    fn copy_csv_sync(&self, table: &TableName, path: &Path) -> DbResult<()> {
        let path_str = path.display().to_string();
        if path_str.contains('\'') {
            return Err(DbError::CopyError {
                table: table.to_string(),
                message: format!("path contains a single quote: {path_str}"),
            });
        }
        let sql = format!(
            "COPY {} FROM '{}' (FORMAT csv, DELIMITER ',', HEADER)",
            table, path_str
        );
        log::debug!("{sql}");

        let conn = self.lock()?;
        conn.execute_batch(&sql).map_err(|e| DbError::CopyError {
            table: table.to_string(),
            message: e.to_string(),
        })
    }

    /// Run one prepared statement per row inside a transaction
    fn execute_rows_sync(&self, sql: &str, rows: &[Vec<Option<String>>]) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

        let result = (|| -> DbResult<usize> {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql.trim())))?;
            for row in rows {
                stmt.execute(duckdb::params_from_iter(row.iter()))
                    .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql.trim())))?;
            }
            Ok(rows.len())
        })();

        match &result {
            Ok(_) => {
                if let Err(commit_err) = conn.execute_batch("COMMIT") {
                    let _ = conn.execute_batch("ROLLBACK");
                    return Err(DbError::TransactionError(format!(
                        "COMMIT failed: {commit_err}"
                    )));
                }
            }
            Err(_) => {
                let _ = conn.execute_batch("ROLLBACK");
            }
        }
        result
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_sync(sql)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn query_scalar(&self, sql: &str) -> DbResult<ScalarValue> {
        self.query_scalar_sync(sql)
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.query_count_sync(sql)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn copy_csv(&self, table: &TableName, path: &Path) -> DbResult<()> {
        self.copy_csv_sync(table, path)
    }

    async fn execute_rows(&self, sql: &str, rows: &[Vec<Option<String>>]) -> DbResult<usize> {
        self.execute_rows_sync(sql, rows)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
