//! cf-db - Database abstraction layer for Chartflow
//!
//! This crate provides the `Database` trait the pipeline components talk to,
//! the scalar value type returned by single-value queries, and the DuckDB
//! implementation backing the warehouse.

pub mod duckdb;
pub mod error;
pub mod traits;
pub mod value;

pub use crate::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
pub use value::ScalarValue;
