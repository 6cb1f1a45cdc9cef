//! cf-core - Core library for Chartflow
//!
//! This crate provides the shared configuration model, error types, the
//! table-name newtype, and the transform dependency graph used across all
//! Chartflow components.

pub mod check;
pub mod config;
pub mod dag;
pub mod error;
pub mod table_name;

pub use check::{CheckConfig, ExpectedConfig, Severity};
pub use config::{
    Config, DatabaseConfig, QualityConfig, SchemaConfig, SourcesConfig, TransformConfig,
};
pub use dag::TransformDag;
pub use error::{CoreError, CoreResult};
pub use table_name::TableName;
