//! cf-warehouse - Star-schema warehouse for Chartflow
//!
//! This crate owns everything that touches warehouse tables: the table
//! catalogue and its DDL, the staging loads from source files, and the
//! dependency-ordered transforms that populate dimensions and facts.

pub mod error;
pub mod schema;
pub mod song_id;
pub mod staging;
pub mod transform;

pub use error::{WarehouseError, WarehouseResult};
pub use schema::{Layer, SchemaManager, TableDef, TABLES};
pub use song_id::song_id_from_url;
pub use staging::{CountryRow, ReferenceRecord, StagingLoader, StagingReport};
pub use transform::{Transform, TransformEngine, TransformReport, TransformStep, TRANSFORMS};
