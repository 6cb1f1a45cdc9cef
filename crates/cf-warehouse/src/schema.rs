//! Table catalogue and schema management
//!
//! Every warehouse table is declared once in [`TABLES`]. Creation walks the
//! layers staging → dimension → fact; dropping walks them in reverse so the
//! fact table (which holds foreign keys into the dimensions) always goes
//! first. Surrogate keys come from per-table sequences used as column
//! defaults; a sequence is created before its table and dropped after it.

use crate::error::WarehouseResult;
use cf_core::{SchemaConfig, TableName};
use cf_db::Database;

/// Which part of the star schema a table belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    /// Raw landing tables
    Staging,
    /// Deduplicated descriptive entities
    Dimension,
    /// Observed events referencing dimensions
    Fact,
}

/// A warehouse table and the DDL that creates it
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub layer: Layer,
    /// Sequence feeding the surrogate key, if the table has one
    pub sequence: Option<&'static str>,
    /// `CREATE TABLE IF NOT EXISTS` statement
    pub ddl: &'static str,
}

/// All warehouse tables, in creation order within each layer
pub const TABLES: &[TableDef] = &[
    TableDef {
        name: "staging_artists",
        layer: Layer::Staging,
        sequence: None,
        ddl: "CREATE TABLE IF NOT EXISTS staging_artists (
            mbid                VARCHAR,
            artist_mb           VARCHAR,
            artist_lastfm       VARCHAR,
            country_mb          VARCHAR,
            country_lastfm      VARCHAR,
            tags_mb             VARCHAR,
            tags_lastfm         VARCHAR,
            listeners_lastfm    INTEGER,
            scrobbles_lastfm    INTEGER,
            ambiguous_artist    BOOLEAN
        )",
    },
    TableDef {
        name: "staging_charts",
        layer: Layer::Staging,
        sequence: None,
        ddl: "CREATE TABLE IF NOT EXISTS staging_charts (
            title   VARCHAR,
            rank    INTEGER,
            date    DATE,
            artist  VARCHAR,
            url     VARCHAR,
            region  VARCHAR,
            chart   VARCHAR,
            trend   VARCHAR,
            streams INTEGER
        )",
    },
    TableDef {
        name: "staging_countries",
        layer: Layer::Staging,
        sequence: None,
        ddl: "CREATE TABLE IF NOT EXISTS staging_countries (
            country_id      VARCHAR,
            country_name    VARCHAR,
            continent       VARCHAR
        )",
    },
    TableDef {
        name: "dim_artists",
        layer: Layer::Dimension,
        sequence: Some("seq_dim_artists"),
        ddl: "CREATE TABLE IF NOT EXISTS dim_artists (
            artist_id           INTEGER PRIMARY KEY DEFAULT nextval('seq_dim_artists'),
            name                VARCHAR,
            country             VARCHAR,
            continent           VARCHAR,
            tags                VARCHAR,
            listeners_lastfm    INTEGER,
            scrobbles_lastfm    INTEGER
        )",
    },
    TableDef {
        name: "dim_charts",
        layer: Layer::Dimension,
        sequence: Some("seq_dim_charts"),
        ddl: "CREATE TABLE IF NOT EXISTS dim_charts (
            chart_id    INTEGER PRIMARY KEY DEFAULT nextval('seq_dim_charts'),
            name        VARCHAR,
            region      VARCHAR,
            continent   VARCHAR
        )",
    },
    TableDef {
        name: "dim_songs",
        layer: Layer::Dimension,
        sequence: None,
        ddl: "CREATE TABLE IF NOT EXISTS dim_songs (
            song_id     VARCHAR PRIMARY KEY,
            name        VARCHAR,
            artist_name VARCHAR
        )",
    },
    TableDef {
        name: "dim_calendar",
        layer: Layer::Dimension,
        sequence: None,
        ddl: "CREATE TABLE IF NOT EXISTS dim_calendar (
            chart_date  DATE PRIMARY KEY,
            year        INTEGER,
            month       INTEGER,
            week        INTEGER,
            weekday     VARCHAR,
            day         INTEGER
        )",
    },
    TableDef {
        name: "fact_streams",
        layer: Layer::Fact,
        sequence: Some("seq_fact_streams"),
        ddl: "CREATE TABLE IF NOT EXISTS fact_streams (
            stream_id   INTEGER PRIMARY KEY DEFAULT nextval('seq_fact_streams'),
            song_id     VARCHAR NOT NULL,
            rank        INTEGER,
            chart_date  DATE NOT NULL,
            artist_id   INTEGER NOT NULL,
            chart_id    INTEGER NOT NULL,
            trend       VARCHAR,
            streams     INTEGER,
            FOREIGN KEY (song_id) REFERENCES dim_songs (song_id),
            FOREIGN KEY (artist_id) REFERENCES dim_artists (artist_id),
            FOREIGN KEY (chart_id) REFERENCES dim_charts (chart_id),
            FOREIGN KEY (chart_date) REFERENCES dim_calendar (chart_date)
        )",
    },
];

/// Names of all tables in a layer, in creation order
pub fn table_names(layer: Layer) -> Vec<TableName> {
    TABLES
        .iter()
        .filter(|t| t.layer == layer)
        .map(|t| TableName::new(t.name))
        .collect()
}

/// Tables in creation order: staging, then dimensions, then facts
fn creation_order() -> Vec<&'static TableDef> {
    let mut tables: Vec<&TableDef> = TABLES.iter().collect();
    // Stable sort keeps declaration order within a layer
    tables.sort_by_key(|t| t.layer);
    tables
}

/// Issues DROP / CREATE DDL for the warehouse tables
pub struct SchemaManager<'a> {
    db: &'a dyn Database,
    config: &'a SchemaConfig,
}

impl<'a> SchemaManager<'a> {
    /// Create a new schema manager
    pub fn new(db: &'a dyn Database, config: &'a SchemaConfig) -> Self {
        Self { db, config }
    }

    /// Drop fact and dimension tables (and staging tables when configured),
    /// facts first. Missing tables are ignored.
    ///
    /// Returns the names of the tables the DROP statements targeted.
    pub async fn drop_all(&self) -> WarehouseResult<Vec<TableName>> {
        let mut dropped = Vec::new();
        if !self.config.drop_staging {
            let kept: Vec<String> = table_names(Layer::Staging)
                .iter()
                .map(|t| t.to_string())
                .collect();
            log::info!("Keeping staging tables: {}", kept.join(", "));
        }

        for table in creation_order().into_iter().rev() {
            if table.layer == Layer::Staging && !self.config.drop_staging {
                continue;
            }

            log::info!("Dropping table {}", table.name);
            self.db
                .execute(&format!("DROP TABLE IF EXISTS {}", table.name))
                .await?;
            if let Some(seq) = table.sequence {
                self.db
                    .execute(&format!("DROP SEQUENCE IF EXISTS {}", seq))
                    .await?;
            }
            dropped.push(TableName::new(table.name));
        }

        Ok(dropped)
    }

    /// Create staging, dimension and fact tables, each only if absent.
    ///
    /// Returns the names of all catalogue tables in creation order.
    pub async fn create_all(&self) -> WarehouseResult<Vec<TableName>> {
        let mut created = Vec::new();

        for table in creation_order() {
            if let Some(seq) = table.sequence {
                self.db
                    .execute(&format!("CREATE SEQUENCE IF NOT EXISTS {} START 1", seq))
                    .await?;
            }

            log::info!("Creating table {}", table.name);
            log::debug!("{}", table.ddl);
            self.db.execute(table.ddl).await?;
            created.push(TableName::new(table.name));
        }

        Ok(created)
    }

    /// Drop then create, as the `create-tables` entry point does
    pub async fn reset(&self) -> WarehouseResult<()> {
        self.drop_all().await?;
        self.create_all().await?;
        Ok(())
    }

    /// Catalogue tables that do not exist in the database
    pub async fn missing_tables(&self) -> WarehouseResult<Vec<TableName>> {
        let mut missing = Vec::new();
        for table in TABLES {
            if !self.db.relation_exists(table.name).await? {
                missing.push(TableName::new(table.name));
            }
        }
        Ok(missing)
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
