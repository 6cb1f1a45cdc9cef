//! Staging loads from source files
//!
//! Two paths feed the staging tables:
//!
//! - the country reference files are newline-delimited JSON objects mapping a
//!   country id to one value. They are unpivoted, joined in memory, and
//!   inserted row by row into `staging_countries`, since the engine's bulk
//!   loader cannot reshape them;
//! - the artist and chart CSV files are bulk-copied straight into their
//!   staging tables by the engine.

use crate::error::{WarehouseError, WarehouseResult};
use cf_core::{SourcesConfig, TableName};
use cf_db::Database;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

const COUNTRY_INSERT: &str =
    "INSERT INTO staging_countries (country_id, country_name, continent) VALUES (?, ?, ?)";

/// One `(country id, value)` pair from a reference file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub country_id: String,
    /// `None` when the source value is JSON `null`
    pub value: Option<String>,
}

/// A joined row ready for `staging_countries`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRow {
    pub country_id: String,
    pub country_name: Option<String>,
    /// `None` marks a country with no continent record
    pub continent: Option<String>,
}

/// Row counts per staging table after a load
#[derive(Debug, Clone, Default)]
pub struct StagingReport {
    pub countries: usize,
    pub artists: usize,
    pub charts: usize,
}

/// Parse newline-delimited JSON objects into unpivoted records.
///
/// Blank lines are skipped. Keys appear in the order serde_json yields them
/// within a line, lines in file order.
pub fn parse_reference_records(content: &str, origin: &str) -> WarehouseResult<Vec<ReferenceRecord>> {
    let mut records = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = |message: String| WarehouseError::MalformedReference {
            path: origin.to_string(),
            line: idx + 1,
            message,
        };

        let parsed: Value = serde_json::from_str(line).map_err(|e| malformed(e.to_string()))?;
        let Value::Object(map) = parsed else {
            return Err(malformed("expected a JSON object".to_string()));
        };

        for (country_id, value) in map {
            let value = match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(malformed(format!(
                        "value for '{country_id}' is not a scalar"
                    )))
                }
            };
            records.push(ReferenceRecord { country_id, value });
        }
    }

    Ok(records)
}

/// Left outer join of country-name records against continent records on
/// `country_id`.
///
/// Every country record yields at least one row, in input order; a country
/// with several continent records yields one row per match.
pub fn join_countries(countries: &[ReferenceRecord], continents: &[ReferenceRecord]) -> Vec<CountryRow> {
    let mut by_id: HashMap<&str, Vec<Option<&str>>> = HashMap::new();
    for record in continents {
        by_id
            .entry(record.country_id.as_str())
            .or_default()
            .push(record.value.as_deref());
    }

    let mut rows = Vec::with_capacity(countries.len());
    for country in countries {
        match by_id.get(country.country_id.as_str()) {
            Some(matches) => {
                for continent in matches {
                    rows.push(CountryRow {
                        country_id: country.country_id.clone(),
                        country_name: country.value.clone(),
                        continent: continent.map(str::to_string),
                    });
                }
            }
            None => rows.push(CountryRow {
                country_id: country.country_id.clone(),
                country_name: country.value.clone(),
                continent: None,
            }),
        }
    }
    rows
}

/// Loads source files into the staging tables
pub struct StagingLoader<'a> {
    db: &'a dyn Database,
    sources: &'a SourcesConfig,
}

impl<'a> StagingLoader<'a> {
    /// Create a new staging loader
    pub fn new(db: &'a dyn Database, sources: &'a SourcesConfig) -> Self {
        Self { db, sources }
    }

    /// Run every staging load: the country join first, then the bulk copies
    pub async fn load_all(&self) -> WarehouseResult<StagingReport> {
        let countries = self
            .load_reference_join(&self.sources.continent, &self.sources.country)
            .await?;
        let artists = self
            .bulk_load(&TableName::new("staging_artists"), &self.sources.artist_rank)
            .await?;
        let charts = self
            .bulk_load(&TableName::new("staging_charts"), &self.sources.chart)
            .await?;

        Ok(StagingReport {
            countries,
            artists,
            charts,
        })
    }

    /// Join the two reference files and insert the result into
    /// `staging_countries`. Returns the number of rows inserted.
    pub async fn load_reference_join(
        &self,
        continent_source: &Path,
        country_source: &Path,
    ) -> WarehouseResult<usize> {
        let continents = read_reference_file(continent_source, "staging_countries")?;
        let countries = read_reference_file(country_source, "staging_countries")?;
        let joined = join_countries(&countries, &continents);

        let unmatched = joined.iter().filter(|r| r.continent.is_none()).count();
        if unmatched > 0 {
            log::warn!("{unmatched} countries have no continent");
        }

        let rows: Vec<Vec<Option<String>>> = joined
            .into_iter()
            .map(|r| vec![Some(r.country_id), r.country_name, r.continent])
            .collect();

        log::info!("Inserting {} rows into staging_countries", rows.len());
        let inserted = self.db.execute_rows(COUNTRY_INSERT, &rows).await?;
        Ok(inserted)
    }

    /// Bulk-copy a CSV file into `table`. Returns the number of rows added.
    ///
    /// The file's header must list the table's columns in DDL order.
    pub async fn bulk_load(&self, table: &TableName, source: &Path) -> WarehouseResult<usize> {
        ensure_exists(source, table)?;
        // COPY is always issued with an absolute path
        let source = std::path::absolute(source).map_err(|e| WarehouseError::IoWithPath {
            path: source.display().to_string(),
            source: e,
        })?;
        let count_sql = format!("SELECT * FROM {table}");

        let before = self.db.query_count(&count_sql).await?;
        log::info!("Copying {} into {}", source.display(), table);
        self.db.copy_csv(table, &source).await?;
        let after = self.db.query_count(&count_sql).await?;

        Ok(after.saturating_sub(before))
    }
}

fn ensure_exists(path: &Path, table: &str) -> WarehouseResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(WarehouseError::SourceNotFound {
            table: table.to_string(),
            path: path.display().to_string(),
        })
    }
}

fn read_reference_file(path: &Path, table: &str) -> WarehouseResult<Vec<ReferenceRecord>> {
    ensure_exists(path, table)?;
    let content = std::fs::read_to_string(path).map_err(|e| WarehouseError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_reference_records(&content, &path.display().to_string())
}

#[cfg(test)]
#[path = "staging_test.rs"]
mod tests;
