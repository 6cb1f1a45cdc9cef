//! Configuration types and parsing for chartflow.yml

use crate::check::{CheckConfig, Severity};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Default config file name looked up when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "chartflow.yml";

/// Track-URL prefix of the chart source; the remainder of the URL is the song id
pub const DEFAULT_SONG_URL_PREFIX: &str = "https://open.spotify.com/track/";

const IN_MEMORY_DB_PATH: &str = ":memory:";

/// Main pipeline configuration from chartflow.yml
///
/// Loaded once at process start and handed to each component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Warehouse connection
    pub database: DatabaseConfig,

    /// Source files feeding the staging tables
    pub sources: SourcesConfig,

    /// Schema management options
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Transform options
    #[serde(default)]
    pub transform: TransformConfig,

    /// Data-quality check options
    #[serde(default)]
    pub quality: QualityConfig,
}

/// Warehouse connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Logical database name, used in log output
    #[serde(default = "default_db_name")]
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            name: default_db_name(),
        }
    }
}

impl DatabaseConfig {
    /// Whether the warehouse lives only for the lifetime of the process
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_DB_PATH
    }
}

/// Source file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesConfig {
    /// Newline-delimited JSON: country id -> continent
    pub continent: PathBuf,

    /// Newline-delimited JSON: country id -> display name
    pub country: PathBuf,

    /// Artist metadata CSV (bulk-copied into staging_artists)
    pub artist_rank: PathBuf,

    /// Chart CSV (bulk-copied into staging_charts)
    pub chart: PathBuf,
}

/// Schema manager options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Also drop staging tables on `create-tables`
    #[serde(default)]
    pub drop_staging: bool,
}

/// Transform engine options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformConfig {
    /// Prefix every chart URL must carry; the rest of the URL is the song id
    #[serde(default = "default_song_url_prefix")]
    pub song_url_prefix: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            song_url_prefix: default_song_url_prefix(),
        }
    }
}

/// Quality checker options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QualityConfig {
    /// Severity overrides for built-in checks, keyed by check name
    #[serde(default)]
    pub severity_overrides: HashMap<String, Severity>,

    /// Extra checks run after the built-in ones
    #[serde(default)]
    pub checks: Vec<CheckConfig>,
}

fn default_db_path() -> String {
    IN_MEMORY_DB_PATH.to_string()
}

fn default_db_name() -> String {
    "main".to_string()
}

fn default_song_url_prefix() -> String {
    DEFAULT_SONG_URL_PREFIX.to_string()
}

impl Config {
    /// Load configuration from a file path
    ///
    /// Relative source and database paths are resolved against the directory
    /// containing the config file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut config = Self::parse(&content).map_err(|e| match e {
            CoreError::ConfigParseError { message, .. } => CoreError::ConfigParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;

        let root = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        config.resolve_paths(&root)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from YAML text without touching paths
    pub fn parse(content: &str) -> CoreResult<Self> {
        let config: Config =
            serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        if self.transform.song_url_prefix.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "transform.song_url_prefix cannot be empty".to_string(),
            });
        }
        if self.transform.song_url_prefix.contains('\'') {
            return Err(CoreError::ConfigInvalid {
                message: "transform.song_url_prefix cannot contain a single quote".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for check in &self.quality.checks {
            if check.name.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: "quality check name cannot be empty".to_string(),
                });
            }
            if check.sql.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("quality check '{}' has empty sql", check.name),
                });
            }
            if !seen.insert(check.name.as_str()) {
                return Err(CoreError::ConfigInvalid {
                    message: format!("duplicate quality check name '{}'", check.name),
                });
            }
        }

        Ok(())
    }

    /// Make every relative path absolute against `root`
    pub fn resolve_paths(&mut self, root: &Path) -> CoreResult<()> {
        let sources = &mut self.sources;
        for path in [
            &mut sources.continent,
            &mut sources.country,
            &mut sources.artist_rank,
            &mut sources.chart,
        ] {
            *path = absolute_path(root, path)?;
        }

        if !self.database.is_in_memory() {
            let db_path = absolute_path(root, Path::new(&self.database.path))?;
            self.database.path = db_path.display().to_string();
        }
        Ok(())
    }
}

/// Resolve `path` against `root` and anchor it to the working directory
fn absolute_path(root: &Path, path: &Path) -> CoreResult<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    std::path::absolute(&joined).map_err(|e| CoreError::IoWithPath {
        path: joined.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
