//! Dimension and fact transforms
//!
//! Each transform is one INSERT...SELECT that writes a single warehouse table
//! from the tables it declares in `reads`. Execution order comes from the
//! dependency graph in `cf_core::dag`, never from declaration order alone.

use crate::error::{WarehouseError, WarehouseResult};
use crate::song_id::{macro_sql, malformed_url_from_message};
use cf_core::{TableName, TransformConfig, TransformDag};
use cf_db::{Database, DbError};
use std::time::{Duration, Instant};

/// A single INSERT...SELECT populating `target`
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    /// Table the statement inserts into
    pub target: &'static str,

    /// Tables the statement selects from, including those reached only
    /// through foreign keys
    pub reads: &'static [&'static str],

    /// The statement itself
    pub sql: &'static str,
}

/// Warehouse transforms in declaration order
pub const TRANSFORMS: &[Transform] = &[
    Transform {
        target: "dim_calendar",
        reads: &["staging_charts"],
        sql: "INSERT INTO dim_calendar (chart_date, year, month, week, weekday, day)
    SELECT DISTINCT
        c.date,
        EXTRACT(year FROM c.date),
        EXTRACT(month FROM c.date),
        EXTRACT(week FROM c.date),
        CAST(EXTRACT(isodow FROM c.date) AS VARCHAR),
        EXTRACT(day FROM c.date)
    FROM staging_charts AS c
    WHERE c.date IS NOT NULL",
    },
    Transform {
        target: "dim_charts",
        reads: &["staging_charts", "staging_countries"],
        sql: "INSERT INTO dim_charts (name, region, continent)
    SELECT DISTINCT ON (c.chart, c.region) c.chart, c.region, cou.continent
    FROM staging_charts AS c
    LEFT JOIN staging_countries AS cou
        ON c.region = cou.country_name
    WHERE c.chart IS NOT NULL
    ORDER BY c.chart, c.region, cou.continent",
    },
    Transform {
        target: "dim_songs",
        reads: &["staging_charts"],
        sql: "INSERT INTO dim_songs (song_id, name, artist_name)
    SELECT DISTINCT
        song_id_from_url(c.url),
        FIRST_VALUE(c.title) OVER (PARTITION BY c.url ORDER BY c.date DESC),
        FIRST_VALUE(c.artist) OVER (PARTITION BY c.url ORDER BY c.date DESC)
    FROM staging_charts AS c
    WHERE c.url IS NOT NULL",
    },
    Transform {
        target: "dim_artists",
        reads: &["staging_charts", "staging_artists", "staging_countries"],
        sql: "INSERT INTO dim_artists (name, country, continent, tags, listeners_lastfm, scrobbles_lastfm)
    SELECT DISTINCT ON (c.artist)
        c.artist, a.country_mb, cou.continent, a.tags_mb, a.listeners_lastfm, a.scrobbles_lastfm
    FROM staging_charts AS c
    LEFT JOIN (
        SELECT artist_mb, country_mb, LOWER(tags_mb) AS tags_mb, listeners_lastfm, scrobbles_lastfm
        FROM staging_artists
        WHERE country_mb IS NOT NULL
          AND tags_mb IS NOT NULL
    ) AS a
        ON c.artist = a.artist_mb
    LEFT JOIN staging_countries AS cou
        ON a.country_mb = cou.country_name
    WHERE c.artist IS NOT NULL
    ORDER BY c.artist",
    },
    Transform {
        target: "fact_streams",
        reads: &[
            "staging_charts",
            "dim_artists",
            "dim_charts",
            "dim_songs",
            "dim_calendar",
        ],
        sql: "INSERT INTO fact_streams (song_id, rank, chart_date, artist_id, chart_id, trend, streams)
    SELECT
        song_id_from_url(stg.url), stg.rank, stg.date, a.artist_id, ch.chart_id, stg.trend,
        SUM(stg.streams)
    FROM staging_charts AS stg
    LEFT JOIN dim_artists AS a
        ON stg.artist = a.name
    LEFT JOIN dim_charts AS ch
        ON stg.chart = ch.name
       AND stg.region IS NOT DISTINCT FROM ch.region
    WHERE stg.artist IS NOT NULL
      AND stg.chart IS NOT NULL
      AND stg.url IS NOT NULL
      AND stg.date IS NOT NULL
    GROUP BY song_id_from_url(stg.url), stg.rank, stg.date, a.artist_id, ch.chart_id, stg.trend",
    },
];

/// One executed transform
#[derive(Debug, Clone)]
pub struct TransformStep {
    pub target: TableName,
    /// Rows inserted by the statement
    pub rows: usize,
    pub duration: Duration,
}

/// Outcome of a transform run
#[derive(Debug, Clone, Default)]
pub struct TransformReport {
    /// Executed transforms, in execution order
    pub steps: Vec<TransformStep>,
    /// Total execution time
    pub duration: Duration,
}

impl TransformReport {
    /// Rows inserted into `table`, if its transform ran
    pub fn rows_for(&self, table: &str) -> Option<usize> {
        self.steps
            .iter()
            .find(|s| s.target == table)
            .map(|s| s.rows)
    }
}

/// Runs transforms against the warehouse in dependency order
pub struct TransformEngine<'a> {
    db: &'a dyn Database,
    config: &'a TransformConfig,
    transforms: &'a [Transform],
}

impl<'a> TransformEngine<'a> {
    /// Create an engine over the warehouse transforms
    pub fn new(db: &'a dyn Database, config: &'a TransformConfig) -> Self {
        Self::with_transforms(db, config, TRANSFORMS)
    }

    /// Create an engine over an explicit transform list
    pub fn with_transforms(
        db: &'a dyn Database,
        config: &'a TransformConfig,
        transforms: &'a [Transform],
    ) -> Self {
        Self {
            db,
            config,
            transforms,
        }
    }

    /// Transforms in execution order.
    ///
    /// Fails on a cycle or when two transforms write the same table.
    pub fn plan(&self) -> WarehouseResult<Vec<&'a Transform>> {
        let dag = TransformDag::build(
            self.transforms
                .iter()
                .map(|t| (t.target, t.reads.iter().copied())),
        )?;

        let order = dag.execution_order()?;
        for table in &order {
            log::debug!(
                "{} after [{}]",
                table,
                dag.dependencies(table).join(", ")
            );
        }
        let transforms = self.transforms;
        Ok(order
            .iter()
            .filter_map(|table| transforms.iter().find(|t| *table == t.target))
            .collect())
    }

    /// Install the SQL functions the transforms call
    pub async fn install_functions(&self) -> WarehouseResult<()> {
        let sql = macro_sql(&self.config.song_url_prefix);
        log::debug!("{}", sql);
        self.db.execute_batch(&sql).await?;
        Ok(())
    }

    /// Plan, install functions, then execute every transform in order.
    ///
    /// Stops at the first failing statement; tables already populated keep
    /// their rows.
    pub async fn run(&self) -> WarehouseResult<TransformReport> {
        let start = Instant::now();
        let plan = self.plan()?;
        self.install_functions().await?;

        let mut steps = Vec::with_capacity(plan.len());
        for transform in plan {
            log::info!("Populating {}", transform.target);
            log::debug!("{}", transform.sql);

            let step_start = Instant::now();
            let rows = self
                .db
                .execute(transform.sql)
                .await
                .map_err(|e| self.classify(e))?;
            let duration = step_start.elapsed();

            log::info!(
                "Inserted {} rows into {} in {}ms",
                rows,
                transform.target,
                duration.as_millis()
            );
            steps.push(TransformStep {
                target: TableName::new(transform.target),
                rows,
                duration,
            });
        }

        Ok(TransformReport {
            steps,
            duration: start.elapsed(),
        })
    }

    /// Surface errors raised by the song-id macro as typed errors
    fn classify(&self, err: DbError) -> WarehouseError {
        malformed_url_from_message(&err.to_string(), &self.config.song_url_prefix)
            .unwrap_or(WarehouseError::Db(err))
    }
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod tests;
