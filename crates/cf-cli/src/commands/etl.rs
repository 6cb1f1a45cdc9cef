//! etl command implementation: staging loads, transforms, quality checks

use anyhow::{bail, Context, Result};
use cf_core::Config;
use cf_db::Database;
use cf_quality::{checks_from_config, QualityRunner, QualitySummary};
use cf_warehouse::{SchemaManager, StagingLoader, TransformEngine};

use crate::cli::GlobalArgs;
use crate::commands::common::{self, ExitCode, EXIT_QUALITY_FAILURE};

/// Execute the etl command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let db = common::connect(&config)?;

    let summary = run_pipeline(&db, &config).await?;
    common::close(db)?;

    finish(&summary)
}

/// Staging, then transforms, then quality checks.
///
/// Errors from the first two stages abort the run. Check failures are
/// returned in the summary.
pub(crate) async fn run_pipeline(db: &dyn Database, config: &Config) -> Result<QualitySummary> {
    // Validate checks before touching any table
    let checks =
        checks_from_config(&config.quality).context("Invalid quality check configuration")?;

    let missing = SchemaManager::new(db, &config.schema)
        .missing_tables()
        .await
        .context("Failed to inspect warehouse tables")?;
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|t| t.as_str()).collect();
        bail!(
            "Warehouse tables missing: {}. Run `chartflow create-tables` first.",
            names.join(", ")
        );
    }

    log::info!("Loading staging tables");
    let staged = StagingLoader::new(db, &config.sources)
        .load_all()
        .await
        .context("Failed to load staging tables")?;
    println!("Staging:");
    println!("  ✓ staging_countries ({} rows)", staged.countries);
    println!("  ✓ staging_artists ({} rows)", staged.artists);
    println!("  ✓ staging_charts ({} rows)", staged.charts);

    log::info!("Running transforms");
    let report = TransformEngine::new(db, &config.transform)
        .run()
        .await
        .context("Failed to populate warehouse tables")?;
    println!("\nTransforms:");
    for step in &report.steps {
        println!(
            "  ✓ {} ({} rows) [{}ms]",
            step.target,
            step.rows,
            step.duration.as_millis()
        );
    }

    log::info!("Running {} quality checks", checks.len());
    let (results, summary) = QualityRunner::new(db).run_all(&checks).await;
    println!("\nQuality checks:");
    for result in &results {
        let mark = if result.passed { "✓" } else { "✗" };
        println!("  {} [{}] {}", mark, result.severity, result.describe());
    }

    Ok(summary)
}

/// Print the closing summary and map fatal check failures to exit status 2
pub(crate) fn finish(summary: &QualitySummary) -> Result<()> {
    println!();
    println!(
        "Completed: {} checks passed, {} failed, {} errored in {}ms",
        summary.passed,
        summary.failed,
        summary.errors,
        summary.duration.as_millis()
    );

    if summary.all_passed() {
        log::info!("All {} quality checks passed", summary.total);
    } else {
        log::warn!(
            "{} of {} quality checks did not pass",
            summary.failed + summary.errors,
            summary.total
        );
    }

    if summary.has_fatal_failures() {
        return Err(ExitCode(EXIT_QUALITY_FAILURE).into());
    }
    Ok(())
}
