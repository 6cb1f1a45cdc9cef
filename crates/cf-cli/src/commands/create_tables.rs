//! create-tables command implementation

use anyhow::{Context, Result};
use cf_core::Config;
use cf_db::Database;
use cf_warehouse::SchemaManager;

use crate::cli::GlobalArgs;
use crate::commands::common;

/// Execute the create-tables command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let db = common::connect(&config)?;

    reset_schema(&db, &config).await?;
    common::close(db)
}

/// Drop then recreate every warehouse table
pub(crate) async fn reset_schema(db: &dyn Database, config: &Config) -> Result<()> {
    let manager = SchemaManager::new(db, &config.schema);

    let dropped = manager
        .drop_all()
        .await
        .context("Failed to drop warehouse tables")?;
    println!("  ✓ dropped {} tables", dropped.len());

    let created = manager
        .create_all()
        .await
        .context("Failed to create warehouse tables")?;
    for table in &created {
        println!("  ✓ {}", table);
    }
    println!("\nCreated {} tables in {}", created.len(), db.db_type());
    Ok(())
}
