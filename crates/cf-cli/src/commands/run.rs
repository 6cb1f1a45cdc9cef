//! run command implementation: create-tables then etl on one connection

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::{common, create_tables, etl};

/// Execute the run command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let db = common::connect(&config)?;

    create_tables::reset_schema(&db, &config).await?;
    println!();
    let summary = etl::run_pipeline(&db, &config).await?;
    common::close(db)?;

    etl::finish(&summary)
}
