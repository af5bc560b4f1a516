use anyhow::{Context, Result};
use mediabase_core::Database;
use mediabase_etl::Config;

pub fn init_database(config: &Config) -> Result<()> {
    let db_path = &config.database_path;
    let db = Database::open(db_path)
        .with_context(|| format!("Failed to initialize database {}", db_path.display()))?;

    log::info!("Schema ready at {}", db_path.display());

    println!("✓ Database ready: {}", db_path.display());
    println!("  Tables: {}", db.table_names()?.join(", "));

    Ok(())
}
