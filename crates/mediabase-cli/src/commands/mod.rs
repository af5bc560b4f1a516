pub mod config;
pub mod ingest;
pub mod init;
pub mod query;
pub mod status;

pub use ingest::run_ingest;
pub use init::init_database;
pub use status::show_status;

use anyhow::{Context, Result};
use mediabase_core::Database;
use std::path::Path;

/// Open an existing catalog without touching its schema.
fn open_existing(db_path: &Path) -> Result<Database> {
    if !db_path.exists() {
        anyhow::bail!(
            "Database not found: {}\n\nRun `mediabase init` or `mediabase ingest` first.",
            db_path.display()
        );
    }
    Database::open_read_only(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))
}
