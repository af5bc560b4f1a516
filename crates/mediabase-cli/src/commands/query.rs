//! Aggregate reports, printed to stdout as JSON arrays.

use anyhow::{Context, Result};
use mediabase_core::query::SortOrder;
use mediabase_etl::Config;
use serde::Serialize;

pub fn ratings(config: &Config, sort: Option<SortOrder>) -> Result<()> {
    let db = super::open_existing(&config.database_path)?;
    let rows = db.ratings(sort).context("Ratings query failed")?;
    println!("{}", render_json(&rows)?);
    Ok(())
}

pub fn creators(config: &Config, with_average: bool) -> Result<()> {
    let db = super::open_existing(&config.database_path)?;
    let rows = db
        .creator_works(with_average)
        .context("Creators query failed")?;
    println!("{}", render_json(&rows)?);
    Ok(())
}

pub fn publishers(config: &Config, with_count: bool) -> Result<()> {
    let db = super::open_existing(&config.database_path)?;
    let rows = db
        .publisher_genres(with_count)
        .context("Publishers query failed")?;
    println!("{}", render_json(&rows)?);
    Ok(())
}

fn render_json<T: Serialize>(rows: &[T]) -> Result<String> {
    serde_json::to_string_pretty(rows).context("Failed to serialize query results")
}
