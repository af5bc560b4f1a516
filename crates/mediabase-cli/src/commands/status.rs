use anyhow::Result;
use mediabase_core::Dimension;
use mediabase_etl::Config;

pub fn show_status(config: &Config) -> Result<()> {
    let db_path = &config.database_path;
    let db = super::open_existing(db_path)?;

    println!("\n📊 Mediabase Status\n");
    println!("  Database: {}", db_path.display());

    if !db.has_schema()? {
        println!("\n  No catalog tables yet. Run `mediabase init` to create them.");
        return Ok(());
    }

    println!("  Media rows: {}", db.count_media()?);
    println!();
    println!("  {:<10} {:>8} {:>8}", "", "values", "links");
    for dimension in Dimension::ALL {
        println!(
            "  {:<10} {:>8} {:>8}",
            dimension.table(),
            db.count_dimension_values(dimension)?,
            db.count_edges(dimension)?
        );
    }

    Ok(())
}
