use anyhow::{Context, Result};
use mediabase_core::{Database, Dimension};
use mediabase_etl::{Config, CsvSource, IngestReport, Ingestor};
use std::path::PathBuf;

pub fn run_ingest(config: &Config, path: Option<PathBuf>, reset: bool) -> Result<IngestReport> {
    let source_path = path
        .or_else(|| config.source_path.clone())
        .context("No CSV export given; pass a path or set `source_path` in the config")?;

    let db = Database::open(&config.database_path).with_context(|| {
        format!("Failed to open database {}", config.database_path.display())
    })?;

    let mut source = CsvSource::open(&source_path)?;
    let options = config.ingest_options(reset);
    let report = Ingestor::new(&db, options)
        .ingest_source(&mut source)
        .with_context(|| format!("Ingest of {} failed", source_path.display()))?;

    print_report(&report);
    Ok(report)
}

fn print_report(report: &IngestReport) {
    let elapsed = report.finished_at - report.started_at;

    println!("\n✓ Ingest complete\n");
    println!("  Media rows: {}", report.media_rows);
    for dimension in Dimension::ALL {
        let counts = report.dimension(dimension);
        println!(
            "  {:<10} {} new values, {} links",
            format!("{dimension}:"),
            counts.values_created,
            counts.edges_created
        );
    }
    println!("  Elapsed: {} ms", elapsed.num_milliseconds());
}
