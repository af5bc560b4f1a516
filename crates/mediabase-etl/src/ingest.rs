//! Ingest orchestrator: loads export rows into the normalized catalog.
//!
//! Each row becomes one `media` record. Its five list fields are parsed,
//! every value is upserted into the matching lookup table, and one junction
//! edge is written per value. Rows are processed strictly in source order
//! because later rows reuse values created by earlier ones.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::{DateTime, Utc};
use mediabase_core::{parse_dimension_field, Database, Dimension, MediaId};
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, IngestResult};
use crate::source::{CsvSource, SourceRow};

/// How much of an ingest run commits together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Atomicity {
    /// The whole run is one transaction. A failure leaves the store as it
    /// was before the run.
    #[default]
    Batch,
    /// Each row commits on its own. A failure keeps the rows before it and
    /// discards the failing row entirely.
    Row,
}

/// Explicit settings for one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    pub atomicity: Atomicity,
    /// Remove existing media rows and edges before loading. Lookup values
    /// are kept.
    pub reset: bool,
}

/// Values and edges created for one dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionCounts {
    pub values_created: usize,
    pub edges_created: usize,
}

impl DimensionCounts {
    fn add(&mut self, other: Self) {
        self.values_created += other.values_created;
        self.edges_created += other.edges_created;
    }
}

/// Summary of a successful ingest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub media_rows: usize,
    pub dimensions: BTreeMap<Dimension, DimensionCounts>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl IngestReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            media_rows: 0,
            dimensions: Dimension::ALL
                .into_iter()
                .map(|d| (d, DimensionCounts::default()))
                .collect(),
            started_at,
            finished_at: started_at,
        }
    }

    fn record(&mut self, row: &[(Dimension, DimensionCounts)]) {
        self.media_rows += 1;
        for &(dimension, counts) in row {
            self.dimensions.entry(dimension).or_default().add(counts);
        }
    }

    /// Counts for one dimension.
    #[must_use]
    pub fn dimension(&self, dimension: Dimension) -> DimensionCounts {
        self.dimensions.get(&dimension).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn total_edges(&self) -> usize {
        self.dimensions.values().map(|c| c.edges_created).sum()
    }
}

fn row_error(
    row: usize,
    media_id: MediaId,
    field: Option<&'static str>,
) -> impl FnOnce(mediabase_core::Error) -> IngestError {
    move |source| IngestError::Row {
        row,
        media_id,
        field,
        source,
    }
}

/// Drives rows through parse, upsert, and link against one database.
#[derive(Debug)]
pub struct Ingestor<'a> {
    db: &'a Database,
    options: IngestOptions,
}

impl<'a> Ingestor<'a> {
    #[must_use]
    pub const fn new(db: &'a Database, options: IngestOptions) -> Self {
        Self { db, options }
    }

    /// Ingest rows already in memory.
    ///
    /// # Errors
    ///
    /// Returns the first failure; see [`IngestError`]. What stays committed
    /// depends on [`IngestOptions::atomicity`].
    pub fn ingest<I>(&self, rows: I) -> IngestResult<IngestReport>
    where
        I: IntoIterator<Item = SourceRow>,
    {
        self.run(rows.into_iter().map(Ok))
    }

    /// Stream and ingest every record of a CSV source.
    ///
    /// # Errors
    ///
    /// Returns the first failure, including records that cannot be decoded.
    pub fn ingest_source<R: Read>(&self, source: &mut CsvSource<R>) -> IngestResult<IngestReport> {
        self.run(source.rows())
    }

    fn run<I>(&self, rows: I) -> IngestResult<IngestReport>
    where
        I: IntoIterator<Item = IngestResult<SourceRow>>,
    {
        let mut report = IngestReport::new(Utc::now());
        log::info!(
            "Starting ingest ({:?} atomicity{})",
            self.options.atomicity,
            if self.options.reset { ", reset" } else { "" }
        );

        match self.options.atomicity {
            Atomicity::Batch => {
                let tx = self.db.transaction()?;
                if self.options.reset {
                    self.db.clear_media()?;
                }
                for (index, row) in rows.into_iter().enumerate() {
                    let counts = self.ingest_row(index, &row?)?;
                    report.record(&counts);
                }
                tx.commit().map_err(mediabase_core::Error::from)?;
            }
            Atomicity::Row => {
                if self.options.reset {
                    let tx = self.db.transaction()?;
                    self.db.clear_media()?;
                    tx.commit().map_err(mediabase_core::Error::from)?;
                }
                for (index, row) in rows.into_iter().enumerate() {
                    let row = row?;
                    let tx = self.db.transaction()?;
                    let counts = self.ingest_row(index, &row)?;
                    tx.commit().map_err(mediabase_core::Error::from)?;
                    report.record(&counts);
                }
            }
        }

        report.finished_at = Utc::now();
        log::info!(
            "Ingest complete: {} media rows, {} edges",
            report.media_rows,
            report.total_edges()
        );
        Ok(report)
    }

    fn ingest_row(
        &self,
        index: usize,
        row: &SourceRow,
    ) -> IngestResult<Vec<(Dimension, DimensionCounts)>> {
        let media = row.to_media();
        let media_id = media.id;

        self.db
            .insert_media(&media)
            .map_err(row_error(index, media_id, Some("id")))?;

        let mut counts = Vec::with_capacity(Dimension::ALL.len());
        for dimension in Dimension::ALL {
            let linked = self
                .link_dimension(dimension, media_id, row.field(dimension))
                .map_err(row_error(index, media_id, Some(dimension.source_field())))?;
            counts.push((dimension, linked));
        }

        log::debug!("Ingested row {index} (media id {media_id})");
        Ok(counts)
    }

    /// Parse one raw list field, then upsert and link each of its values.
    fn link_dimension(
        &self,
        dimension: Dimension,
        media_id: MediaId,
        raw: Option<&str>,
    ) -> mediabase_core::Result<DimensionCounts> {
        let mut counts = DimensionCounts::default();

        for value in parse_dimension_field(dimension, raw)? {
            let resolved = self.db.upsert_dimension_value(dimension, &value)?;
            self.db.link(dimension, media_id, resolved.id)?;
            if resolved.created {
                counts.values_created += 1;
            }
            counts.edges_created += 1;
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, genres: &str, creators: &str) -> SourceRow {
        SourceRow::new(id, format!("Media {id}"))
            .with_field(Dimension::Genre, genres)
            .with_field(Dimension::Creator, creators)
    }

    fn edge_total(db: &Database) -> usize {
        Dimension::ALL
            .into_iter()
            .map(|d| db.count_edges(d).unwrap())
            .sum()
    }

    #[test]
    fn test_ingest_two_genres() {
        let db = Database::open_in_memory().unwrap();
        let ingestor = Ingestor::new(&db, IngestOptions::default());

        let report = ingestor
            .ingest([SourceRow::new(1, "Celeste").with_field(Dimension::Genre, "{Action,Platformer}")])
            .unwrap();

        assert_eq!(report.media_rows, 1);
        assert_eq!(db.count_dimension_values(Dimension::Genre).unwrap(), 2);
        assert_eq!(db.count_edges(Dimension::Genre).unwrap(), 2);
        assert_eq!(
            db.values_for_media(Dimension::Genre, MediaId::new(1)).unwrap(),
            vec!["Action", "Platformer"]
        );
        assert_eq!(
            report.dimension(Dimension::Genre),
            DimensionCounts {
                values_created: 2,
                edges_created: 2
            }
        );
    }

    #[test]
    fn test_ingest_end_to_end_scenario() {
        let db = Database::open_in_memory().unwrap();
        let ingestor = Ingestor::new(&db, IngestOptions::default());

        let report = ingestor
            .ingest([
                row(1, "{Action}", "{StudioX}"),
                row(2, "{Action,RPG}", "{StudioX}"),
            ])
            .unwrap();

        assert_eq!(db.count_media().unwrap(), 2);
        assert_eq!(db.count_dimension_values(Dimension::Genre).unwrap(), 2);
        assert_eq!(db.count_dimension_values(Dimension::Creator).unwrap(), 1);
        assert_eq!(db.count_edges(Dimension::Genre).unwrap(), 3);
        assert_eq!(db.count_edges(Dimension::Creator).unwrap(), 2);

        assert_eq!(report.media_rows, 2);
        assert_eq!(report.dimension(Dimension::Genre).values_created, 2);
        assert_eq!(report.dimension(Dimension::Genre).edges_created, 3);
        assert_eq!(report.dimension(Dimension::Creator).values_created, 1);
        assert_eq!(report.dimension(Dimension::Creator).edges_created, 2);
        assert_eq!(report.dimension(Dimension::Region), DimensionCounts::default());
        assert!(report.finished_at >= report.started_at);
    }

    #[test]
    fn test_reingest_existing_id_changes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let ingestor = Ingestor::new(&db, IngestOptions::default());
        ingestor.ingest([row(1, "{Action}", "{StudioX}")]).unwrap();

        let media_before = db.count_media().unwrap();
        let edges_before = edge_total(&db);
        let genres_before = db.count_dimension_values(Dimension::Genre).unwrap();

        let err = ingestor
            .ingest([row(2, "{Puzzle}", "{StudioY}"), row(1, "{RPG}", "{StudioZ}")])
            .unwrap_err();

        assert!(err.is_duplicate_key());
        assert_eq!(err.row(), Some(1));
        assert!(matches!(err, IngestError::Row { field: Some("id"), .. }));
        assert!(err.to_string().starts_with("row 1 (media id 1) field id:"));
        assert_eq!(db.count_media().unwrap(), media_before);
        assert_eq!(edge_total(&db), edges_before);
        assert_eq!(
            db.count_dimension_values(Dimension::Genre).unwrap(),
            genres_before
        );
    }

    #[test]
    fn test_row_atomicity_keeps_earlier_rows() {
        let db = Database::open_in_memory().unwrap();
        let ingestor = Ingestor::new(
            &db,
            IngestOptions {
                atomicity: Atomicity::Row,
                reset: false,
            },
        );

        let err = ingestor
            .ingest([
                row(1, "{Action}", "{StudioX}"),
                row(2, "{RPG}", "{StudioY"),
            ])
            .unwrap_err();

        match err {
            IngestError::Row {
                row, media_id, field, ..
            } => {
                assert_eq!(row, 1);
                assert_eq!(media_id, MediaId::new(2));
                assert_eq!(field, Some("created_by"));
            }
            other => panic!("unexpected error: {other}"),
        }

        // Row 1 is committed; row 2 left nothing behind, not even its genre.
        assert_eq!(db.count_media().unwrap(), 1);
        assert!(db.get_media(MediaId::new(2)).unwrap().is_none());
        assert!(db
            .find_dimension_value(Dimension::Genre, "RPG")
            .unwrap()
            .is_none());
        assert_eq!(db.count_edges(Dimension::Genre).unwrap(), 1);
    }

    #[test]
    fn test_batch_atomicity_rolls_back_everything() {
        let db = Database::open_in_memory().unwrap();
        let ingestor = Ingestor::new(&db, IngestOptions::default());

        let err = ingestor
            .ingest([
                row(1, "{Action}", "{StudioX}"),
                row(2, "{RPG", "{StudioY}"),
            ])
            .unwrap_err();

        assert!(matches!(
            err.core(),
            Some(mediabase_core::Error::MalformedField { .. })
        ));
        assert_eq!(db.count_media().unwrap(), 0);
        assert_eq!(edge_total(&db), 0);
        assert_eq!(db.count_dimension_values(Dimension::Genre).unwrap(), 0);
    }

    #[test]
    fn test_source_error_aborts_with_row_index() {
        let db = Database::open_in_memory().unwrap();
        let ingestor = Ingestor::new(&db, IngestOptions::default());
        let csv = "id,name,genres\n1,Ok,{Action}\nnot-an-id,Bad,{RPG}\n";
        let mut source = CsvSource::from_reader(csv.as_bytes());

        let err = ingestor.ingest_source(&mut source).unwrap_err();

        assert!(matches!(err, IngestError::Source { row: 1, .. }));
        assert_eq!(db.count_media().unwrap(), 0);
    }

    #[test]
    fn test_reset_allows_reingest() {
        let db = Database::open_in_memory().unwrap();
        let rows = || [row(1, "{Action}", "{StudioX}"), row(2, "{RPG}", "{StudioX}")];
        Ingestor::new(&db, IngestOptions::default())
            .ingest(rows())
            .unwrap();

        let report = Ingestor::new(
            &db,
            IngestOptions {
                reset: true,
                ..IngestOptions::default()
            },
        )
        .ingest(rows())
        .unwrap();

        assert_eq!(report.media_rows, 2);
        assert_eq!(report.dimension(Dimension::Genre).values_created, 0);
        assert_eq!(db.count_media().unwrap(), 2);
        assert_eq!(db.count_edges(Dimension::Genre).unwrap(), 2);
        assert_eq!(db.count_dimension_values(Dimension::Genre).unwrap(), 2);
    }

    #[test]
    fn test_unbraced_region_and_truncated_list() {
        let db = Database::open_in_memory().unwrap();
        let ingestor = Ingestor::new(&db, IngestOptions::default());

        ingestor
            .ingest([SourceRow::new(9, "Okami")
                .with_field(Dimension::Region, "US")
                .with_field(Dimension::Franchise, "{Okami,,Extra}")])
            .unwrap();

        assert_eq!(db.count_edges(Dimension::Region).unwrap(), 0);
        assert_eq!(db.count_dimension_values(Dimension::Region).unwrap(), 0);
        assert_eq!(
            db.values_for_media(Dimension::Franchise, MediaId::new(9)).unwrap(),
            vec!["Okami"]
        );
    }

    #[test]
    fn test_repeated_value_in_one_row_links_twice() {
        let db = Database::open_in_memory().unwrap();
        let ingestor = Ingestor::new(&db, IngestOptions::default());

        let report = ingestor
            .ingest([SourceRow::new(3, "Echo").with_field(Dimension::Genre, "{Action,Action}")])
            .unwrap();

        assert_eq!(db.count_dimension_values(Dimension::Genre).unwrap(), 1);
        assert_eq!(db.count_edges(Dimension::Genre).unwrap(), 2);
        assert_eq!(report.dimension(Dimension::Genre).values_created, 1);
        assert_eq!(report.dimension(Dimension::Genre).edges_created, 2);
    }
}
