//! Streaming reader for the denormalized CSV export.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use mediabase_core::model::round_score;
use mediabase_core::{Dimension, Media, MediaId};
use serde::Deserialize;

use crate::error::{IngestError, IngestResult};

/// One record of the export, as read from the CSV.
///
/// Empty cells come through as `None`. The five list columns keep their raw
/// brace-literal text; parsing happens during ingest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SourceRow {
    pub id: i64,
    pub media_type: Option<String>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub long_description: Option<String>,
    pub short_description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub review_url: Option<String>,
    pub review_score: Option<f64>,
    pub slug: Option<String>,
    pub genres: Option<String>,
    pub created_by: Option<String>,
    pub published_by: Option<String>,
    pub franchises: Option<String>,
    pub regions: Option<String>,
}

impl SourceRow {
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the raw list text for `dimension`.
    #[must_use]
    pub fn with_field(mut self, dimension: Dimension, raw: impl Into<String>) -> Self {
        let raw = Some(raw.into());
        match dimension {
            Dimension::Genre => self.genres = raw,
            Dimension::Creator => self.created_by = raw,
            Dimension::Publisher => self.published_by = raw,
            Dimension::Franchise => self.franchises = raw,
            Dimension::Region => self.regions = raw,
        }
        self
    }

    /// The raw list text for `dimension`.
    #[must_use]
    pub fn field(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Genre => self.genres.as_deref(),
            Dimension::Creator => self.created_by.as_deref(),
            Dimension::Publisher => self.published_by.as_deref(),
            Dimension::Franchise => self.franchises.as_deref(),
            Dimension::Region => self.regions.as_deref(),
        }
    }

    /// The scalar attributes of this row as a media record.
    #[must_use]
    pub fn to_media(&self) -> Media {
        Media {
            id: MediaId::new(self.id),
            media_type: self.media_type.clone(),
            name: self.name.clone(),
            short_name: self.short_name.clone(),
            long_description: self.long_description.clone(),
            short_description: self.short_description.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
            review_url: self.review_url.clone(),
            review_score: self.review_score.map(round_score),
            slug: self.slug.clone(),
        }
    }
}

/// A CSV export opened for streaming.
#[derive(Debug)]
pub struct CsvSource<R> {
    reader: csv::Reader<R>,
}

impl CsvSource<File> {
    /// Open an export file. The first line must be the header row.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Open`] if the file cannot be opened.
    pub fn open(path: &Path) -> IngestResult<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|source| IngestError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        log::debug!("Opened source {}", path.display());
        Ok(Self { reader })
    }
}

impl<R: Read> CsvSource<R> {
    #[must_use]
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: csv::ReaderBuilder::new()
                .has_headers(true)
                .from_reader(reader),
        }
    }

    /// Iterate over the records in source order.
    ///
    /// Each item is either a decoded row or an [`IngestError::Source`] naming
    /// the 0-based index of the record that failed.
    pub fn rows(&mut self) -> impl Iterator<Item = IngestResult<SourceRow>> + '_ {
        self.reader
            .deserialize::<SourceRow>()
            .enumerate()
            .map(|(row, record)| record.map_err(|source| IngestError::Source { row, source }))
    }
}
