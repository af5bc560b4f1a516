//! Ingest error types.

use std::path::PathBuf;

use mediabase_core::MediaId;
use thiserror::Error;

/// Errors that abort an ingest run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A source row could not be written.
    #[error("row {row} (media id {media_id}){}: {source}", field_suffix(.field))]
    Row {
        /// 0-based index of the row in the source.
        row: usize,
        media_id: MediaId,
        /// The source field being processed, when one applies.
        field: Option<&'static str>,
        #[source]
        source: mediabase_core::Error,
    },

    /// The source file could not be opened.
    #[error("failed to open source {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A source record could not be read or decoded.
    #[error("source row {row}: {source}")]
    Source {
        row: usize,
        #[source]
        source: csv::Error,
    },

    /// A failure outside any single row (schema, transaction handling).
    #[error(transparent)]
    Core(#[from] mediabase_core::Error),
}

fn field_suffix(field: &Option<&'static str>) -> String {
    field.map(|f| format!(" field {f}")).unwrap_or_default()
}

impl IngestError {
    /// The underlying catalog error, if this error came from the store or
    /// the field parser.
    #[must_use]
    pub const fn core(&self) -> Option<&mediabase_core::Error> {
        match self {
            Self::Row { source, .. } | Self::Core(source) => Some(source),
            Self::Open { .. } | Self::Source { .. } => None,
        }
    }

    /// Returns `true` when the run failed because a media id already exists.
    #[must_use]
    pub fn is_duplicate_key(&self) -> bool {
        self.core().is_some_and(mediabase_core::Error::is_duplicate_key)
    }

    /// The source row index the error refers to, if any.
    #[must_use]
    pub const fn row(&self) -> Option<usize> {
        match self {
            Self::Row { row, .. } | Self::Source { row, .. } => Some(*row),
            Self::Open { .. } | Self::Core(_) => None,
        }
    }
}

/// Convenience alias for ingest results.
pub type IngestResult<T> = std::result::Result<T, IngestError>;
