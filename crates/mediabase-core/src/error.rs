use thiserror::Error;

use crate::model::MediaId;

#[derive(Debug, Error)]
pub enum Error {
    /// The store rejected schema creation.
    #[error("schema error: {0}")]
    Schema(#[source] rusqlite::Error),

    /// A media row with this id already exists.
    #[error("duplicate media id {media_id}")]
    DuplicateKey { media_id: MediaId },

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// A multi-value field that cannot be parsed at all.
    #[error("malformed field value {value:?}: {reason}")]
    MalformedField { value: String, reason: &'static str },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Returns `true` when the error is a media primary-key collision.
    #[must_use]
    pub const fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
