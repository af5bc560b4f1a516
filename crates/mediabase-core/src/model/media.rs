use serde::{Deserialize, Serialize};

use crate::model::ids::MediaId;

/// One reviewed media record (a game, movie, show, ...).
///
/// Timestamps are kept verbatim as the export provides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: MediaId,
    pub media_type: Option<String>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub long_description: Option<String>,
    pub short_description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub review_url: Option<String>,

    /// Review score, rounded to one fractional digit.
    pub review_score: Option<f64>,

    pub slug: Option<String>,
}

impl Media {
    #[must_use]
    pub fn new(id: MediaId, name: impl Into<String>) -> Self {
        Self {
            id,
            media_type: None,
            name: Some(name.into()),
            short_name: None,
            long_description: None,
            short_description: None,
            created_at: None,
            updated_at: None,
            review_url: None,
            review_score: None,
            slug: None,
        }
    }

    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    #[must_use]
    pub fn with_review_score(mut self, score: f64) -> Self {
        self.review_score = Some(round_score(score));
        self
    }
}

/// Round a review score to one decimal place, the precision the store keeps.
#[must_use]
pub fn round_score(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}
