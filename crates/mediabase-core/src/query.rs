//! Read-only aggregate queries over the normalized catalog.
//!
//! These are the reports the catalog is built to answer: ratings, creators
//! with their works, and publishers with the genres they publish in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::schema::Database;

/// Sort direction for rating listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    const fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(Error::InvalidData(format!("unknown sort order: {s}")))
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub name: Option<String>,
    pub review_score: Option<f64>,
}

/// One work attributed to a creator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorWork {
    pub creator: Option<String>,
    pub name: Option<String>,
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_score: Option<f64>,
    /// Mean review score across all of this creator's works.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
}

/// A genre that one of a publisher's works belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublisherGenre {
    pub publisher: Option<String>,
    pub genre: Option<String>,
    /// Number of distinct genres across the publisher's works.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distinct_genres: Option<i64>,
}

impl Database {
    /// Media names with their review scores, optionally sorted by score.
    pub fn ratings(&self, sort: Option<SortOrder>) -> Result<Vec<Rating>> {
        let sql = match sort {
            Some(order) => format!(
                "SELECT name, review_score FROM media ORDER BY review_score {order}, id"
            ),
            None => "SELECT name, review_score FROM media".to_string(),
        };

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Rating {
                    name: row.get(0)?,
                    review_score: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Every (creator, work) pair, ordered by creator.
    ///
    /// With `with_average`, rows also carry the work's score and the
    /// creator's average score, and are ordered by that average, highest
    /// first.
    pub fn creator_works(&self, with_average: bool) -> Result<Vec<CreatorWork>> {
        let sql = if with_average {
            "SELECT creator.creator, media.name, media.media_type, media.review_score,
                    AVG(media.review_score) OVER (PARTITION BY mediaCreators.creator_id)
                        AS avg_studio_rating
             FROM mediaCreators
             LEFT JOIN creator ON mediaCreators.creator_id = creator.creator_id
             LEFT JOIN media ON mediaCreators.media_id = media.id
             ORDER BY avg_studio_rating DESC, creator.creator ASC, mediaCreators.junction_id"
        } else {
            "SELECT creator.creator, media.name, media.media_type
             FROM mediaCreators
             LEFT JOIN creator ON mediaCreators.creator_id = creator.creator_id
             LEFT JOIN media ON mediaCreators.media_id = media.id
             ORDER BY creator.creator ASC, mediaCreators.junction_id"
        };

        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CreatorWork {
                    creator: row.get(0)?,
                    name: row.get(1)?,
                    media_type: row.get(2)?,
                    review_score: if with_average { row.get(3)? } else { None },
                    average_rating: if with_average { row.get(4)? } else { None },
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Every (publisher, genre) pair reachable through a shared media record,
    /// ordered by publisher.
    ///
    /// With `with_count`, rows also carry the number of distinct genres the
    /// publisher covers and are ordered by that count, lowest first.
    pub fn publisher_genres(&self, with_count: bool) -> Result<Vec<PublisherGenre>> {
        let sql = if with_count {
            "WITH pairs AS (
                 SELECT mp.publisher_id, p.publisher, mg.genre_id, g.genre,
                        mp.junction_id AS mp_junction, mg.junction_id AS mg_junction
                 FROM mediaPublishers AS mp
                 LEFT JOIN publisher AS p ON mp.publisher_id = p.publisher_id
                 INNER JOIN mediaGenres AS mg ON mp.media_id = mg.media_id
                 INNER JOIN genre AS g ON mg.genre_id = g.genre_id
             ),
             counts AS (
                 SELECT publisher_id, COUNT(DISTINCT genre_id) AS distinct_genres
                 FROM pairs
                 GROUP BY publisher_id
             )
             SELECT pairs.publisher, pairs.genre, counts.distinct_genres
             FROM pairs
             JOIN counts ON pairs.publisher_id = counts.publisher_id
             ORDER BY counts.distinct_genres ASC, pairs.publisher ASC,
                      pairs.mp_junction, pairs.mg_junction"
        } else {
            "SELECT p.publisher, g.genre
             FROM mediaPublishers AS mp
             LEFT JOIN publisher AS p ON mp.publisher_id = p.publisher_id
             INNER JOIN mediaGenres AS mg ON mp.media_id = mg.media_id
             INNER JOIN genre AS g ON mg.genre_id = g.genre_id
             ORDER BY p.publisher ASC, mp.junction_id, mg.junction_id"
        };

        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PublisherGenre {
                    publisher: row.get(0)?,
                    genre: row.get(1)?,
                    distinct_genres: if with_count { row.get(2)? } else { None },
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
