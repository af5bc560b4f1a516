use serde::{Deserialize, Serialize};
use std::fmt;

/// A categorical attribute of a media record that can hold several values.
///
/// Each dimension owns a lookup table of distinct values and a junction
/// table linking media rows to those values. The table and column names are
/// the ones downstream queries expect, so they must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Genre,
    Creator,
    Publisher,
    Franchise,
    Region,
}

impl Dimension {
    /// Every dimension, in the order ingest processes them.
    pub const ALL: [Self; 5] = [
        Self::Genre,
        Self::Creator,
        Self::Publisher,
        Self::Franchise,
        Self::Region,
    ];

    /// Lookup table name. Doubles as the value column name.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Genre => "genre",
            Self::Creator => "creator",
            Self::Publisher => "publisher",
            Self::Franchise => "franchise",
            Self::Region => "region",
        }
    }

    #[must_use]
    pub const fn value_column(self) -> &'static str {
        self.table()
    }

    /// Primary key column of the lookup table, also the foreign key column
    /// in the junction table.
    #[must_use]
    pub const fn id_column(self) -> &'static str {
        match self {
            Self::Genre => "genre_id",
            Self::Creator => "creator_id",
            Self::Publisher => "publisher_id",
            Self::Franchise => "franchise_id",
            Self::Region => "region_id",
        }
    }

    #[must_use]
    pub const fn junction_table(self) -> &'static str {
        match self {
            Self::Genre => "mediaGenres",
            Self::Creator => "mediaCreators",
            Self::Publisher => "mediaPublishers",
            Self::Franchise => "mediaFranchises",
            Self::Region => "mediaRegions",
        }
    }

    /// Name of the column in the source export that carries this dimension.
    #[must_use]
    pub const fn source_field(self) -> &'static str {
        match self {
            Self::Genre => "genres",
            Self::Creator => "created_by",
            Self::Publisher => "published_by",
            Self::Franchise => "franchises",
            Self::Region => "regions",
        }
    }

    /// Whether a field without braces should be read as "no values".
    ///
    /// The region column in the export is sometimes a bare word rather than
    /// a braced list; such cells carry no usable regions.
    #[must_use]
    pub const fn requires_braces(self) -> bool {
        matches!(self, Self::Region)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}
