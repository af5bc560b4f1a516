/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r"
-- Media records, one per export row
CREATE TABLE IF NOT EXISTS media (
    id INTEGER PRIMARY KEY NOT NULL,
    media_type VARCHAR,
    name VARCHAR,
    short_name VARCHAR,
    long_description TEXT,
    short_description TEXT,
    created_at DATETIME,
    updated_at DATETIME,
    review_url TEXT,
    review_score DECIMAL(2,1),
    slug VARCHAR
);

CREATE INDEX IF NOT EXISTS idx_media_review_score ON media(review_score);

-- Dimension lookup tables
CREATE TABLE IF NOT EXISTS genre (
    genre_id INTEGER PRIMARY KEY,
    genre VARCHAR UNIQUE
);

CREATE TABLE IF NOT EXISTS creator (
    creator_id INTEGER PRIMARY KEY,
    creator VARCHAR UNIQUE
);

CREATE TABLE IF NOT EXISTS publisher (
    publisher_id INTEGER PRIMARY KEY,
    publisher VARCHAR UNIQUE
);

CREATE TABLE IF NOT EXISTS franchise (
    franchise_id INTEGER PRIMARY KEY,
    franchise VARCHAR UNIQUE
);

CREATE TABLE IF NOT EXISTS region (
    region_id INTEGER PRIMARY KEY,
    region VARCHAR UNIQUE
);

-- Junction tables (many-to-many between media and each dimension)
CREATE TABLE IF NOT EXISTS mediaGenres (
    junction_id INTEGER PRIMARY KEY,
    media_id INTEGER REFERENCES media(id),
    genre_id INTEGER REFERENCES genre(genre_id)
);

CREATE INDEX IF NOT EXISTS idx_media_genres_media_id ON mediaGenres(media_id);
CREATE INDEX IF NOT EXISTS idx_media_genres_genre_id ON mediaGenres(genre_id);

CREATE TABLE IF NOT EXISTS mediaCreators (
    junction_id INTEGER PRIMARY KEY,
    media_id INTEGER REFERENCES media(id),
    creator_id INTEGER REFERENCES creator(creator_id)
);

CREATE INDEX IF NOT EXISTS idx_media_creators_media_id ON mediaCreators(media_id);
CREATE INDEX IF NOT EXISTS idx_media_creators_creator_id ON mediaCreators(creator_id);

CREATE TABLE IF NOT EXISTS mediaPublishers (
    junction_id INTEGER PRIMARY KEY,
    media_id INTEGER REFERENCES media(id),
    publisher_id INTEGER REFERENCES publisher(publisher_id)
);

CREATE INDEX IF NOT EXISTS idx_media_publishers_media_id ON mediaPublishers(media_id);
CREATE INDEX IF NOT EXISTS idx_media_publishers_publisher_id ON mediaPublishers(publisher_id);

CREATE TABLE IF NOT EXISTS mediaFranchises (
    junction_id INTEGER PRIMARY KEY,
    media_id INTEGER REFERENCES media(id),
    franchise_id INTEGER REFERENCES franchise(franchise_id)
);

CREATE INDEX IF NOT EXISTS idx_media_franchises_media_id ON mediaFranchises(media_id);
CREATE INDEX IF NOT EXISTS idx_media_franchises_franchise_id ON mediaFranchises(franchise_id);

CREATE TABLE IF NOT EXISTS mediaRegions (
    junction_id INTEGER PRIMARY KEY,
    media_id INTEGER REFERENCES media(id),
    region_id INTEGER REFERENCES region(region_id)
);

CREATE INDEX IF NOT EXISTS idx_media_regions_media_id ON mediaRegions(media_id);
CREATE INDEX IF NOT EXISTS idx_media_regions_region_id ON mediaRegions(region_id);
";

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: MIGRATION_001,
}];

/// Every table the schema creates, in dependency order.
pub const TABLES: &[&str] = &[
    "media",
    "genre",
    "creator",
    "publisher",
    "franchise",
    "region",
    "mediaGenres",
    "mediaCreators",
    "mediaPublishers",
    "mediaFranchises",
    "mediaRegions",
];
