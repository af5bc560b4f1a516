use rusqlite::{Connection, OpenFlags, OptionalExtension, Transaction};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Dimension, DimensionValueId, Media, MediaId};

use super::migrations::{MIGRATIONS, TABLES};

/// A database connection with the normalized media catalog operations.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

/// The outcome of upserting a dimension value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub id: DimensionValueId,
    /// `true` when this call inserted the value.
    pub created: bool,
}

impl Database {
    /// Open (or create) a database at the given path and ensure the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    /// Open an existing database for reading only. The schema is not touched.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Self { conn };
        db.ensure_schema()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction on this connection.
    ///
    /// Every [`Database`] method called while the transaction is alive runs
    /// inside it. Dropping the transaction without committing rolls back.
    pub fn transaction(&self) -> Result<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Create the media, lookup, and junction tables if they are absent.
    ///
    /// Safe to call on an initialized store; already-applied migrations are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the store rejects the DDL.
    pub fn ensure_schema(&self) -> Result<()> {
        self.apply_migrations().map_err(Error::Schema)
    }

    fn apply_migrations(&self) -> rusqlite::Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                let tx = self.conn.unchecked_transaction()?;
                tx.execute_batch(migration.sql)?;
                tx.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
                tx.commit()?;
            }
        }

        Ok(())
    }

    /// Names of the catalog tables present in the store.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name != 'schema_migrations' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Whether every catalog table exists.
    pub fn has_schema(&self) -> Result<bool> {
        let present = self.table_names()?;
        Ok(TABLES.iter().all(|t| present.iter().any(|p| p == t)))
    }

    /// Remove all media rows and junction edges. Lookup values are kept.
    pub fn clear_media(&self) -> Result<()> {
        for dimension in Dimension::ALL {
            self.conn
                .execute(&format!("DELETE FROM {}", dimension.junction_table()), [])?;
        }
        self.conn.execute("DELETE FROM media", [])?;
        log::info!("Cleared media rows and junction edges");
        Ok(())
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        usize::try_from(count).map_err(|_| Error::InvalidData(format!("negative count {count}")))
    }
}

// Media
impl Database {
    /// Insert a media record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] when a record with the same id exists.
    pub fn insert_media(&self, media: &Media) -> Result<()> {
        let result = self.conn.execute(
            "INSERT INTO media (
                id, media_type, name, short_name, long_description,
                short_description, created_at, updated_at, review_url,
                review_score, slug
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                media.id,
                media.media_type,
                media.name,
                media.short_name,
                media.long_description,
                media.short_description,
                media.created_at,
                media.updated_at,
                media.review_url,
                media.review_score,
                media.slug,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Err(Error::DuplicateKey { media_id: media.id })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get a media record by id.
    pub fn get_media(&self, id: MediaId) -> Result<Option<Media>> {
        let media = self
            .conn
            .query_row(
                "SELECT id, media_type, name, short_name, long_description,
                        short_description, created_at, updated_at, review_url,
                        review_score, slug
                 FROM media WHERE id = ?1",
                [id],
                |row| {
                    Ok(Media {
                        id: row.get(0)?,
                        media_type: row.get(1)?,
                        name: row.get(2)?,
                        short_name: row.get(3)?,
                        long_description: row.get(4)?,
                        short_description: row.get(5)?,
                        created_at: row.get(6)?,
                        updated_at: row.get(7)?,
                        review_url: row.get(8)?,
                        review_score: row.get(9)?,
                        slug: row.get(10)?,
                    })
                },
            )
            .optional()?;
        Ok(media)
    }

    pub fn count_media(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM media")
    }
}

// Dimension lookups and junction edges
impl Database {
    /// Insert `value` into the lookup table of `dimension` unless it is
    /// already there, then return its id.
    pub fn upsert_dimension_value(&self, dimension: Dimension, value: &str) -> Result<Resolved> {
        let inserted = self
            .conn
            .prepare_cached(&format!(
                "INSERT OR IGNORE INTO {} ({}) VALUES (?1)",
                dimension.table(),
                dimension.value_column()
            ))?
            .execute([value])?;

        let id = self
            .conn
            .prepare_cached(&format!(
                "SELECT {} FROM {} WHERE {} = ?1",
                dimension.id_column(),
                dimension.table(),
                dimension.value_column()
            ))?
            .query_row([value], |row| row.get(0))?;

        Ok(Resolved {
            id,
            created: inserted == 1,
        })
    }

    /// Ensure `value` exists for `dimension` and return its stable id.
    pub fn upsert_and_resolve(&self, dimension: Dimension, value: &str) -> Result<DimensionValueId> {
        Ok(self.upsert_dimension_value(dimension, value)?.id)
    }

    /// Look up the id of an existing value without inserting.
    pub fn find_dimension_value(
        &self,
        dimension: Dimension,
        value: &str,
    ) -> Result<Option<DimensionValueId>> {
        let id = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE {} = ?1",
                    dimension.id_column(),
                    dimension.table(),
                    dimension.value_column()
                ),
                [value],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// All values of `dimension`, in insertion order.
    pub fn dimension_values(&self, dimension: Dimension) -> Result<Vec<(DimensionValueId, String)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {id}, {value} FROM {table} ORDER BY {id}",
            id = dimension.id_column(),
            value = dimension.value_column(),
            table = dimension.table(),
        ))?;
        let values = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(values)
    }

    pub fn count_dimension_values(&self, dimension: Dimension) -> Result<usize> {
        self.count(&format!("SELECT COUNT(*) FROM {}", dimension.table()))
    }

    /// Append one junction edge between a media record and a dimension value.
    ///
    /// No uniqueness check is made; linking the same pair twice stores two
    /// edges.
    pub fn link(
        &self,
        dimension: Dimension,
        media_id: MediaId,
        value_id: DimensionValueId,
    ) -> Result<()> {
        self.conn
            .prepare_cached(&format!(
                "INSERT INTO {} (media_id, {}) VALUES (?1, ?2)",
                dimension.junction_table(),
                dimension.id_column()
            ))?
            .execute(rusqlite::params![media_id, value_id])?;
        Ok(())
    }

    pub fn count_edges(&self, dimension: Dimension) -> Result<usize> {
        self.count(&format!(
            "SELECT COUNT(*) FROM {}",
            dimension.junction_table()
        ))
    }

    /// Values linked to a media record, in the order they were linked.
    pub fn values_for_media(&self, dimension: Dimension, media_id: MediaId) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT d.{value}
             FROM {junction} AS j
             JOIN {table} AS d ON j.{id} = d.{id}
             WHERE j.media_id = ?1
             ORDER BY j.junction_id",
            value = dimension.value_column(),
            junction = dimension.junction_table(),
            table = dimension.table(),
            id = dimension.id_column(),
        ))?;
        let values = stmt
            .query_map([media_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
        assert!(db.has_schema().unwrap());
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let before = db.table_names().unwrap();

        db.ensure_schema().unwrap();
        db.ensure_schema().unwrap();

        assert_eq!(db.table_names().unwrap(), before);
        assert_eq!(before.len(), TABLES.len());
    }

    #[test]
    fn test_ensure_schema_on_read_only_store_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let db = Database::open_read_only(file.path()).unwrap();

        let err = db.ensure_schema().unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_media_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let media = Media::new(MediaId::new(10), "Super Mario Odyssey")
            .with_media_type("Game")
            .with_review_score(10.0);

        db.insert_media(&media).unwrap();

        let found = db.get_media(MediaId::new(10)).unwrap().unwrap();
        assert_eq!(found, media);
        assert_eq!(db.count_media().unwrap(), 1);
        assert!(db.get_media(MediaId::new(11)).unwrap().is_none());
    }

    #[test]
    fn test_insert_duplicate_media_id() {
        let db = Database::open_in_memory().unwrap();
        db.insert_media(&Media::new(MediaId::new(1), "First")).unwrap();

        let err = db
            .insert_media(&Media::new(MediaId::new(1), "Second"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { media_id } if media_id == MediaId::new(1)));
        assert_eq!(db.count_media().unwrap(), 1);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let db = Database::open_in_memory().unwrap();

        let first = db.upsert_dimension_value(Dimension::Genre, "Action").unwrap();
        let second = db.upsert_dimension_value(Dimension::Genre, "Action").unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.id, second.id);
        assert_eq!(db.count_dimension_values(Dimension::Genre).unwrap(), 1);
    }

    #[test]
    fn test_upsert_and_resolve_returns_same_id() {
        let db = Database::open_in_memory().unwrap();

        let a = db.upsert_and_resolve(Dimension::Publisher, "Nintendo").unwrap();
        let b = db.upsert_and_resolve(Dimension::Publisher, "Nintendo").unwrap();
        let c = db.upsert_and_resolve(Dimension::Publisher, "Sega").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(
            db.find_dimension_value(Dimension::Publisher, "Sega").unwrap(),
            Some(c)
        );
        assert_eq!(db.count_dimension_values(Dimension::Publisher).unwrap(), 2);
    }

    #[test]
    fn test_upsert_keeps_values_exact() {
        let db = Database::open_in_memory().unwrap();

        db.upsert_and_resolve(Dimension::Genre, "RPG").unwrap();
        db.upsert_and_resolve(Dimension::Genre, " RPG").unwrap();
        db.upsert_and_resolve(Dimension::Genre, "rpg").unwrap();

        let values: Vec<String> = db
            .dimension_values(Dimension::Genre)
            .unwrap()
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        assert_eq!(values, vec!["RPG", " RPG", "rpg"]);
    }

    #[test]
    fn test_dimensions_are_independent() {
        let db = Database::open_in_memory().unwrap();

        db.upsert_and_resolve(Dimension::Creator, "Nintendo").unwrap();
        assert!(db
            .find_dimension_value(Dimension::Publisher, "Nintendo")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_link_allows_duplicate_edges() {
        let db = Database::open_in_memory().unwrap();
        let media_id = MediaId::new(5);
        db.insert_media(&Media::new(media_id, "Tetris")).unwrap();
        let genre = db.upsert_and_resolve(Dimension::Genre, "Puzzle").unwrap();

        db.link(Dimension::Genre, media_id, genre).unwrap();
        db.link(Dimension::Genre, media_id, genre).unwrap();

        assert_eq!(db.count_edges(Dimension::Genre).unwrap(), 2);
        assert_eq!(
            db.values_for_media(Dimension::Genre, media_id).unwrap(),
            vec!["Puzzle", "Puzzle"]
        );
    }

    #[test]
    fn test_link_unknown_media_is_store_error() {
        let db = Database::open_in_memory().unwrap();
        let region = db.upsert_and_resolve(Dimension::Region, "US").unwrap();

        let err = db
            .link(Dimension::Region, MediaId::new(404), region)
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert_eq!(db.count_edges(Dimension::Region).unwrap(), 0);
    }

    #[test]
    fn test_transaction_rolls_back_on_drop() {
        let db = Database::open_in_memory().unwrap();
        {
            let _tx = db.transaction().unwrap();
            db.insert_media(&Media::new(MediaId::new(1), "Gone")).unwrap();
        }
        assert_eq!(db.count_media().unwrap(), 0);
    }

    #[test]
    fn test_clear_media_keeps_lookup_values() {
        let db = Database::open_in_memory().unwrap();
        let media_id = MediaId::new(1);
        db.insert_media(&Media::new(media_id, "Portal")).unwrap();
        let genre = db.upsert_and_resolve(Dimension::Genre, "Puzzle").unwrap();
        db.link(Dimension::Genre, media_id, genre).unwrap();

        db.clear_media().unwrap();

        assert_eq!(db.count_media().unwrap(), 0);
        assert_eq!(db.count_edges(Dimension::Genre).unwrap(), 0);
        assert_eq!(db.count_dimension_values(Dimension::Genre).unwrap(), 1);
    }
}
