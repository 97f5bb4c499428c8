//! SQLite implementation of the notebook database trait.

use notebook_core::{
    get_pending_migrations, CreateNote, CreateTag, Database, Error, Note, Tag, UpdateNote,
    SCHEMA_VERSION,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed database implementation.
///
/// All statements of one call run under the connection lock, and writes that
/// touch a note together with its associations run in a single transaction.
pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Open a database at the given path and run any pending migrations.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let conn = Connection::open(path).map_err(Error::database)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database and run migrations.
    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory().map_err(Error::database)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, Error> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(Error::database)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.conn
            .lock()
            .map_err(|_| Error::Internal("database connection lock poisoned".into()))
    }

    /// Run any pending database migrations.
    pub fn run_migrations(&self) -> Result<(), Error> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS _notebook_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .map_err(Error::database)?;

        let current_version: i64 = conn
            .query_row(
                "SELECT value FROM _notebook_meta WHERE key = 'schema_version'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(Error::database)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        if current_version >= SCHEMA_VERSION {
            return Ok(());
        }

        for migration in get_pending_migrations(current_version) {
            tracing::info!(
                version = migration.version,
                name = migration.name,
                "applying migration"
            );
            for statement in migration.statements {
                conn.execute(statement, []).map_err(|e| {
                    Error::Database(format!("Migration {} failed: {}", migration.name, e))
                })?;
            }
        }

        conn.execute(
            "INSERT OR REPLACE INTO _notebook_meta (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )
        .map_err(Error::database)?;

        Ok(())
    }

    /// Attach tags to a note, skipping pairs that already exist and tags that don't.
    fn insert_note_tags(conn: &Connection, note_id: &str, tag_ids: &[String]) -> Result<(), Error> {
        let mut stmt = conn
            .prepare(
                "INSERT OR IGNORE INTO note_tags (note_id, tag_id)
                 SELECT ?1, id FROM tags WHERE id = ?2",
            )
            .map_err(Error::database)?;

        for tag_id in tag_ids {
            let rows = stmt
                .execute(params![note_id, tag_id])
                .map_err(Error::database)?;
            if rows == 0 {
                tracing::debug!(note_id, tag_id = %tag_id, "tag association skipped");
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Database for SqliteDatabase {
    async fn list_notes(&self) -> Result<Vec<Note>, Error> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT id, title, markdown, pinned FROM notes ORDER BY rowid")
            .map_err(Error::database)?;
        let mut notes = stmt
            .query_map([], |row| {
                Ok(Note {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    markdown: row.get(2)?,
                    pinned: row.get::<_, i64>(3)? != 0,
                    tag_ids: Vec::new(),
                })
            })
            .map_err(Error::database)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(Error::database)?;

        let mut stmt = conn
            .prepare("SELECT note_id, tag_id FROM note_tags ORDER BY rowid")
            .map_err(Error::database)?;
        let mut by_note: HashMap<String, Vec<String>> = HashMap::new();
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(Error::database)?;
        for row in rows {
            let (note_id, tag_id) = row.map_err(Error::database)?;
            by_note.entry(note_id).or_default().push(tag_id);
        }

        for note in &mut notes {
            if let Some(tag_ids) = by_note.remove(&note.id) {
                note.tag_ids = tag_ids;
            }
        }

        Ok(notes)
    }

    async fn create_note(&self, note: CreateNote) -> Result<(), Error> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(Error::database)?;

        tx.execute(
            "INSERT INTO notes (id, title, markdown, pinned) VALUES (?1, ?2, ?3, ?4)",
            params![note.id, note.title, note.markdown, note.pinned as i64],
        )
        .map_err(Error::database)?;

        Self::insert_note_tags(&tx, &note.id, &note.tag_ids)?;

        tx.commit().map_err(Error::database)
    }

    async fn update_note(&self, id: &str, update: UpdateNote) -> Result<bool, Error> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(Error::database)?;

        let rows = tx
            .execute(
                "UPDATE notes SET title = ?1, markdown = ?2, pinned = ?3 WHERE id = ?4",
                params![update.title, update.markdown, update.pinned as i64, id],
            )
            .map_err(Error::database)?;

        if rows == 0 {
            return Ok(false);
        }

        // Associations are replaced wholesale, not diffed.
        tx.execute("DELETE FROM note_tags WHERE note_id = ?1", params![id])
            .map_err(Error::database)?;
        Self::insert_note_tags(&tx, id, &update.tag_ids)?;

        tx.commit().map_err(Error::database)?;
        Ok(true)
    }

    async fn delete_note(&self, id: &str) -> Result<bool, Error> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(Error::database)?;

        tx.execute("DELETE FROM note_tags WHERE note_id = ?1", params![id])
            .map_err(Error::database)?;
        let rows = tx
            .execute("DELETE FROM notes WHERE id = ?1", params![id])
            .map_err(Error::database)?;

        tx.commit().map_err(Error::database)?;
        Ok(rows > 0)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, Error> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare("SELECT id, label FROM tags ORDER BY rowid")
            .map_err(Error::database)?;

        let tags = stmt
            .query_map([], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    label: row.get(1)?,
                })
            })
            .map_err(Error::database)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(Error::database)?;

        Ok(tags)
    }

    async fn create_tag(&self, tag: CreateTag) -> Result<bool, Error> {
        let conn = self.conn()?;

        let rows = conn
            .execute(
                "INSERT OR IGNORE INTO tags (id, label) VALUES (?1, ?2)",
                params![tag.id, tag.label],
            )
            .map_err(Error::database)?;

        Ok(rows > 0)
    }

    async fn update_tag(&self, id: &str, label: &str) -> Result<bool, Error> {
        let conn = self.conn()?;

        let rows = conn
            .execute(
                "UPDATE tags SET label = ?1 WHERE id = ?2",
                params![label, id],
            )
            .map_err(Error::database)?;

        Ok(rows > 0)
    }

    async fn delete_tag(&self, id: &str) -> Result<bool, Error> {
        let conn = self.conn()?;

        // note_tags rows go with it through ON DELETE CASCADE
        let rows = conn
            .execute("DELETE FROM tags WHERE id = ?1", params![id])
            .map_err(Error::database)?;

        Ok(rows > 0)
    }
}
