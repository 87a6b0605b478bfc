//! SQLite-backed library store.
//!
//! # Responsibility
//! - Persist the note document and the tag color map in one SQLite database.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `save_notes` rewrites `notes` and `note_tags` in a single transaction.
//! - Note order and per-note tag order survive a save/load cycle.
//! - Read paths reject malformed rows instead of masking them.

use crate::db::{open_db, open_db_in_memory};
use crate::model::note::Note;
use crate::model::tag::{ColorId, Tag};
use crate::repo::library_store::{ColorMap, LibraryStore, StoreError, StoreResult};
use log::debug;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

/// SQLite library store owning its connection.
pub struct SqliteLibraryStore {
    conn: Connection,
}

impl SqliteLibraryStore {
    /// Opens (or creates) a database file with migrations applied.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a private in-memory database with migrations applied.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    fn load_tags(&self) -> StoreResult<HashMap<String, Vec<Tag>>> {
        let mut stmt = self.conn.prepare(
            "SELECT note_id, name, color_id
             FROM note_tags
             ORDER BY note_id ASC, position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tags: HashMap<String, Vec<Tag>> = HashMap::new();
        while let Some(row) = rows.next()? {
            let note_id: String = row.get("note_id")?;
            let name: String = row.get("name")?;
            let color: ColorId = row.get("color_id")?;
            tags.entry(note_id).or_default().push(Tag::new(name, color));
        }
        Ok(tags)
    }
}

impl LibraryStore for SqliteLibraryStore {
    fn load_notes(&self) -> StoreResult<Vec<Note>> {
        let mut tags_by_note = self.load_tags()?;
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                title,
                content,
                last_modified,
                pinned,
                notifications_enabled,
                notification_at
             FROM notes
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get("id")?;
            let id = parse_uuid(&id_text)?;
            let title: String = row.get("title")?;
            let content: String = row.get("content")?;
            let mut note = Note::with_id(id, title, content);
            note.last_modified = row.get("last_modified")?;
            note.pinned = row.get("pinned")?;
            note.notifications_enabled = row.get("notifications_enabled")?;
            note.notification_at = row.get("notification_at")?;
            if let Some(tags) = tags_by_note.remove(&id_text) {
                note = note.with_tags(tags);
            }
            notes.push(note);
        }

        debug!(
            "event=store_load module=repo status=ok document=notes count={}",
            notes.len()
        );
        Ok(notes)
    }

    fn save_notes(&self, notes: &[Note]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM note_tags;", [])?;
        tx.execute("DELETE FROM notes;", [])?;
        {
            let mut insert_note = tx.prepare(
                "INSERT INTO notes (
                    id,
                    position,
                    title,
                    content,
                    last_modified,
                    pinned,
                    notifications_enabled,
                    notification_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            )?;
            let mut insert_tag = tx.prepare(
                "INSERT INTO note_tags (note_id, position, name, color_id)
                 VALUES (?1, ?2, ?3, ?4);",
            )?;

            for (position, note) in notes.iter().enumerate() {
                let id = note.id().to_string();
                insert_note.execute(params![
                    id,
                    to_position(position)?,
                    note.title.as_str(),
                    note.content.as_str(),
                    note.last_modified,
                    note.pinned,
                    note.notifications_enabled,
                    note.notification_at,
                ])?;
                for (tag_position, tag) in note.tags.iter().enumerate() {
                    insert_tag.execute(params![
                        id,
                        to_position(tag_position)?,
                        tag.name.as_str(),
                        tag.color,
                    ])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_color_map(&self) -> StoreResult<ColorMap> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, color_id FROM tag_colors ORDER BY name ASC;")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, ColorId>(1)?))
        })?;
        let mut colors = ColorMap::new();
        for row in rows {
            let (name, color) = row?;
            colors.insert(name, color);
        }
        Ok(colors)
    }

    fn save_color_map(&self, colors: &ColorMap) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM tag_colors;", [])?;
        {
            let mut insert =
                tx.prepare("INSERT INTO tag_colors (name, color_id) VALUES (?1, ?2);")?;
            for (name, color) in colors {
                insert.execute(params![name, color])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn parse_uuid(value: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value).map_err(|err| StoreError::InvalidData(format!("note id `{value}`: {err}")))
}

fn to_position(value: usize) -> StoreResult<i64> {
    i64::try_from(value).map_err(|_| StoreError::InvalidData(format!("position overflow: {value}")))
}
