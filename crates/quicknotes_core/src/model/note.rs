//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record persisted by the library store.
//! - Stamp modification time on content edits.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `title` is non-empty (after trimming) once the note is in a library.
//! - `tags` holds no case-insensitive duplicates.

use crate::model::tag::{Tag, TagSet};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for every note.
pub type NoteId = Uuid;

/// Returns the current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// User note with tags, pin and reminder metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    id: NoteId,
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds.
    pub last_modified: i64,
    pub pinned: bool,
    pub notifications_enabled: bool,
    /// Unix epoch milliseconds of the scheduled reminder.
    pub notification_at: Option<i64>,
    pub tags: TagSet,
}

impl Note {
    /// Creates a note with a generated stable ID.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title, content)
    }

    /// Creates a note with a caller-provided ID.
    ///
    /// Used by storage and import paths where identity already exists.
    pub fn with_id(id: NoteId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            last_modified: now_epoch_ms(),
            pinned: false,
            notifications_enabled: false,
            notification_at: None,
            tags: TagSet::new(),
        }
    }

    /// Builder-style helper to seed tags.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        for tag in tags {
            self.tags.insert(tag);
        }
        self
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.touch();
    }

    /// Adds a tag unless an equal one exists. Returns `true` when added.
    pub fn add_tag(&mut self, tag: Tag) -> bool {
        let added = self.tags.insert(tag);
        if added {
            self.touch();
        }
        added
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains(name)
    }

    pub fn tag_names(&self) -> Vec<String> {
        self.tags.names()
    }

    /// Stamps `last_modified` with the current time.
    pub fn touch(&mut self) {
        self.last_modified = now_epoch_ms();
    }
}
