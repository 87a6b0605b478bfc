//! Note collection ownership.
//!
//! # Responsibility
//! - Own the in-memory note list and the single-slot undo buffer.
//! - Validate titles, search, and persist the full collection after mutations.
//!
//! # Invariants
//! - Titles are trimmed, non-empty and unique under `normalize_name`.
//! - The undo buffer holds at most one note; a later delete overwrites it.
//! - Every mutation is followed by one `save_notes`; failures are logged and
//!   swallowed.

use crate::model::note::{Note, NoteId};
use crate::model::tag::normalize_name;
use crate::repo::library_store::LibraryStore;
use log::{debug, error, info};
use std::collections::HashSet;
use std::rc::Rc;

/// Which note fields a search query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchScope {
    pub by_title: bool,
    pub by_content: bool,
    pub by_tag: bool,
}

impl SearchScope {
    pub const ALL: SearchScope = SearchScope {
        by_title: true,
        by_content: true,
        by_tag: true,
    };
}

/// In-memory note library backed by a `LibraryStore`.
pub struct NoteStore {
    notes: Vec<Note>,
    recently_deleted: Option<Note>,
    store: Rc<dyn LibraryStore>,
}

impl NoteStore {
    /// Loads the note document; a failed load starts from an empty library.
    pub fn load(store: Rc<dyn LibraryStore>) -> Self {
        let notes = match store.load_notes() {
            Ok(notes) => notes,
            Err(err) => {
                error!("event=notes_load module=notes status=error error={err}");
                Vec::new()
            }
        };
        info!(
            "event=notes_load module=notes status=ok count={}",
            notes.len()
        );
        Self {
            notes,
            recently_deleted: None,
            store,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id() == id)
    }

    pub fn get_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id() == id)
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn notes_mut(&mut self) -> &mut [Note] {
        &mut self.notes
    }

    /// Returns whether `title` is usable, ignoring the note `except`.
    pub fn title_is_available(&self, title: &str, except: Option<NoteId>) -> bool {
        let key = normalize_name(title);
        !key.is_empty()
            && !self
                .notes
                .iter()
                .any(|note| Some(note.id()) != except && normalize_name(&note.title) == key)
    }

    /// Trims and validates a new note before the add policy runs.
    ///
    /// Returns `None` when the title is empty or already used.
    pub(crate) fn admit(&self, mut note: Note) -> Option<Note> {
        note.title = note.title.trim().to_string();
        if note.title.is_empty() {
            debug!("event=note_add module=notes status=skip reason=empty_title");
            return None;
        }
        if !self.title_is_available(&note.title, None) || self.contains(note.id()) {
            debug!("event=note_add module=notes status=skip reason=duplicate");
            return None;
        }
        note.touch();
        Some(note)
    }

    /// Appends an admitted note and persists.
    pub(crate) fn insert(&mut self, note: Note) -> NoteId {
        let id = note.id();
        self.notes.push(note);
        info!(
            "event=note_add module=notes status=ok count={}",
            self.notes.len()
        );
        self.persist();
        id
    }

    /// Removes a note into the undo buffer. Returns `false` for unknown ids.
    pub fn delete(&mut self, id: NoteId) -> bool {
        let Some(index) = self.notes.iter().position(|note| note.id() == id) else {
            return false;
        };
        let removed = self.notes.remove(index);
        if self.recently_deleted.replace(removed).is_some() {
            debug!("event=note_delete module=notes status=ok undo_slot=overwritten");
        }
        self.persist();
        true
    }

    /// Restores the most recently deleted note.
    ///
    /// Returns `false` when the buffer is empty, or when another note took the
    /// buffered title in the meantime (the buffer is kept in that case).
    pub fn undo_delete(&mut self) -> bool {
        let Some(mut note) = self.recently_deleted.take() else {
            return false;
        };
        if !self.title_is_available(&note.title, None) {
            info!("event=note_undo module=notes status=skip reason=title_taken");
            self.recently_deleted = Some(note);
            return false;
        }
        note.touch();
        self.notes.push(note);
        self.persist();
        true
    }

    pub fn has_undo(&self) -> bool {
        self.recently_deleted.is_some()
    }

    /// Case-insensitive substring search; the result is a union in library order.
    pub fn search(&self, query: &str, scope: SearchScope) -> Vec<Note> {
        let query = query.trim();
        if query.is_empty() {
            return self.notes.clone();
        }
        let needle = query.to_lowercase();
        self.notes
            .iter()
            .filter(|note| {
                (scope.by_title && note.title.to_lowercase().contains(&needle))
                    || (scope.by_content && note.content.to_lowercase().contains(&needle))
                    || (scope.by_tag
                        && note
                            .tags
                            .iter()
                            .any(|tag| tag.name.to_lowercase().contains(&needle)))
            })
            .cloned()
            .collect()
    }

    /// Flips the pinned flag. Returns the new value, or `None` for unknown ids.
    pub fn toggle_pin(&mut self, id: NoteId) -> Option<bool> {
        let note = self.get_mut(id)?;
        note.pinned = !note.pinned;
        let pinned = note.pinned;
        self.persist();
        Some(pinned)
    }

    pub fn update_notification_settings(
        &mut self,
        id: NoteId,
        enabled: bool,
        at: Option<i64>,
    ) -> bool {
        let Some(note) = self.get_mut(id) else {
            return false;
        };
        note.notifications_enabled = enabled;
        note.notification_at = at;
        self.persist();
        true
    }

    /// Replaces title and content of a live note under the title rules.
    pub fn update_note(&mut self, id: NoteId, title: &str, content: &str) -> bool {
        let title = title.trim();
        if !self.contains(id) || !self.title_is_available(title, Some(id)) {
            debug!("event=note_update module=notes status=skip");
            return false;
        }
        if let Some(note) = self.get_mut(id) {
            note.set_title(title);
            note.set_content(content);
        }
        self.persist();
        true
    }

    /// Removes every note and clears the undo buffer.
    pub fn clear(&mut self) {
        self.notes.clear();
        self.recently_deleted = None;
        info!("event=note_delete_all module=notes status=ok");
        self.persist();
    }

    /// Notes with pinned first, then most recently modified.
    pub fn sorted(&self) -> Vec<Note> {
        let mut notes = self.notes.clone();
        notes.sort_by(|left, right| {
            right
                .pinned
                .cmp(&left.pinned)
                .then(right.last_modified.cmp(&left.last_modified))
        });
        notes
    }

    /// Distinct tag names in first-encounter order, case variants folded.
    pub fn tag_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.notes
            .iter()
            .flat_map(|note| note.tags.iter())
            .filter(|tag| !tag.name.trim().is_empty() && seen.insert(tag.key()))
            .map(|tag| tag.name.clone())
            .collect()
    }

    pub fn persist(&self) {
        if let Err(err) = self.store.save_notes(&self.notes) {
            error!(
                "event=notes_save module=notes status=error count={} error={err}",
                self.notes.len()
            );
        }
    }
}
