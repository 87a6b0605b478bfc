//! Library-wide tag operations.
//!
//! # Responsibility
//! - Derive the live tag set from the note collection.
//! - Apply set/rename/delete/merge across every note while keeping the color
//!   map consistent.
//!
//! # Invariants
//! - Every cascading operation ends with a color cleanup pass.
//! - Notes are persisted at most once per operation, and only on change.
//! - A second identical cascade call is a no-op with zero writes.

use crate::model::note::{Note, NoteId};
use crate::model::tag::{normalize_name, same_name, ColorId, Tag};
use crate::service::color_assigner::ColorAssigner;
use crate::service::note_store::NoteStore;
use log::{debug, info};

/// Borrowing view that ties notes and colors together for one operation.
pub struct TagRegistry<'a> {
    notes: &'a mut NoteStore,
    colors: &'a mut ColorAssigner,
}

impl<'a> TagRegistry<'a> {
    pub fn new(notes: &'a mut NoteStore, colors: &'a mut ColorAssigner) -> Self {
        Self { notes, colors }
    }

    /// Every tag in use, first-encounter order, each with a resolved color.
    pub fn all_tags(&mut self) -> Vec<Tag> {
        self.notes
            .tag_names()
            .into_iter()
            .map(|name| {
                let color = self.colors.color_for(&name);
                Tag::new(name, color)
            })
            .collect()
    }

    pub fn all_tag_names(&self) -> Vec<String> {
        self.notes.tag_names()
    }

    pub fn set_tag(&mut self, id: NoteId, name: &str) -> bool {
        self.set_tags(id, &[name])
    }

    /// Adds every non-blank name to the note and persists once on change.
    pub fn set_tags<S: AsRef<str>>(&mut self, id: NoteId, names: &[S]) -> bool {
        let Some(note) = self.notes.get_mut(id) else {
            debug!("event=tag_set module=tags status=skip reason=note_not_found");
            return false;
        };
        let changed = Self::tag_note(self.colors, note, names);
        if changed {
            self.notes.persist();
        }
        changed
    }

    /// Adds names to a note that is not (yet) part of the store, without
    /// persisting. Returns whether the note changed.
    pub fn tag_note<S: AsRef<str>>(
        colors: &mut ColorAssigner,
        note: &mut Note,
        names: &[S],
    ) -> bool {
        let mut changed = false;
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || note.has_tag(name) {
                continue;
            }
            let color = colors.color_for(name);
            changed |= note.add_tag(Tag::new(name, color));
        }
        changed
    }

    /// Renames `old_name` to `new_name` on every note, carrying its color.
    pub fn rename_tag(&mut self, old_name: &str, new_name: &str) -> bool {
        let from = old_name.trim();
        let to = new_name.trim();
        if from.is_empty() || to.is_empty() || same_name(from, to) {
            return false;
        }
        if !self.notes.notes().iter().any(|note| note.has_tag(from)) {
            debug!("event=tag_rename module=tags status=skip reason=unused");
            return false;
        }

        let color = self.colors.color_for(from);
        let replacement = Tag::new(to, color);
        let mut renamed = 0;
        for note in self.notes.notes_mut() {
            if note.tags.replace_where(|tag| tag.matches(from), &replacement) > 0 {
                renamed += 1;
            }
        }

        self.colors.set_color(to, color);
        self.recolor_notes(to, color);
        self.cleanup_unused_tags();
        self.notes.persist();
        info!("event=tag_rename module=tags status=ok notes={renamed}");
        true
    }

    /// Removes `name` from every note.
    pub fn delete_tag(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        let mut removed = 0;
        for note in self.notes.notes_mut() {
            removed += note.tags.remove(name);
        }

        self.cleanup_unused_tags();
        if removed > 0 {
            self.notes.persist();
            info!("event=tag_delete module=tags status=ok removed={removed}");
        }
        removed > 0
    }

    /// Replaces every source tag with `target_name` on every note.
    pub fn merge_tags<S: AsRef<str>>(&mut self, source_names: &[S], target_name: &str) -> bool {
        let target = target_name.trim();
        if source_names.is_empty() || target.is_empty() {
            return false;
        }

        let target_key = normalize_name(target);
        let mut sources: Vec<String> = Vec::new();
        for name in source_names {
            let key = normalize_name(name.as_ref());
            if !key.is_empty() && key != target_key && !sources.contains(&key) {
                sources.push(key);
            }
        }
        let is_source = |tag: &Tag| sources.contains(&tag.key());
        if !self
            .notes
            .notes()
            .iter()
            .any(|note| note.tags.iter().any(is_source))
        {
            debug!("event=tag_merge module=tags status=skip reason=unused");
            return false;
        }

        let target_tag = Tag::new(target, self.colors.color_for(target));
        let mut merged = 0;
        for note in self.notes.notes_mut() {
            if note.tags.replace_where(is_source, &target_tag) > 0 {
                merged += 1;
            }
        }

        self.cleanup_unused_tags();
        self.notes.persist();
        info!(
            "event=tag_merge module=tags status=ok sources={} notes={merged}",
            sources.len()
        );
        true
    }

    /// Drops color entries for names no note carries. Returns removed count.
    pub fn cleanup_unused_tags(&mut self) -> usize {
        let used = self.notes.tag_names();
        self.colors.cleanup_unused(used)
    }

    /// Sets a tag's color in the map and on every note carrying it.
    pub fn set_tag_color(&mut self, name: &str, color: ColorId) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        self.colors.set_color(name, color);
        if self.recolor_notes(name, color) {
            self.notes.persist();
        }
    }

    fn recolor_notes(&mut self, name: &str, color: ColorId) -> bool {
        let mut changed = false;
        for note in self.notes.notes_mut() {
            if let Some(tag) = note.tags.get_mut(name) {
                if tag.color != color {
                    tag.color = color;
                    changed = true;
                }
            }
        }
        changed
    }
}
