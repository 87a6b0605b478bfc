mod common;

use common::{keyword_settings, Harness};
use quicknotes_core::{MemoryLibraryStore, Note, SearchScope, Tag};

#[test]
fn add_rejects_empty_and_duplicate_titles() {
    let mut harness = Harness::new(keyword_settings());
    assert!(harness.facade.add_note(Note::new("Groceries", "")).is_some());
    assert!(harness.facade.add_note(Note::new("  groceries ", "")).is_none());
    assert!(harness.facade.add_note(Note::new("   ", "body")).is_none());
    assert_eq!(harness.facade.len(), 1);
    assert_eq!(harness.store.note_writes(), 1);
}

#[test]
fn add_trims_title_and_persists_collection() {
    let mut harness = Harness::new(keyword_settings());
    let id = harness.add("  Plan  ", "body");
    assert_eq!(harness.note(id).title, "Plan");
    let saved = harness.store.saved_notes();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id(), id);
}

#[test]
fn undo_restores_only_the_latest_delete() {
    let mut harness = Harness::new(keyword_settings());
    let x = harness.add("X", "");
    let y = harness.add("Y", "");

    assert!(harness.facade.delete_note(x));
    assert!(harness.facade.delete_note(y));
    assert!(harness.facade.undo_delete());
    assert!(!harness.facade.undo_delete());

    assert!(harness.facade.get(x).is_none());
    assert!(harness.facade.get(y).is_some());
    assert_eq!(harness.facade.len(), 1);
}

#[test]
fn undo_with_empty_buffer_is_a_no_op() {
    let mut harness = Harness::new(keyword_settings());
    harness.add("Only", "");
    let writes = harness.store.note_writes();
    assert!(!harness.facade.undo_delete());
    assert_eq!(harness.store.note_writes(), writes);
}

#[test]
fn undo_refuses_when_title_was_taken_and_keeps_buffer() {
    let mut harness = Harness::new(keyword_settings());
    let original = harness.add("Draft", "first");
    harness.facade.delete_note(original);
    harness.add("draft", "second");

    assert!(!harness.facade.undo_delete());
    assert!(harness.facade.has_undo());
    assert_eq!(harness.facade.len(), 1);
}

#[test]
fn delete_unknown_note_returns_false() {
    let mut harness = Harness::new(keyword_settings());
    assert!(!harness.facade.delete_note(Note::new("ghost", "").id()));
    assert!(!harness.facade.has_undo());
}

#[test]
fn search_is_a_union_in_library_order() {
    let mut harness = Harness::new(keyword_settings());
    let first = harness.add("Alpha", "nothing here");
    let second = harness.add("Beta", "mentions alpha");
    let third = harness.add("Gamma", "");
    harness.facade.set_tag(third, "ALPHABET");
    harness.facade.set_tag(first, "alpha");

    let ids: Vec<_> = harness
        .facade
        .search(" ALPHA ", SearchScope::ALL)
        .iter()
        .map(Note::id)
        .collect();
    assert_eq!(ids, vec![first, second, third]);

    let tag_only = SearchScope {
        by_title: false,
        by_content: false,
        by_tag: true,
    };
    let ids: Vec<_> = harness
        .facade
        .search("alpha", tag_only)
        .iter()
        .map(Note::id)
        .collect();
    assert_eq!(ids, vec![first, third]);
}

#[test]
fn empty_query_returns_every_note() {
    let mut harness = Harness::new(keyword_settings());
    harness.add("One", "");
    harness.add("Two", "");
    assert_eq!(harness.facade.search("   ", SearchScope::ALL).len(), 2);
}

#[test]
fn pin_and_notification_flags_persist() {
    let mut harness = Harness::new(keyword_settings());
    let id = harness.add("Reminder", "");

    assert_eq!(harness.facade.toggle_pin(id), Some(true));
    assert!(harness
        .facade
        .update_notification_settings(id, true, Some(1_700_000_000_000)));

    let saved = harness.store.saved_notes();
    assert!(saved[0].pinned);
    assert!(saved[0].notifications_enabled);
    assert_eq!(saved[0].notification_at, Some(1_700_000_000_000));
    assert_eq!(harness.facade.toggle_pin(id), Some(false));
}

#[test]
fn sorted_listing_puts_pinned_first() {
    let mut harness = Harness::new(keyword_settings());
    let old = harness.add("Old", "");
    let new = harness.add("New", "");
    harness.facade.toggle_pin(old);

    let ids: Vec<_> = harness.facade.notes_sorted().iter().map(Note::id).collect();
    assert_eq!(ids[0], old);
    assert_eq!(ids[1], new);
}

#[test]
fn update_note_enforces_title_rules() {
    let mut harness = Harness::new(keyword_settings());
    let first = harness.add("First", "");
    harness.add("Second", "");

    assert!(!harness.facade.update_note(first, "SECOND", "x"));
    assert!(!harness.facade.update_note(first, "  ", "x"));
    assert!(harness.facade.update_note(first, "first ", "edited"));
    assert_eq!(harness.note(first).title, "first");
    assert_eq!(harness.note(first).content, "edited");
}

#[test]
fn delete_all_clears_notes_undo_and_colors() {
    let mut harness = Harness::new(keyword_settings());
    let id = harness.add("Tagged", "");
    harness.facade.set_tag(id, "Work");
    harness.facade.delete_note(id);
    harness.add("Other", "");

    harness.facade.delete_all();

    assert!(harness.facade.is_empty());
    assert!(!harness.facade.has_undo());
    assert!(!harness.facade.undo_delete());
    assert!(harness.store.saved_color_map().is_empty());
}

#[test]
fn failed_saves_keep_memory_state() {
    let mut harness = Harness::new(keyword_settings());
    harness.store.set_failing(true);
    let id = harness.add("Offline disk", "");
    assert!(harness.facade.set_tag(id, "Work"));
    assert_eq!(harness.facade.len(), 1);
    assert_eq!(harness.tags_of(id), vec!["Work".to_string()]);
    assert!(harness.store.saved_notes().is_empty());
}

#[test]
fn construction_assigns_colors_to_loaded_tags() {
    let note = Note::new("Loaded", "").with_tags([Tag::new("Work", 2), Tag::new("Home", 3)]);
    let harness = Harness::with_store(
        keyword_settings(),
        MemoryLibraryStore::with_documents(vec![note], Default::default()),
        common::FakeAiClient::replying(""),
    );
    let colors = harness.store.saved_color_map();
    assert!(colors.contains_key("work"));
    assert!(colors.contains_key("home"));
}
