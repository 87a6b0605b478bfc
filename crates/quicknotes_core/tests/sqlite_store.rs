mod common;

use common::{keyword_settings, names};
use quicknotes_core::{
    ColorMap, LibraryStore, Note, SqliteLibraryStore, Tag, TagFacade, TaggingSettings,
};
use std::rc::Rc;

#[test]
fn notes_round_trip_with_tag_order_and_flags() {
    let store = SqliteLibraryStore::open_in_memory().unwrap();
    let mut first = Note::new("First", "body").with_tags([
        Tag::new("Zeta", 4),
        Tag::new("Alpha", 1),
        Tag::new("Mid", 7),
    ]);
    first.pinned = true;
    first.notifications_enabled = true;
    first.notification_at = Some(1_700_000_000_123);
    let second = Note::new("Second", "");

    store.save_notes(&[second.clone(), first.clone()]).unwrap();
    let loaded = store.load_notes().unwrap();

    assert_eq!(loaded, vec![second, first]);
    assert_eq!(loaded[1].tag_names(), names(&["Zeta", "Alpha", "Mid"]));
    assert_eq!(loaded[1].tags.iter().map(|tag| tag.color).collect::<Vec<_>>(), vec![4, 1, 7]);
}

#[test]
fn saving_replaces_the_previous_document() {
    let store = SqliteLibraryStore::open_in_memory().unwrap();
    let kept = Note::new("Kept", "").with_tags([Tag::new("Work", 1)]);
    let dropped = Note::new("Dropped", "").with_tags([Tag::new("Home", 2)]);

    store.save_notes(&[kept.clone(), dropped]).unwrap();
    store.save_notes(&[kept.clone()]).unwrap();

    assert_eq!(store.load_notes().unwrap(), vec![kept]);
}

#[test]
fn color_map_round_trips() {
    let store = SqliteLibraryStore::open_in_memory().unwrap();
    let mut colors = ColorMap::new();
    colors.insert("work".to_string(), 3);
    colors.insert("home".to_string(), 5);

    store.save_color_map(&colors).unwrap();
    assert_eq!(store.load_color_map().unwrap(), colors);

    store.save_color_map(&ColorMap::new()).unwrap();
    assert!(store.load_color_map().unwrap().is_empty());
}

#[test]
fn facade_state_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.db");

    let (id, color) = {
        let store: Rc<dyn LibraryStore> = Rc::new(SqliteLibraryStore::open(&path).unwrap());
        let mut facade = TagFacade::builder(store)
            .settings(keyword_settings())
            .build();
        let id = facade.add_note(Note::new("Persisted", "text")).unwrap();
        facade.set_tags(id, &["Work", "Home"]);
        facade.toggle_pin(id);
        (id, facade.tag_color("work").unwrap())
    };

    let store: Rc<dyn LibraryStore> = Rc::new(SqliteLibraryStore::open(&path).unwrap());
    let facade = TagFacade::builder(store)
        .settings(TaggingSettings::default())
        .build();
    let note = facade.get(id).unwrap();
    assert_eq!(note.title, "Persisted");
    assert!(note.pinned);
    assert_eq!(note.tag_names(), names(&["Work", "Home"]));
    assert_eq!(facade.tag_color("WORK"), Some(color));
}
