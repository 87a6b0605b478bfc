//! Tag domain model.
//!
//! # Responsibility
//! - Define the case-insensitive `Tag` identity shared by notes, the color map
//!   and every tag operation.
//! - Provide the ordered, duplicate-free `TagSet` carried by each note.
//!
//! # Invariants
//! - Tag identity is `normalize_name(name)`: trimmed and lowercased.
//! - A `TagSet` never holds two tags with the same normalized name.
//! - The first-inserted display casing wins.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Palette reference stored for each tag (not an owned color value).
pub type ColorId = u32;

/// Normalizes a tag name or note title into its identity key.
///
/// Every identity check and lookup in core goes through this function.
pub fn normalize_name(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Returns whether two names are the same identity.
pub fn same_name(left: &str, right: &str) -> bool {
    normalize_name(left) == normalize_name(right)
}

/// Colored label attached to notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Trimmed display name, case preserved.
    pub name: String,
    /// Palette reference resolved through the color map.
    pub color: ColorId,
}

impl Tag {
    /// Creates a tag with a trimmed display name.
    pub fn new(name: impl AsRef<str>, color: ColorId) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            color,
        }
    }

    /// Identity key of this tag.
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    /// Returns whether this tag has the given name case-insensitively.
    pub fn matches(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Insertion-ordered tag set with case-insensitive uniqueness.
///
/// Equality ignores order, like any set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Tag>", into = "Vec<Tag>")]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `tag` unless an equal tag is present. Returns `true` when added.
    pub fn insert(&mut self, tag: Tag) -> bool {
        if tag.name.is_empty() || self.contains(&tag.name) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Returns whether a tag with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.matches(name))
    }

    /// Removes every tag accepted by `predicate`, returning how many were removed.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&Tag) -> bool) -> usize {
        let before = self.tags.len();
        self.tags.retain(|tag| !predicate(tag));
        before - self.tags.len()
    }

    /// Removes every tag matching `name`, returning how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        self.remove_where(|tag| tag.matches(name))
    }

    /// Replaces every tag accepted by `predicate` with `replacement`, keeping
    /// the position of the first match. Returns how many tags were removed.
    ///
    /// When `replacement` is already present elsewhere the matches are only
    /// removed.
    pub fn replace_where(
        &mut self,
        mut predicate: impl FnMut(&Tag) -> bool,
        replacement: &Tag,
    ) -> usize {
        let Some(first) = self.tags.iter().position(|tag| predicate(tag)) else {
            return 0;
        };
        let removed = self.remove_where(predicate);
        if !self.contains(&replacement.name) {
            let index = first.min(self.tags.len());
            self.tags.insert(index, replacement.clone());
        }
        removed
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Tag> {
        self.tags.iter_mut().find(|tag| tag.matches(name))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    /// Display names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl PartialEq for TagSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.tags.iter().all(|tag| other.contains(&tag.name))
    }
}

impl Eq for TagSet {}

impl From<Vec<Tag>> for TagSet {
    fn from(value: Vec<Tag>) -> Self {
        value.into_iter().collect()
    }
}

impl From<TagSet> for Vec<Tag> {
    fn from(value: TagSet) -> Self {
        value.tags
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, Tag, TagSet};

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_name("  Work "), "work");
    }

    #[test]
    fn tags_compare_by_normalized_name() {
        assert_eq!(Tag::new("Work", 1), Tag::new(" work ", 7));
        assert_ne!(Tag::new("Work", 1), Tag::new("Home", 1));
    }

    #[test]
    fn tag_set_keeps_first_casing() {
        let mut set = TagSet::new();
        assert!(set.insert(Tag::new("Work", 1)));
        assert!(!set.insert(Tag::new("work ", 2)));
        assert_eq!(set.names(), vec!["Work".to_string()]);
        assert_eq!(set.iter().next().map(|tag| tag.color), Some(1));
    }

    #[test]
    fn replace_where_keeps_position_and_skips_present_replacement() {
        let mut set: TagSet = vec![Tag::new("A", 1), Tag::new("X", 2), Tag::new("a ", 3)]
            .into_iter()
            .collect();
        assert_eq!(set.replace_where(|tag| tag.matches("a"), &Tag::new("B", 1)), 1);
        assert_eq!(set.names(), vec!["B".to_string(), "X".to_string()]);

        assert_eq!(set.replace_where(|tag| tag.matches("B"), &Tag::new("X", 9)), 1);
        assert_eq!(set.names(), vec!["X".to_string()]);
    }

    #[test]
    fn equality_ignores_order() {
        let left: TagSet = vec![Tag::new("A", 1), Tag::new("B", 2)].into_iter().collect();
        let right: TagSet = vec![Tag::new("b", 5), Tag::new("a", 6)].into_iter().collect();
        assert_eq!(left, right);
    }

    #[test]
    fn deserializing_folds_duplicates() {
        let json = r#"[{"name":"Work","color":1},{"name":"WORK","color":2},{"name":"Home","color":3}]"#;
        let set: TagSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.names(), vec!["Work".to_string(), "Home".to_string()]);
    }
}
