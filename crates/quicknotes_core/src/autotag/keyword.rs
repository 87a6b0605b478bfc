//! Keyword dictionary tagging.
//!
//! # Responsibility
//! - Load the keyword -> tag dictionary shipped with the host application.
//! - Stage tag names for a note from the words of its title and content.
//!
//! # Invariants
//! - Dictionary keys are lowercase.
//! - Staging is deterministic: tokens are visited in first-occurrence order.
//! - Staged names never duplicate each other or a tag the note already has.

use crate::model::note::Note;
use crate::model::tag::same_name;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\W+").expect("valid non-word regex"));

/// Dictionary load failure.
#[derive(Debug)]
pub enum DictionaryError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl Display for DictionaryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "cannot read keyword dictionary: {err}"),
            Self::Parse(err) => write!(f, "invalid keyword dictionary: {err}"),
        }
    }
}

impl Error for DictionaryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for DictionaryError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for DictionaryError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Deserialize)]
struct KeywordEntry {
    keyword: Option<String>,
    tag: Option<String>,
}

/// Lowercase keyword -> tag name mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordDictionary {
    entries: HashMap<String, String>,
}

impl KeywordDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `[{"keyword": "...", "tag": "..."}, ...]`.
    ///
    /// Entries missing either field, or blank after trimming, are skipped.
    /// A repeated keyword keeps its last tag.
    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        let raw: Vec<KeywordEntry> = serde_json::from_str(json)?;
        let total = raw.len();
        let dictionary: Self = raw
            .into_iter()
            .filter_map(|entry| Some((entry.keyword?, entry.tag?)))
            .collect();
        if dictionary.len() < total {
            debug!(
                "event=dictionary_load module=autotag status=ok skipped={}",
                total - dictionary.len()
            );
        }
        Ok(dictionary)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Loads a dictionary, degrading to an empty one on failure.
    pub fn from_path_or_empty(path: impl AsRef<Path>) -> Self {
        match Self::from_path(path) {
            Ok(dictionary) => dictionary,
            Err(err) => {
                warn!("event=dictionary_load module=autotag status=error error={err}");
                Self::new()
            }
        }
    }

    pub fn insert(&mut self, keyword: &str, tag: &str) {
        let keyword = keyword.trim().to_lowercase();
        let tag = tag.trim();
        if keyword.is_empty() || tag.is_empty() {
            return;
        }
        self.entries.insert(keyword, tag.to_string());
    }

    pub fn tag_for(&self, word: &str) -> Option<&str> {
        self.entries.get(&word.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stages at most `limit` tag names for `note`.
    pub fn stage_tags(&self, note: &Note, limit: usize) -> Vec<String> {
        if limit == 0 || self.entries.is_empty() {
            return Vec::new();
        }

        let text = format!("{} {}", note.title, note.content);
        let mut staged: Vec<String> = Vec::new();
        for word in tokenize(&text) {
            let Some(tag) = self.entries.get(&word) else {
                continue;
            };
            if note.has_tag(tag) || staged.iter().any(|name| same_name(name, tag)) {
                continue;
            }
            staged.push(tag.clone());
            if staged.len() >= limit {
                break;
            }
        }
        staged
    }
}

impl<K, T> FromIterator<(K, T)> for KeywordDictionary
where
    K: AsRef<str>,
    T: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut dictionary = Self::new();
        for (keyword, tag) in iter {
            dictionary.insert(keyword.as_ref(), tag.as_ref());
        }
        dictionary
    }
}

/// Lowercase words of `text`, deduplicated, in first-occurrence order.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    NON_WORD_RE
        .split(&lowered)
        .filter(|word| !word.is_empty())
        .filter(|word| seen.insert(*word))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{tokenize, DictionaryError, KeywordDictionary};
    use crate::model::note::Note;
    use crate::model::tag::Tag;

    fn dictionary() -> KeywordDictionary {
        [
            ("meeting", "Work"),
            ("deadline", "Work"),
            ("milk", "Groceries"),
            ("flight", "Travel"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn tokenize_keeps_first_occurrence_order() {
        assert_eq!(
            tokenize("Milk, eggs; MILK & bread!"),
            vec!["milk", "eggs", "bread"]
        );
        assert!(tokenize("  ...  ").is_empty());
    }

    #[test]
    fn json_loader_lowercases_keys_and_skips_partial_entries() {
        let dictionary = KeywordDictionary::from_json_str(
            r#"[{"keyword":"Flight","tag":"Travel"},{"keyword":"gym"},{"tag":"Health"}]"#,
        )
        .unwrap();
        assert_eq!(dictionary.len(), 1);
        assert_eq!(dictionary.tag_for("flight"), Some("Travel"));
    }

    #[test]
    fn json_loader_rejects_non_array_documents() {
        assert!(KeywordDictionary::from_json_str(r#"{"keyword":"a"}"#).is_err());
    }

    #[test]
    fn file_loader_reads_dictionary_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.json");
        std::fs::write(&path, r#"[{"keyword":"gym","tag":"Health"}]"#).unwrap();

        let dictionary = KeywordDictionary::from_path(&path).unwrap();
        assert_eq!(dictionary.tag_for("gym"), Some("Health"));
        assert_eq!(KeywordDictionary::from_path_or_empty(&path), dictionary);
    }

    #[test]
    fn missing_or_broken_files_degrade_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            KeywordDictionary::from_path(&missing),
            Err(DictionaryError::Io(_))
        ));
        assert!(KeywordDictionary::from_path_or_empty(&missing).is_empty());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "not json").unwrap();
        assert!(matches!(
            KeywordDictionary::from_path(&broken),
            Err(DictionaryError::Parse(_))
        ));
        assert!(KeywordDictionary::from_path_or_empty(&broken).is_empty());
    }

    #[test]
    fn staging_respects_limit_order_and_existing_tags() {
        let mut note = Note::new("Flight deadline", "meeting about milk");
        note.add_tag(Tag::new("travel", 1));

        assert_eq!(dictionary().stage_tags(&note, 5), vec!["Work", "Groceries"]);
        assert_eq!(dictionary().stage_tags(&note, 1), vec!["Work"]);
        assert!(dictionary().stage_tags(&note, 0).is_empty());
    }

    #[test]
    fn staging_on_empty_dictionary_is_empty() {
        let note = Note::new("Flight", "");
        assert!(KeywordDictionary::new().stage_tags(&note, 3).is_empty());
    }
}
