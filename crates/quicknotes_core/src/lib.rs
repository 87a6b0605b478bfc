//! Note/tag consistency engine for QuickNotes.
//! This crate owns the note library, the tag color map and auto-tagging; the
//! host application only renders state and forwards user intent.

pub mod autotag;
pub mod db;
pub mod host;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod settings;

pub use autotag::ai::{AiClient, AiError, DisabledAiClient};
pub use autotag::keyword::{DictionaryError, KeywordDictionary};
pub use autotag::openai::OpenAiClient;
pub use autotag::RequestId;
pub use host::{Connectivity, LogNotifier, UserNotifier};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::note::{Note, NoteId};
pub use model::tag::{ColorId, Tag, TagSet};
pub use repo::library_store::{
    ColorMap, LibraryStore, MemoryLibraryStore, StoreError, StoreResult,
};
pub use repo::sqlite_store::SqliteLibraryStore;
pub use service::color_assigner::{ColorOption, ColorPalette, PaletteError};
pub use service::note_store::SearchScope;
pub use service::tag_facade::{TagFacade, TagFacadeBuilder};
pub use settings::{SettingsError, TagSettings, TaggingSettings};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
