//! Library persistence contract and in-memory implementation.
//!
//! # Responsibility
//! - Define the load/save document contract for notes and the color map.
//! - Provide a process-local store for hosts without durable storage and for
//!   tests that need to observe write counts.
//!
//! # Invariants
//! - `save_notes` replaces the whole note document; there are no partial writes.
//! - Loaders return an empty document when nothing was saved yet.

use crate::db::DbError;
use crate::model::note::Note;
use crate::model::tag::ColorId;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Normalized tag name -> palette color reference.
pub type ColorMap = BTreeMap<String, ColorId>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence error for library documents.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Persisted rows cannot be decoded into domain values.
    InvalidData(String),
    /// Backend refused the operation (for example a read-only medium).
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted library data: {message}"),
            Self::Unavailable(message) => write!(f, "library store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous document store for one note library.
///
/// Called only from the owning execution context.
pub trait LibraryStore {
    fn load_notes(&self) -> StoreResult<Vec<Note>>;
    fn save_notes(&self, notes: &[Note]) -> StoreResult<()>;
    fn load_color_map(&self) -> StoreResult<ColorMap>;
    fn save_color_map(&self, colors: &ColorMap) -> StoreResult<()>;
}

/// In-memory library store.
#[derive(Debug, Default)]
pub struct MemoryLibraryStore {
    notes: RefCell<Vec<Note>>,
    colors: RefCell<ColorMap>,
    note_writes: Cell<usize>,
    color_writes: Cell<usize>,
    failing: Cell<bool>,
}

impl MemoryLibraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with documents, as if saved earlier.
    pub fn with_documents(notes: Vec<Note>, colors: ColorMap) -> Self {
        let store = Self::default();
        *store.notes.borrow_mut() = notes;
        *store.colors.borrow_mut() = colors;
        store
    }

    /// Makes every subsequent save fail with `StoreError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Number of successful `save_notes` calls.
    pub fn note_writes(&self) -> usize {
        self.note_writes.get()
    }

    /// Number of successful `save_color_map` calls.
    pub fn color_writes(&self) -> usize {
        self.color_writes.get()
    }

    pub fn saved_notes(&self) -> Vec<Note> {
        self.notes.borrow().clone()
    }

    pub fn saved_color_map(&self) -> ColorMap {
        self.colors.borrow().clone()
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.failing.get() {
            return Err(StoreError::Unavailable("memory store set to fail".to_string()));
        }
        Ok(())
    }
}

impl LibraryStore for MemoryLibraryStore {
    fn load_notes(&self) -> StoreResult<Vec<Note>> {
        Ok(self.notes.borrow().clone())
    }

    fn save_notes(&self, notes: &[Note]) -> StoreResult<()> {
        self.check_writable()?;
        *self.notes.borrow_mut() = notes.to_vec();
        self.note_writes.set(self.note_writes.get() + 1);
        Ok(())
    }

    fn load_color_map(&self) -> StoreResult<ColorMap> {
        Ok(self.colors.borrow().clone())
    }

    fn save_color_map(&self, colors: &ColorMap) -> StoreResult<()> {
        self.check_writable()?;
        *self.colors.borrow_mut() = colors.clone();
        self.color_writes.set(self.color_writes.get() + 1);
        Ok(())
    }
}
