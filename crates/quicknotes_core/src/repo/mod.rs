//! Persistence layer for note libraries.
//!
//! # Responsibility
//! - Define the document-style load/save contract consumed by services.
//! - Isolate SQLite details from note and tag orchestration.
//!
//! # Invariants
//! - Services never touch SQL directly; they only see `LibraryStore`.
//! - Store failures are returned as `StoreError`; callers decide to swallow.

pub mod library_store;
pub mod sqlite_store;
