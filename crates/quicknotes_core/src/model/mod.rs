//! Domain model for notes and tags.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own the single name-normalization rule used for identity checks.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Tag identity is case-insensitive and whitespace-insensitive.

pub mod note;
pub mod tag;
