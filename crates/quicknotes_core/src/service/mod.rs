//! Library services.
//!
//! # Responsibility
//! - Own the in-memory note library and the tag color map.
//! - Keep tags, colors and persisted documents consistent across operations.
//!
//! `TagFacade` is the entry point; the other services are its parts.

pub mod color_assigner;
pub mod note_store;
pub mod tag_facade;
pub mod tag_registry;
