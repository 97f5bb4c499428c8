//! Notebook core library - shared types, traits, and business logic.
//!
//! This crate contains no I/O and can be compiled for any target.

mod db;
mod error;
mod migrations;
mod note;
mod service;
mod view;

pub use db::Database;
pub use error::Error;
pub use migrations::{get_pending_migrations, Migration, MIGRATIONS, SCHEMA_VERSION};
pub use note::{CreateNote, CreateTag, Note, NoteData, NoteWithTags, Tag, UpdateNote};
pub use service::NotebookService;
pub use view::{filter_and_sort, join_tags, NoteFilter};
