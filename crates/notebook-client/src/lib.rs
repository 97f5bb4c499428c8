//! Notebook client - talks to the HTTP API and keeps a local view of notes and tags.

mod api;
mod notebook;
mod preferences;

pub use api::{ApiClient, DEFAULT_API_BASE};
pub use notebook::Notebook;
pub use preferences::Preferences;
