use crate::{CreateNote, CreateTag, Error, Note, Tag, UpdateNote};

/// Storage abstraction for notes, tags and their associations.
///
/// Implementations must keep the association table consistent with both
/// endpoints: removing a note or a tag removes every association row that
/// references it.
#[async_trait::async_trait]
pub trait Database: Send + Sync {
    /// List all notes with their tag identifiers, in insertion order.
    async fn list_notes(&self) -> Result<Vec<Note>, Error>;

    /// Insert a note and its associations. Unknown tag identifiers are skipped.
    async fn create_note(&self, note: CreateNote) -> Result<(), Error>;

    /// Replace a note's fields and tag set. Returns false if the note doesn't exist.
    async fn update_note(&self, id: &str, update: UpdateNote) -> Result<bool, Error>;

    /// Delete a note by ID. Returns true if deleted, false if not found.
    async fn delete_note(&self, id: &str) -> Result<bool, Error>;

    /// List all tags in insertion order.
    async fn list_tags(&self) -> Result<Vec<Tag>, Error>;

    /// Insert a tag unless one with the same ID exists. Returns true if inserted.
    async fn create_tag(&self, tag: CreateTag) -> Result<bool, Error>;

    /// Rename a tag. Returns false if the tag doesn't exist.
    async fn update_tag(&self, id: &str, label: &str) -> Result<bool, Error>;

    /// Delete a tag and detach it from every note. Returns true if deleted.
    async fn delete_tag(&self, id: &str) -> Result<bool, Error>;
}
