//! Client data layer: a cache of notes and tags kept in step with the server.
//!
//! The server is authoritative. Notes are re-fetched after create, update
//! and pin changes; deletes and tag edits patch the cache only once the
//! server has accepted them. A failed call leaves the cache untouched.

use notebook_core::{
    filter_and_sort, join_tags, Error, Note, NoteData, NoteFilter, NoteWithTags, Tag,
};
use uuid::Uuid;

use crate::ApiClient;

pub struct Notebook {
    api: ApiClient,
    notes: Vec<Note>,
    tags: Vec<Tag>,
}

impl Notebook {
    /// Create an empty cache; call [`Notebook::refresh`] to load it.
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            notes: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Create a cache and load notes and tags from the server.
    pub async fn connect(api: ApiClient) -> Result<Self, Error> {
        let mut notebook = Self::new(api);
        notebook.refresh().await?;
        Ok(notebook)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub async fn refresh(&mut self) -> Result<(), Error> {
        self.fetch_notes().await?;
        self.fetch_tags().await
    }

    pub async fn fetch_notes(&mut self) -> Result<(), Error> {
        self.notes = self.api.list_notes().await?;
        tracing::debug!(count = self.notes.len(), "fetched notes");
        Ok(())
    }

    pub async fn fetch_tags(&mut self) -> Result<(), Error> {
        self.tags = self.api.list_tags().await?;
        tracing::debug!(count = self.tags.len(), "fetched tags");
        Ok(())
    }

    /// Notes joined with their tags, in fetch order.
    pub fn notes_with_tags(&self) -> Vec<NoteWithTags> {
        join_tags(&self.notes, &self.tags)
    }

    /// Notes for the list view: filtered, pinned first.
    pub fn visible_notes(&self, filter: &NoteFilter) -> Vec<NoteWithTags> {
        filter_and_sort(self.notes_with_tags(), filter)
    }

    pub fn note(&self, id: &str) -> Option<NoteWithTags> {
        self.notes_with_tags().into_iter().find(|n| n.id == id)
    }

    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    /// Tags whose label matches `label`, ignoring case.
    pub fn tags_labeled(&self, label: &str) -> Vec<&Tag> {
        let label = label.to_lowercase();
        self.tags
            .iter()
            .filter(|t| t.label.to_lowercase() == label)
            .collect()
    }

    /// Create a note under a fresh identifier and return that identifier.
    pub async fn create_note(&mut self, data: NoteData) -> Result<String, Error> {
        let note = Note {
            id: Uuid::new_v4().to_string(),
            tag_ids: data.tag_ids(),
            title: data.title,
            markdown: data.markdown,
            pinned: data.pinned,
        };
        self.api.create_note(&note).await?;
        self.fetch_notes().await?;
        Ok(note.id)
    }

    pub async fn update_note(&mut self, id: &str, data: NoteData) -> Result<(), Error> {
        self.api
            .update_note(id, &data.title, &data.markdown, data.pinned, &data.tag_ids())
            .await?;
        self.fetch_notes().await
    }

    /// Flip a note's pinned flag, keeping its other fields. Returns the new flag.
    pub async fn toggle_pin(&mut self, id: &str) -> Result<bool, Error> {
        let note = self
            .notes
            .iter()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::NotFound(format!("note {}", id)))?;
        let pinned = !note.pinned;

        self.api
            .update_note(id, &note.title, &note.markdown, pinned, &note.tag_ids)
            .await?;
        self.fetch_notes().await?;
        Ok(pinned)
    }

    pub async fn delete_note(&mut self, id: &str) -> Result<(), Error> {
        self.api.delete_note(id).await?;
        self.notes.retain(|n| n.id != id);
        Ok(())
    }

    /// Create a tag with a fresh identifier.
    pub async fn add_tag(&mut self, label: &str) -> Result<Tag, Error> {
        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            label: label.to_string(),
        };
        self.api.create_tag(&tag).await?;
        self.tags.push(tag.clone());
        Ok(tag)
    }

    pub async fn update_tag(&mut self, id: &str, label: &str) -> Result<(), Error> {
        self.api.update_tag(id, label).await?;
        if let Some(tag) = self.tags.iter_mut().find(|t| t.id == id) {
            tag.label = label.to_string();
        }
        Ok(())
    }

    /// Delete a tag and detach it from every cached note.
    pub async fn delete_tag(&mut self, id: &str) -> Result<(), Error> {
        self.api.delete_tag(id).await?;
        self.tags.retain(|t| t.id != id);
        for note in &mut self.notes {
            note.tag_ids.retain(|t| t != id);
        }
        Ok(())
    }
}
