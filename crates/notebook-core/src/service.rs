use crate::{CreateNote, CreateTag, Database, Error, Note, Tag, UpdateNote};

/// The main service that contains all business logic.
/// Generic over the database implementation.
pub struct NotebookService<D: Database> {
    db: D,
}

/// Remove empty and repeated tag identifiers, keeping first occurrences.
fn normalize_tag_ids(tag_ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tag_ids
        .into_iter()
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

impl<D: Database> NotebookService<D> {
    pub fn new(db: D) -> Self {
        Self { db }
    }

    /// List all notes with their tag identifiers.
    pub async fn list_notes(&self) -> Result<Vec<Note>, Error> {
        self.db.list_notes().await
    }

    /// Create a note with a caller-chosen identifier.
    pub async fn create_note(&self, note: CreateNote) -> Result<(), Error> {
        if note.id.is_empty() || note.title.is_empty() || note.markdown.is_empty() {
            return Err(Error::validation("id, title, markdown are required"));
        }

        let note = CreateNote {
            tag_ids: normalize_tag_ids(note.tag_ids),
            ..note
        };
        tracing::debug!(id = %note.id, tags = note.tag_ids.len(), "creating note");
        self.db.create_note(note).await
    }

    /// Replace a note's title, body, pinned flag and tags.
    ///
    /// Returns false when no note has this identifier; nothing is written then.
    pub async fn update_note(&self, id: &str, update: UpdateNote) -> Result<bool, Error> {
        if update.title.is_empty() || update.markdown.is_empty() {
            return Err(Error::validation("title, markdown are required"));
        }

        let update = UpdateNote {
            tag_ids: normalize_tag_ids(update.tag_ids),
            ..update
        };
        let found = self.db.update_note(id, update).await?;
        if !found {
            tracing::debug!(id, "update of unknown note ignored");
        }
        Ok(found)
    }

    /// Delete a note and its associations. Deleting an unknown note is not an error.
    pub async fn delete_note(&self, id: &str) -> Result<bool, Error> {
        self.db.delete_note(id).await
    }

    /// List all tags.
    pub async fn list_tags(&self) -> Result<Vec<Tag>, Error> {
        self.db.list_tags().await
    }

    /// Create a tag. An existing identifier keeps its label and is not an error.
    pub async fn create_tag(&self, tag: CreateTag) -> Result<bool, Error> {
        if tag.id.is_empty() || tag.label.is_empty() {
            return Err(Error::validation("id and label required"));
        }

        let inserted = self.db.create_tag(tag).await?;
        if !inserted {
            tracing::debug!("tag already exists, create ignored");
        }
        Ok(inserted)
    }

    /// Rename a tag.
    pub async fn update_tag(&self, id: &str, label: &str) -> Result<bool, Error> {
        if label.is_empty() {
            return Err(Error::validation("label is required"));
        }
        self.db.update_tag(id, label).await
    }

    /// Delete a tag, detaching it from every note.
    pub async fn delete_tag(&self, id: &str) -> Result<bool, Error> {
        self.db.delete_tag(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records what reaches the database so validation can be checked in isolation.
    #[derive(Default)]
    struct RecordingDatabase {
        notes: Mutex<Vec<Note>>,
        tags: Mutex<Vec<Tag>>,
    }

    #[async_trait::async_trait]
    impl Database for RecordingDatabase {
        async fn list_notes(&self) -> Result<Vec<Note>, Error> {
            Ok(self.notes.lock().unwrap().clone())
        }

        async fn create_note(&self, note: CreateNote) -> Result<(), Error> {
            self.notes.lock().unwrap().push(Note {
                id: note.id,
                title: note.title,
                markdown: note.markdown,
                pinned: note.pinned,
                tag_ids: note.tag_ids,
            });
            Ok(())
        }

        async fn update_note(&self, id: &str, update: UpdateNote) -> Result<bool, Error> {
            let mut notes = self.notes.lock().unwrap();
            match notes.iter_mut().find(|n| n.id == id) {
                Some(note) => {
                    note.title = update.title;
                    note.markdown = update.markdown;
                    note.pinned = update.pinned;
                    note.tag_ids = update.tag_ids;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn delete_note(&self, id: &str) -> Result<bool, Error> {
            let mut notes = self.notes.lock().unwrap();
            let before = notes.len();
            notes.retain(|n| n.id != id);
            Ok(notes.len() != before)
        }

        async fn list_tags(&self) -> Result<Vec<Tag>, Error> {
            Ok(self.tags.lock().unwrap().clone())
        }

        async fn create_tag(&self, tag: CreateTag) -> Result<bool, Error> {
            let mut tags = self.tags.lock().unwrap();
            if tags.iter().any(|t| t.id == tag.id) {
                return Ok(false);
            }
            tags.push(Tag {
                id: tag.id,
                label: tag.label,
            });
            Ok(true)
        }

        async fn update_tag(&self, id: &str, label: &str) -> Result<bool, Error> {
            let mut tags = self.tags.lock().unwrap();
            match tags.iter_mut().find(|t| t.id == id) {
                Some(tag) => {
                    tag.label = label.to_string();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn delete_tag(&self, id: &str) -> Result<bool, Error> {
            let mut tags = self.tags.lock().unwrap();
            let before = tags.len();
            tags.retain(|t| t.id != id);
            Ok(tags.len() != before)
        }
    }

    fn service() -> NotebookService<RecordingDatabase> {
        NotebookService::new(RecordingDatabase::default())
    }

    #[tokio::test]
    async fn test_create_note_requires_fields() {
        let service = service();

        for (id, title, markdown) in [("", "T", "M"), ("n1", "", "M"), ("n1", "T", "")] {
            let err = service
                .create_note(CreateNote {
                    id: id.into(),
                    title: title.into(),
                    markdown: markdown.into(),
                    ..Default::default()
                })
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }

        assert!(service.list_notes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_note_dedups_tag_ids() {
        let service = service();

        service
            .create_note(CreateNote {
                id: "n1".into(),
                title: "T".into(),
                markdown: "M".into(),
                pinned: false,
                tag_ids: vec!["b".into(), "a".into(), "b".into(), "".into()],
            })
            .await
            .unwrap();

        let notes = service.list_notes().await.unwrap();
        assert_eq!(notes[0].tag_ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_update_note_requires_title_and_markdown() {
        let service = service();

        let err = service
            .update_note(
                "n1",
                UpdateNote {
                    title: "".into(),
                    markdown: "M".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "title, markdown are required");
    }

    #[tokio::test]
    async fn test_update_unknown_note_is_not_an_error() {
        let service = service();

        let found = service
            .update_note(
                "missing",
                UpdateNote {
                    title: "T".into(),
                    markdown: "M".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!found);
    }

    #[tokio::test]
    async fn test_create_tag_validation_and_duplicates() {
        let service = service();

        let err = service
            .create_tag(CreateTag {
                id: "t1".into(),
                label: "".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "id and label required");

        assert!(service
            .create_tag(CreateTag {
                id: "t1".into(),
                label: "work".into(),
            })
            .await
            .unwrap());
        assert!(!service
            .create_tag(CreateTag {
                id: "t1".into(),
                label: "home".into(),
            })
            .await
            .unwrap());

        let tags = service.list_tags().await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].label, "work");
    }

    #[tokio::test]
    async fn test_update_tag_requires_label() {
        let service = service();
        let err = service.update_tag("t1", "").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
