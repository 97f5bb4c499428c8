use serde::{Deserialize, Serialize};

/// A note as stored: tags are referenced by identifier only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub markdown: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub tag_ids: Vec<String>,
}

/// A labeled category that can be attached to many notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub label: String,
}

/// A note with its tag identifiers resolved to full tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteWithTags {
    pub id: String,
    pub title: String,
    pub markdown: String,
    pub pinned: bool,
    pub tags: Vec<Tag>,
}

/// Parameters for creating a new note. The identifier is chosen by the caller.
#[derive(Debug, Default, Clone)]
pub struct CreateNote {
    pub id: String,
    pub title: String,
    pub markdown: String,
    pub pinned: bool,
    pub tag_ids: Vec<String>,
}

/// Full replacement of a note's content and tag set.
#[derive(Debug, Default, Clone)]
pub struct UpdateNote {
    pub title: String,
    pub markdown: String,
    pub pinned: bool,
    pub tag_ids: Vec<String>,
}

/// Parameters for creating a new tag.
#[derive(Debug, Default, Clone)]
pub struct CreateTag {
    pub id: String,
    pub label: String,
}

/// Note content as edited in a form, before an identifier is assigned.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NoteData {
    pub title: String,
    pub markdown: String,
    pub pinned: bool,
    pub tags: Vec<Tag>,
}

impl NoteWithTags {
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }
}

impl From<NoteWithTags> for NoteData {
    fn from(note: NoteWithTags) -> Self {
        NoteData {
            title: note.title,
            markdown: note.markdown,
            pinned: note.pinned,
            tags: note.tags,
        }
    }
}

impl NoteData {
    pub fn tag_ids(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_wire_format() {
        let note = Note {
            id: "n1".into(),
            title: "T".into(),
            markdown: "M".into(),
            pinned: false,
            tag_ids: vec!["t1".into(), "t2".into()],
        };
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "n1",
                "title": "T",
                "markdown": "M",
                "pinned": false,
                "tagIds": ["t1", "t2"],
            })
        );
    }

    #[test]
    fn test_note_defaults_when_fields_missing() {
        let note: Note =
            serde_json::from_str(r#"{"id":"n1","title":"T","markdown":"M"}"#).unwrap();
        assert!(!note.pinned);
        assert!(note.tag_ids.is_empty());
    }
}
