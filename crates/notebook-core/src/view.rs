//! Derived client state: notes joined with their tags, filtered and sorted
//! for the list view.

use crate::{Note, NoteWithTags, Tag};

/// Resolve each note's tag identifiers against the tag collection.
///
/// Tags keep the order of `tags`; identifiers with no matching tag are dropped.
pub fn join_tags(notes: &[Note], tags: &[Tag]) -> Vec<NoteWithTags> {
    notes
        .iter()
        .map(|note| NoteWithTags {
            id: note.id.clone(),
            title: note.title.clone(),
            markdown: note.markdown.clone(),
            pinned: note.pinned,
            tags: tags
                .iter()
                .filter(|tag| note.tag_ids.contains(&tag.id))
                .cloned()
                .collect(),
        })
        .collect()
}

/// List view filter.
#[derive(Debug, Default, Clone)]
pub struct NoteFilter {
    /// Case-insensitive title substring. Empty matches every note.
    pub title: String,
    /// Every one of these tags must be attached to the note.
    pub tag_ids: Vec<String>,
}

impl NoteFilter {
    pub fn matches(&self, note: &NoteWithTags) -> bool {
        let title_ok = self.title.is_empty()
            || note
                .title
                .to_lowercase()
                .contains(&self.title.to_lowercase());
        title_ok && self.tag_ids.iter().all(|id| note.has_tag(id))
    }
}

/// Keep the notes matching `filter`, pinned notes first.
///
/// The sort is stable and has no secondary key, so notes keep the order of
/// `notes` within the pinned and unpinned groups.
pub fn filter_and_sort(notes: Vec<NoteWithTags>, filter: &NoteFilter) -> Vec<NoteWithTags> {
    let mut out: Vec<NoteWithTags> = notes.into_iter().filter(|n| filter.matches(n)).collect();
    out.sort_by_key(|n| !n.pinned);
    out
}
