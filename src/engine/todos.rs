use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::Engine;
use super::text::{heading_title, open_todo_text, parse_heading, wikilink_targets};
use crate::model::note::{MeetingNote, RelatedTodoItem, TodoItem, TodoRelation};
use crate::vault::Vault;

/// Open checklist items of one document, each under the last heading seen.
pub fn scan_todos(path: &Path, text: &str) -> Vec<TodoItem> {
    let mut heading: Option<String> = None;
    let mut todos = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        if let Some(h) = parse_heading(line) {
            heading = Some(heading_title(h.text));
            continue;
        }

        if let Some(todo) = open_todo_text(line) {
            todos.push(TodoItem {
                text: todo.to_string(),
                path: path.to_path_buf(),
                heading: heading.clone(),
                line: idx,
            });
        }
    }

    todos
}

/// Whether a checklist line points at the note explicitly, by WikiLink to
/// its document or by mentioning its heading.
fn references_note(todo: &TodoItem, note: &MeetingNote) -> bool {
    let name = note.document_name();
    let suffix = format!("/{name}");
    let links_document = !name.is_empty()
        && wikilink_targets(&todo.text)
            .iter()
            .any(|target| *target == name || target.ends_with(&suffix));
    if links_document {
        return true;
    }

    let heading = note.heading.to_lowercase();
    !heading.is_empty() && todo.text.to_lowercase().contains(&heading)
}

impl<V: Vault> Engine<'_, V> {
    /// Every open checklist item in the vault, in document then line order.
    pub fn open_todos(&self) -> Vec<TodoItem> {
        let docs = match self.vault.list_all_documents() {
            Ok(docs) => docs,
            Err(err) => {
                tracing::warn!("cannot enumerate vault documents: {err}");
                return Vec::new();
            }
        };

        docs.iter()
            .filter_map(|doc| match self.vault.read_text(doc) {
                Ok(text) => Some(scan_todos(doc, &text)),
                Err(err) => {
                    tracing::debug!("skipping unreadable document: {err}");
                    None
                }
            })
            .flatten()
            .collect()
    }

    /// Open items in other documents that share a tag with the note's own
    /// tags (via the item document's tag index) or reference the note.
    pub fn related_todos(&self, note: &MeetingNote) -> Vec<RelatedTodoItem> {
        let mut doc_tags: HashMap<PathBuf, Vec<String>> = HashMap::new();

        self.open_todos()
            .into_iter()
            .filter(|todo| todo.path != note.path)
            .filter_map(|todo| {
                if !note.tags.is_empty() {
                    let tags = doc_tags.entry(todo.path.clone()).or_insert_with(|| {
                        self.vault
                            .document_tags(&todo.path)
                            .unwrap_or_default()
                            .into_iter()
                            .map(|tag| tag.to_lowercase())
                            .collect()
                    });

                    let matching: Vec<String> = note
                        .tags
                        .iter()
                        .filter(|tag| tags.contains(&tag.to_lowercase()))
                        .cloned()
                        .collect();

                    if !matching.is_empty() {
                        return Some(RelatedTodoItem {
                            todo,
                            reason: TodoRelation::SharedTag,
                            matching_tags: matching,
                        });
                    }
                }

                references_note(&todo, note).then(|| RelatedTodoItem {
                    todo,
                    reason: TodoRelation::Linked,
                    matching_tags: Vec::new(),
                })
            })
            .collect()
    }
}
