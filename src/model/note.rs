use std::fmt;
use std::path::{Path, PathBuf};

/// One sub-section under the parent heading of a daily document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingNote {
    /// Vault-relative path of the owning document.
    pub path: PathBuf,
    pub heading: String,
    /// Line of the sub-heading (0-indexed, inclusive).
    pub start_line: usize,
    /// First line past the note (exclusive).
    pub end_line: usize,
    /// Hashtags in first-seen order, de-duplicated, case preserved.
    pub tags: Vec<String>,
    pub body: String,
    /// Filename stem, e.g. `2024-01-15`.
    pub date_key: String,
}

impl MeetingNote {
    /// Identity across queries is positional: same document, same start line.
    pub fn same_position(&self, other: &MeetingNote) -> bool {
        self.start_line == other.start_line && self.path == other.path
    }

    pub fn contains_line(&self, line: usize) -> bool {
        (self.start_line..self.end_line).contains(&line)
    }

    pub fn is_untagged(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn shared_tag_count(&self, other: &MeetingNote) -> usize {
        self.tags.iter().filter(|tag| other.tags.contains(tag)).count()
    }

    /// Basename of the owning document (no extension), the WikiLink target for it.
    pub fn document_name(&self) -> String {
        document_name(&self.path)
    }
}

pub fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// An open `- [ ]` checklist line somewhere in the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub text: String,
    pub path: PathBuf,
    /// Nearest heading above the item, if any.
    pub heading: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoRelation {
    SharedTag,
    Linked,
}

impl TodoRelation {
    pub fn label(&self) -> &'static str {
        match self {
            TodoRelation::SharedTag => "shared tag",
            TodoRelation::Linked => "linked",
        }
    }
}

impl fmt::Display for TodoRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedTodoItem {
    pub todo: TodoItem,
    pub reason: TodoRelation,
    /// Note tags, in the note's casing, that matched; empty for `Linked`.
    pub matching_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagSuggestion {
    pub tag: String,
    pub score: u32,
    pub reason: String,
}
