use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::Engine;
use super::section::parse_section;
use crate::model::note::MeetingNote;
use crate::vault::{Vault, VaultError};

static DAILY_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}\.md$").expect("valid daily regex"));

/// Whether a document follows the `YYYY-MM-DD.md` naming convention.
pub fn is_daily_document(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| DAILY_NAME_RE.is_match(name))
}

impl<V: Vault> Engine<'_, V> {
    /// Daily documents directly inside `folder`. A missing folder is an empty list.
    pub fn list_eligible_documents(&self, folder: &Path) -> Vec<PathBuf> {
        let entries = match self.vault.list_directory(folder) {
            Ok(entries) => entries,
            Err(VaultError::NotFound(_)) => {
                tracing::debug!("notes folder {} does not exist", folder.display());
                return Vec::new();
            }
            Err(err) => {
                tracing::warn!("cannot list notes folder: {err}");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .filter(|entry| !entry.is_dir && is_daily_document(&entry.path))
            .map(|entry| entry.path)
            .collect()
    }

    /// Meeting notes of a single document, in line order.
    pub fn parse_document(&self, doc: &Path) -> Vec<MeetingNote> {
        let text = match self.vault.read_text(doc) {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!("skipping unreadable document: {err}");
                return Vec::new();
            }
        };

        let lines: Vec<&str> = text.lines().collect();
        parse_section(doc, &lines, self.parent_heading)
    }

    /// Every meeting note in the configured folder, newest date first.
    pub fn parse_all(&self) -> Vec<MeetingNote> {
        let mut notes: Vec<MeetingNote> = self
            .list_eligible_documents(&self.folder)
            .iter()
            .flat_map(|doc| self.parse_document(doc))
            .collect();

        notes.sort_by(|a, b| b.date_key.cmp(&a.date_key));
        notes
    }

    pub fn untagged(&self) -> Vec<MeetingNote> {
        self.parse_all()
            .into_iter()
            .filter(MeetingNote::is_untagged)
            .collect()
    }

    /// The note whose span holds `line` (0-indexed) in a daily document.
    pub fn note_at_position(&self, doc: &Path, line: usize) -> Option<MeetingNote> {
        if !is_daily_document(doc) {
            return None;
        }

        self.parse_document(doc)
            .into_iter()
            .find(|note| note.contains_line(line))
    }
}
