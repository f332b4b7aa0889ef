mod related;
mod scanner;
pub mod section;
mod suggest;
pub mod text;
mod todos;

use std::path::PathBuf;

use crate::model::config::{AppConfig, NotesConfig};
use crate::vault::Vault;

/// Meeting-note queries over a [`Vault`].
///
/// Every query re-reads the documents it needs and builds its answer from
/// scratch; store failures degrade to empty results and a log line.
pub struct Engine<'a, V: Vault> {
    vault: &'a V,
    folder: PathBuf,
    parent_heading: &'a str,
    max_suggestions: usize,
}

impl<'a, V: Vault> Engine<'a, V> {
    pub fn new(vault: &'a V, notes: &'a NotesConfig, max_suggestions: usize) -> Self {
        Self {
            vault,
            folder: PathBuf::from(&notes.folder),
            parent_heading: &notes.parent_heading,
            max_suggestions,
        }
    }

    pub fn from_config(vault: &'a V, config: &'a AppConfig) -> Self {
        Self::new(vault, &config.notes, config.suggestions.max_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::note::TodoRelation;
    use crate::vault::FsVault;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn daily_journal_end_to_end() {
        let dir = tempdir().unwrap();
        let daily = dir.path().join("_daily");
        fs::create_dir_all(&daily).unwrap();
        fs::write(
            daily.join("2024-01-15.md"),
            "# Monday\n\n## Notes\n### Project Alpha Standup #project-alpha\n- [ ] Follow up with design team\n",
        )
        .unwrap();
        fs::write(
            daily.join("2024-01-16.md"),
            "## Notes\n### Planning #project-alpha\nscope the design work\n",
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "not a daily note #misc\n").unwrap();

        let vault = FsVault::new(dir.path().to_path_buf());
        let config = AppConfig::default();
        let engine = Engine::from_config(&vault, &config);

        let all = engine.parse_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].date_key, "2024-01-16");

        let standup = engine
            .note_at_position(Path::new("_daily/2024-01-15.md"), 4)
            .unwrap();
        assert_eq!(standup.heading, "Project Alpha Standup");
        assert_eq!(standup.tags, vec!["#project-alpha"]);

        let related = engine.related_notes(&standup);
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].heading, "Planning");

        let todos = engine.related_todos(&related[0]);
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].todo.text, "Follow up with design team");
        assert_eq!(todos[0].todo.path, Path::new("_daily/2024-01-15.md"));
        assert_eq!(
            todos[0].todo.heading.as_deref(),
            Some("Project Alpha Standup")
        );
        assert_eq!(todos[0].reason, TodoRelation::SharedTag);
        assert_eq!(todos[0].matching_tags, vec!["#project-alpha"]);

        // The standup's own checklist item is intrinsic, not related.
        assert!(engine.related_todos(&standup).is_empty());
    }

    #[test]
    fn empty_vault_degrades_to_empty_results() {
        let dir = tempdir().unwrap();
        let vault = FsVault::new(dir.path().join("missing"));
        let config = AppConfig::default();
        let engine = Engine::from_config(&vault, &config);

        assert!(engine.parse_all().is_empty());
        assert!(engine.open_todos().is_empty());
        assert!(engine.vault_tags().is_empty());
    }

    #[test]
    fn trashed_documents_stay_out_of_tasks_and_tags() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("_daily")).unwrap();
        fs::create_dir_all(dir.path().join(".trash")).unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".gitignore"), "_daily/\n").unwrap();
        fs::write(
            dir.path().join("_daily/2024-01-15.md"),
            "## Notes\n### Kickoff #project-alpha\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(".trash/old.md"),
            "#project-alpha #deleted-tag\n- [ ] stale deleted task\n",
        )
        .unwrap();

        let vault = FsVault::new(dir.path().to_path_buf());
        let config = AppConfig::default();
        let engine = Engine::from_config(&vault, &config);

        let notes = engine.parse_all();
        assert_eq!(notes.len(), 1);
        assert!(engine.open_todos().is_empty());
        assert!(engine.related_todos(&notes[0]).is_empty());
        assert_eq!(engine.vault_tags(), vec!["#project-alpha"]);
    }
}
