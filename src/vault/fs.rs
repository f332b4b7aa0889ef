use ignore::WalkBuilder;
use std::io;
use std::path::{Path, PathBuf};

use super::{DirEntry, Vault, VaultError};
use crate::engine::text::extract_tags;

/// A vault rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Vault-relative form of an absolute path, if it lives inside the vault.
    pub fn relative(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(&self.root).ok().map(Path::to_path_buf)
    }

    /// Walks the vault as stored on disk: dot-entries (`.trash`, `.obsidian`,
    /// `.git`) are skipped and ignore files are never consulted.
    fn walker(&self, dir: &Path) -> WalkBuilder {
        let mut builder = WalkBuilder::new(dir);
        builder.standard_filters(false).hidden(true);
        builder
    }

    fn io_error(&self, path: &Path, source: io::Error) -> VaultError {
        if source.kind() == io::ErrorKind::NotFound {
            VaultError::NotFound(path.to_path_buf())
        } else {
            VaultError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

impl Vault for FsVault {
    fn list_directory(&self, dir: &Path) -> Result<Vec<DirEntry>, VaultError> {
        let abs = self.root.join(dir);
        if !abs.is_dir() {
            return Err(VaultError::NotFound(dir.to_path_buf()));
        }

        let mut entries: Vec<DirEntry> = self
            .walker(&abs)
            .max_depth(Some(1))
            .build()
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                if path == abs.as_path() {
                    return None;
                }

                let metadata = entry.metadata().ok()?;
                Some(DirEntry {
                    path: self.relative(path)?,
                    is_dir: metadata.is_dir(),
                })
            })
            .collect();

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn read_text(&self, doc: &Path) -> Result<String, VaultError> {
        std::fs::read_to_string(self.root.join(doc)).map_err(|err| self.io_error(doc, err))
    }

    fn document_tags(&self, doc: &Path) -> Option<Vec<String>> {
        let text = self.read_text(doc).ok()?;
        Some(extract_tags(&text))
    }

    fn list_all_documents(&self) -> Result<Vec<PathBuf>, VaultError> {
        if !self.root.is_dir() {
            return Err(VaultError::NotFound(self.root.clone()));
        }

        let mut docs: Vec<PathBuf> = self
            .walker(&self.root)
            .build()
            .flatten()
            .filter_map(|entry| {
                let metadata = entry.metadata().ok()?;
                let path = entry.path();
                if metadata.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("md")
                {
                    self.relative(path)
                } else {
                    None
                }
            })
            .collect();

        docs.sort();
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn lists_direct_children_relative_to_root() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("_daily/archive")).unwrap();
        fs::write(dir.path().join("_daily/2024-01-15.md"), "x").unwrap();
        fs::write(dir.path().join("_daily/archive/2023-01-01.md"), "x").unwrap();

        let vault = FsVault::new(dir.path().to_path_buf());
        let entries = vault.list_directory(Path::new("_daily")).unwrap();

        assert_eq!(
            entries,
            vec![
                DirEntry {
                    path: PathBuf::from("_daily/2024-01-15.md"),
                    is_dir: false
                },
                DirEntry {
                    path: PathBuf::from("_daily/archive"),
                    is_dir: true
                },
            ]
        );
    }

    #[test]
    fn missing_folder_is_not_found() {
        let dir = tempdir().unwrap();
        let vault = FsVault::new(dir.path().to_path_buf());
        assert!(matches!(
            vault.list_directory(Path::new("_daily")),
            Err(VaultError::NotFound(_))
        ));
        assert!(matches!(
            vault.read_text(Path::new("nope.md")),
            Err(VaultError::NotFound(_))
        ));
        assert_eq!(vault.document_tags(Path::new("nope.md")), None);
    }

    #[test]
    fn all_documents_are_markdown_and_sorted() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("projects")).unwrap();
        fs::write(dir.path().join("projects/alpha.md"), "#project-alpha").unwrap();
        fs::write(dir.path().join("inbox.md"), "").unwrap();
        fs::write(dir.path().join("image.png"), "").unwrap();

        let vault = FsVault::new(dir.path().to_path_buf());
        let docs = vault.list_all_documents().unwrap();

        assert_eq!(
            docs,
            vec![PathBuf::from("inbox.md"), PathBuf::from("projects/alpha.md")]
        );
        assert_eq!(
            vault.document_tags(Path::new("projects/alpha.md")),
            Some(vec!["#project-alpha".to_string()])
        );
    }

    #[test]
    fn dot_folders_and_ignore_files_do_not_hide_or_add_documents() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::create_dir_all(dir.path().join(".trash")).unwrap();
        fs::create_dir_all(dir.path().join("_daily/.obsidian")).unwrap();
        fs::write(dir.path().join(".gitignore"), "_daily/\n").unwrap();
        fs::write(dir.path().join(".ignore"), "*.md\n").unwrap();
        fs::write(dir.path().join(".trash/old.md"), "#deleted-tag\n- [ ] stale\n").unwrap();
        fs::write(dir.path().join("_daily/2024-01-15.md"), "## Notes\n").unwrap();

        let vault = FsVault::new(dir.path().to_path_buf());

        assert_eq!(
            vault.list_all_documents().unwrap(),
            vec![PathBuf::from("_daily/2024-01-15.md")]
        );
        assert_eq!(
            vault.list_directory(Path::new("_daily")).unwrap(),
            vec![DirEntry {
                path: PathBuf::from("_daily/2024-01-15.md"),
                is_dir: false
            }]
        );
    }
}
