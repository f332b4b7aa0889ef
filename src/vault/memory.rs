use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use super::{DirEntry, Vault, VaultError};
use crate::engine::text::extract_tags;

/// In-memory vault for engine tests.
#[derive(Debug, Default)]
pub struct MemoryVault {
    docs: BTreeMap<PathBuf, String>,
    uncached: HashSet<PathBuf>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, text: &str) -> Self {
        self.docs.insert(PathBuf::from(path), text.to_string());
        self
    }

    /// Make `document_tags` report no index for this document.
    pub fn without_tag_cache(mut self, path: &str) -> Self {
        self.uncached.insert(PathBuf::from(path));
        self
    }
}

impl Vault for MemoryVault {
    fn list_directory(&self, dir: &Path) -> Result<Vec<DirEntry>, VaultError> {
        let mut children = BTreeSet::new();
        for path in self.docs.keys() {
            let Ok(rest) = path.strip_prefix(dir) else {
                continue;
            };
            let mut parts = rest.components();
            let Some(first) = parts.next() else {
                continue;
            };
            let is_dir = parts.next().is_some();
            children.insert((dir.join(first), is_dir));
        }

        if children.is_empty() {
            return Err(VaultError::NotFound(dir.to_path_buf()));
        }

        Ok(children
            .into_iter()
            .map(|(path, is_dir)| DirEntry { path, is_dir })
            .collect())
    }

    fn read_text(&self, doc: &Path) -> Result<String, VaultError> {
        self.docs
            .get(doc)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(doc.to_path_buf()))
    }

    fn document_tags(&self, doc: &Path) -> Option<Vec<String>> {
        if self.uncached.contains(doc) {
            return None;
        }
        self.docs.get(doc).map(|text| extract_tags(text))
    }

    fn list_all_documents(&self) -> Result<Vec<PathBuf>, VaultError> {
        Ok(self
            .docs
            .keys()
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("md"))
            .cloned()
            .collect())
    }
}
