mod fs;
#[cfg(test)]
pub mod memory;

use std::path::{Path, PathBuf};

pub use fs::FsVault;

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("not found: {0}")]
    NotFound(PathBuf),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Host document store. Engines see only vault-relative paths.
pub trait Vault {
    /// Direct children (files and folders) of a vault-relative folder.
    fn list_directory(&self, dir: &Path) -> Result<Vec<DirEntry>, VaultError>;

    /// Current full text of a document.
    fn read_text(&self, doc: &Path) -> Result<String, VaultError>;

    /// Precomputed tags for a document; `None` when the store has no index for it.
    fn document_tags(&self, doc: &Path) -> Option<Vec<String>>;

    /// Every markdown document in the vault, in sorted path order.
    fn list_all_documents(&self) -> Result<Vec<PathBuf>, VaultError>;
}
