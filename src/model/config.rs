use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub notes: NotesConfig,
    pub suggestions: SuggestionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub vault_path: String,
    pub refresh_debounce_ms: u64,
}

/// Where meeting notes live and how they are delimited.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// Vault-relative folder holding `YYYY-MM-DD.md` documents.
    pub folder: String,
    /// Heading line matched verbatim (after trimming) to open the notes section.
    pub parent_heading: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    pub max_results: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            vault_path: ".".to_string(),
            refresh_debounce_ms: 300,
        }
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            folder: "_daily".to_string(),
            parent_heading: "## Notes".to_string(),
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self { max_results: 10 }
    }
}

impl AppConfig {
    /// Load configuration with layering: embedded defaults → user config → CLI vault override.
    pub fn load(vault_override: Option<PathBuf>) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(DEFAULTS)?;

        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "daybook") {
            let config_path = proj_dirs.config_dir().join("config.toml");
            if config_path.exists() {
                let user_str = fs::read_to_string(&config_path)?;
                config = Self::from_layered(&user_str)?;
                tracing::info!("loaded user config from {}", config_path.display());
            }
        }

        config.apply_vault_override(vault_override)?;
        Ok(config)
    }

    /// CLI vault path replaces the configured one; a leading `~` expands to home.
    fn apply_vault_override(&mut self, vault_override: Option<PathBuf>) -> Result<()> {
        if let Some(vault) = vault_override {
            self.general.vault_path = vault.to_string_lossy().to_string();
        }

        if self.general.vault_path.starts_with('~') {
            let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
            self.general.vault_path = self
                .general
                .vault_path
                .replacen('~', &home.to_string_lossy(), 1);
        }

        Ok(())
    }

    /// Parse a user config, filling anything it omits from the embedded defaults.
    pub fn from_layered(user_str: &str) -> Result<Self> {
        let mut base: toml::Table = toml::from_str(DEFAULTS)?;
        let user: toml::Table = toml::from_str(user_str)?;
        merge_tables(&mut base, user);
        Ok(toml::Value::Table(base).try_into()?)
    }

    pub fn vault_path(&self) -> PathBuf {
        PathBuf::from(&self.general.vault_path)
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
