//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'organizer.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri del pipeline
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `library_path`: Radice della libreria organizzata per artista
//! - `mode`: `ai` (classificazione remota come ultimo fallback) o `mapping`
//! - `genre_patterns`: Tabella ordinata regex → genere
//! - `classifier`: Endpoint, modello, prompt, timeout e API key del classificatore
//! - `extensions`: Estensioni dei file da processare (default: mp3)
//! - `dry_run`: Calcola tutto senza scrivere tag né spostare file
//! - `tags_only`: Riscrive i tag sul posto, senza spostare i file
//! - `json_output`: Emette il report finale come JSON su stdout
//!
//! ## Validazione:
//! - `library_path` non vuoto
//! - `timeout_secs` > 0
//! - almeno un'estensione
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     library_path: PathBuf::from("/music"),
//!     mode: ClassificationMode::Mapping,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::genre::GenrePatternTable;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "https://api.x.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "grok-beta";

/// How the last genre fallback stage behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMode {
    /// Ask the remote classifier when every local stage fails
    Ai,
    /// Local stages only
    Mapping,
}

/// What the per-file pipeline is allowed to change on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Write tags and move into the library
    #[default]
    Organize,
    /// Write tags, leave the file where it is
    TagsOnly,
    /// Touch nothing, report what would happen
    DryRun,
}

/// Remote classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Bearer credential; never written back to disk
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Chat-completions endpoint
    pub endpoint: String,
    /// Model identifier sent with each request
    pub model: String,
    /// System prompt (None = built-in prompt)
    pub system_prompt: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Upper bound on the answer length
    pub max_tokens: u32,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            timeout_secs: 15,
            max_tokens: 5000,
        }
    }
}

/// Configuration for tag organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the artist-organized library
    pub library_path: PathBuf,
    /// Genre fallback mode
    pub mode: ClassificationMode,
    /// Ordered regex -> genre rules
    pub genre_patterns: GenrePatternTable,
    /// Remote classifier settings
    pub classifier: ClassifierSettings,
    /// File extensions to pick up, without the dot
    pub extensions: Vec<String>,
    /// Dry run - don't write tags or move files
    pub dry_run: bool,
    /// Retag in place without moving
    pub tags_only: bool,
    /// Output the run report as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library_path: PathBuf::new(),
            mode: ClassificationMode::Ai,
            genre_patterns: GenrePatternTable::default(),
            classifier: ClassifierSettings::default(),
            extensions: vec!["mp3".to_string()],
            dry_run: false,
            tags_only: false,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.library_path.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("Library path must be set"));
        }

        if self.classifier.timeout_secs == 0 {
            return Err(anyhow::anyhow!("Classifier timeout must be greater than 0"));
        }

        if self.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(anyhow::anyhow!("At least one file extension is required"));
        }

        Ok(())
    }

    /// Whether the remote classification stage takes part in the chain
    pub fn uses_classifier(&self) -> bool {
        self.mode == ClassificationMode::Ai
    }

    /// Dry run wins over tags-only
    pub fn write_mode(&self) -> WriteMode {
        if self.dry_run {
            WriteMode::DryRun
        } else if self.tags_only {
            WriteMode::TagsOnly
        } else {
            WriteMode::Organize
        }
    }

    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tag-organizer").join("config.json"))
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
