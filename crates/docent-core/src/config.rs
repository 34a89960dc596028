use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DocentError, Result};

/// Top-level configuration for the Docent service.
///
/// Loaded from `~/.docent/config.toml` by default. Every value can be left
/// out of the file; missing sections fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocentConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

impl Default for DocentConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            document: DocumentConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl DocentConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DocentConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| DocentError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding persisted corpus artifacts.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// HTTP listen port.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.docent/data".to_string(),
            log_level: "info".to_string(),
            port: 8000,
        }
    }
}

/// Source document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Path to the extracted plain-text document to index.
    pub source_path: String,
    /// Optional explicit corpus name; defaults to the source file stem.
    pub corpus_name: Option<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            source_path: "data/input/document.txt".to_string(),
            corpus_name: None,
        }
    }
}

/// Embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Directory containing `model.onnx` and `tokenizer.json`.
    pub model_dir: String,
    /// Model tag folded into the corpus identity; a changed tag forces a
    /// fresh build.
    pub model_tag: String,
    /// Expected embedding width.
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_dir: "~/.docent/models/multi-qa-MiniLM-L6-cos-v1".to_string(),
            model_tag: "multi-qa-MiniLM-L6-cos-v1".to_string(),
            dimension: 384,
        }
    }
}
