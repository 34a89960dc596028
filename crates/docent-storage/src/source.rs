//! Document source trait and implementations.
//!
//! The retrieval core consumes extracted raw text; where that text comes
//! from is a collaborator concern. `PlainTextSource` reads a plain-text
//! file from disk, and a PDF extractor can implement the same trait without
//! touching the rest of the system.

use std::path::{Path, PathBuf};

use docent_core::error::Result;

/// Source of the raw document text to segment and index.
pub trait DocumentSource: Send + Sync {
    /// Read the full document text.
    fn read_text(&self) -> Result<String>;

    /// Short name of the document, used as the corpus identity stem.
    fn name(&self) -> &str;
}

/// Reads a plain-text document from a file on disk.
#[derive(Debug, Clone)]
pub struct PlainTextSource {
    path: PathBuf,
    name: String,
}

impl PlainTextSource {
    /// Create a source for the given file. The document name is the file
    /// stem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());
        Self { path, name }
    }

    /// Create a source with an explicit document name instead of the file
    /// stem.
    pub fn with_name(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSource for PlainTextSource {
    fn read_text(&self) -> Result<String> {
        let text = std::fs::read_to_string(&self.path)?;
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// In-memory document source for testing.
#[derive(Debug, Clone)]
pub struct StaticTextSource {
    name: String,
    text: String,
}

impl StaticTextSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl DocumentSource for StaticTextSource {
    fn read_text(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
