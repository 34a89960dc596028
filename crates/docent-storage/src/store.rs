//! Persistence of indexed corpora as atomic three-artifact sets.
//!
//! Each corpus identity owns one directory under the store root holding:
//! - `index.bin`       — the flat index's own binary serialization,
//! - `embeddings.bin`  — the raw `[n, dimension]` vector array,
//! - `sections.json`   — the ordered section records.
//!
//! `save` writes all three into a temporary sibling directory and renames it
//! into place, so `exists` and `load` can never observe a partial artifact
//! set.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use docent_core::error::{DocentError, Result};
use docent_core::types::{CorpusId, IndexedCorpus, Section};
use docent_vector::index::FlatIndex;

const INDEX_FILE: &str = "index.bin";
const EMBEDDINGS_FILE: &str = "embeddings.bin";
const SECTIONS_FILE: &str = "sections.json";

/// Raw embedding array artifact: the vectors and their shared width.
#[derive(Debug, Serialize, Deserialize)]
struct RawEmbeddings {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

/// Filesystem-backed store for indexed corpora.
#[derive(Debug, Clone)]
pub struct IndexStore {
    root: PathBuf,
}

impl IndexStore {
    /// Create a store rooted at the given directory. The directory is
    /// created lazily on the first `save`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// True iff a complete artifact set is present for the identity.
    /// A partial set (any artifact missing) counts as absent.
    pub fn exists(&self, id: &CorpusId) -> bool {
        let dir = self.corpus_dir(id);
        dir.join(INDEX_FILE).is_file()
            && dir.join(EMBEDDINGS_FILE).is_file()
            && dir.join(SECTIONS_FILE).is_file()
    }

    /// Load the persisted corpus for the identity.
    ///
    /// Fails with `CorpusNotFound` if any artifact is missing or unreadable,
    /// and with `CorpusCorrupt` if the loaded artifacts disagree with each
    /// other (counts or widths).
    pub fn load(&self, id: &CorpusId) -> Result<(FlatIndex, IndexedCorpus)> {
        if !self.exists(id) {
            return Err(DocentError::CorpusNotFound(id.to_string()));
        }
        let dir = self.corpus_dir(id);

        let index: FlatIndex = bincode::deserialize(&read_artifact(&dir, INDEX_FILE, id)?)
            .map_err(|e| unreadable(INDEX_FILE, id, e))?;
        let raw: RawEmbeddings = bincode::deserialize(&read_artifact(&dir, EMBEDDINGS_FILE, id)?)
            .map_err(|e| unreadable(EMBEDDINGS_FILE, id, e))?;
        let sections: Vec<Section> =
            serde_json::from_slice(&read_artifact(&dir, SECTIONS_FILE, id)?)
                .map_err(|e| unreadable(SECTIONS_FILE, id, e))?;

        let corpus = IndexedCorpus::new(raw.dimension, raw.vectors, sections);
        corpus.validate()?;
        if index.len() != corpus.len() {
            return Err(DocentError::CorpusCorrupt(format!(
                "index holds {} vectors but corpus has {} sections",
                index.len(),
                corpus.len()
            )));
        }
        if index.dimension() != corpus.dimension {
            return Err(DocentError::CorpusCorrupt(format!(
                "index dimension {} does not match corpus dimension {}",
                index.dimension(),
                corpus.dimension
            )));
        }

        info!(corpus = %id, sections = corpus.len(), "Corpus loaded from store");
        Ok((index, corpus))
    }

    /// Persist the corpus atomically.
    ///
    /// All three artifacts land in a temporary directory which is then
    /// renamed into place; a leftover temp directory from a crashed writer
    /// is discarded first.
    pub fn save(&self, id: &CorpusId, index: &FlatIndex, corpus: &IndexedCorpus) -> Result<()> {
        corpus.validate()?;
        if index.len() != corpus.len() {
            return Err(DocentError::CorpusCorrupt(format!(
                "refusing to persist: index holds {} vectors but corpus has {} sections",
                index.len(),
                corpus.len()
            )));
        }

        std::fs::create_dir_all(&self.root)?;

        let tmp_dir = self.root.join(format!(".tmp-{}", id));
        if tmp_dir.exists() {
            std::fs::remove_dir_all(&tmp_dir)?;
        }
        std::fs::create_dir_all(&tmp_dir)?;

        let index_bytes =
            bincode::serialize(index).map_err(|e| DocentError::Serialization(e.to_string()))?;
        let embeddings_bytes = bincode::serialize(&RawEmbeddings {
            dimension: corpus.dimension,
            vectors: corpus.vectors.clone(),
        })
        .map_err(|e| DocentError::Serialization(e.to_string()))?;
        let sections_bytes = serde_json::to_vec_pretty(&corpus.sections)?;

        std::fs::write(tmp_dir.join(INDEX_FILE), index_bytes)?;
        std::fs::write(tmp_dir.join(EMBEDDINGS_FILE), embeddings_bytes)?;
        std::fs::write(tmp_dir.join(SECTIONS_FILE), sections_bytes)?;

        let final_dir = self.corpus_dir(id);
        if final_dir.exists() {
            std::fs::remove_dir_all(&final_dir)?;
        }
        std::fs::rename(&tmp_dir, &final_dir)?;

        info!(corpus = %id, sections = corpus.len(), "Corpus persisted");
        Ok(())
    }

    /// Directory holding the artifact set for the identity.
    pub fn corpus_dir(&self, id: &CorpusId) -> PathBuf {
        self.root.join(id.as_str())
    }
}

fn read_artifact(dir: &std::path::Path, file: &str, id: &CorpusId) -> Result<Vec<u8>> {
    std::fs::read(dir.join(file)).map_err(|e| unreadable(file, id, e))
}

fn unreadable(file: &str, id: &CorpusId, err: impl std::fmt::Display) -> DocentError {
    DocentError::CorpusNotFound(format!("{}: artifact {} unreadable: {}", id, file, err))
}
