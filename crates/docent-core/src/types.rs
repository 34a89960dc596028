use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{DocentError, Result};

// =============================================================================
// Sections
// =============================================================================

/// A single semantic unit extracted from the source document.
///
/// Created once during segmentation and immutable afterwards. A section is
/// identified only by its position in the ordered sequence the segmenter
/// produced; titles are not guaranteed unique.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// The numbered heading line that introduced the section.
    pub title: String,
    /// All following lines until the next heading, joined with single spaces
    /// and trimmed. May be empty when two headings are adjacent.
    pub body: String,
}

impl Section {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

// =============================================================================
// Indexed corpus
// =============================================================================

/// The persisted unit backing retrieval: one embedding per section, in
/// segmentation order.
///
/// `vectors[i]` is the embedding of `sections[i].title`. Read-only after the
/// build step; a changed document or model produces a new corpus identity and
/// a wholesale rebuild, never a partial update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexedCorpus {
    /// Embedding width shared by every vector.
    pub dimension: usize,
    /// One fixed-length vector per section, same order.
    pub vectors: Vec<Vec<f32>>,
    /// The segmented sections, parallel to `vectors`.
    pub sections: Vec<Section>,
}

impl IndexedCorpus {
    pub fn new(dimension: usize, vectors: Vec<Vec<f32>>, sections: Vec<Section>) -> Self {
        Self {
            dimension,
            vectors,
            sections,
        }
    }

    /// Number of indexed sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Check the structural invariants: parallel arrays and a consistent
    /// embedding width. The store runs this after loading persisted
    /// artifacts and surfaces violations as `CorpusCorrupt`.
    pub fn validate(&self) -> Result<()> {
        if self.vectors.len() != self.sections.len() {
            return Err(DocentError::CorpusCorrupt(format!(
                "vector count {} does not match section count {}",
                self.vectors.len(),
                self.sections.len()
            )));
        }
        for (i, v) in self.vectors.iter().enumerate() {
            if v.len() != self.dimension {
                return Err(DocentError::CorpusCorrupt(format!(
                    "vector {} has width {}, expected {}",
                    i,
                    v.len(),
                    self.dimension
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Query result
// =============================================================================

/// The outcome of answering one question. Constructed per request, never
/// persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// The question as received.
    pub question: String,
    /// The nearest indexed section.
    pub matched_section: Section,
    /// Squared L2 distance between the query embedding and the match.
    pub distance: f32,
}

// =============================================================================
// Corpus identity
// =============================================================================

/// Stable identity of an indexed corpus, used to derive the artifact
/// directory.
///
/// The identity folds in a content hash of the document text and the
/// embedding model tag, so a changed document or model yields a different
/// identity (and therefore a fresh build) instead of silently serving a
/// stale index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorpusId(String);

impl CorpusId {
    /// Length of the content-hash prefix kept in the identity, in hex chars.
    const HASH_PREFIX_LEN: usize = 12;

    /// Derive an identity from the document name, its full text, and the
    /// embedding model tag.
    pub fn derive(document_name: &str, document_text: &str, model_tag: &str) -> Self {
        let digest = Sha256::digest(document_text.as_bytes());
        let content_hash = &hex::encode(digest)[..Self::HASH_PREFIX_LEN];
        Self(format!(
            "{}-{}-{}",
            sanitize(document_name),
            sanitize(model_tag),
            content_hash
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorpusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reduce an arbitrary label to a filesystem-safe lowercase slug.
fn sanitize(label: &str) -> String {
    let slug: String = label
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "corpus".to_string()
    } else {
        slug
    }
}
