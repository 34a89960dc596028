//! Corpus build pipeline.
//!
//! One-shot transformation of raw document text into a searchable corpus:
//! segment into titled sections, embed every section title through the
//! gateway, and build the flat index over the resulting vectors. Any
//! failure along the way surfaces as a `Build` error wrapping the cause.

use std::sync::Arc;

use tracing::info;

use docent_core::error::{DocentError, Result};
use docent_core::types::IndexedCorpus;

use crate::embedding::{DynEmbeddingService, EmbeddingService};
use crate::index::FlatIndex;
use crate::segment::segment;

/// Builds an indexed corpus from raw document text.
///
/// Uses dynamic dispatch (`Arc<dyn DynEmbeddingService>`) so that production
/// code can supply `OnnxEmbedder` while tests use `HashEmbedding`, and so
/// the same gateway instance can be shared with the query engine.
pub struct BuildPipeline {
    embedder: Arc<dyn DynEmbeddingService>,
}

impl BuildPipeline {
    /// Create a pipeline from a concrete embedding gateway.
    pub fn new(embedder: impl EmbeddingService + 'static) -> Self {
        Self {
            embedder: Arc::new(embedder),
        }
    }

    /// Create a pipeline from a shared dynamic embedding gateway.
    pub fn new_dyn(embedder: Arc<dyn DynEmbeddingService>) -> Self {
        Self { embedder }
    }

    /// Segment, embed, and index the given document text.
    ///
    /// Returns the structural index together with the corpus it indexes.
    /// A document with no numbered headings fails the build: persisting an
    /// unsearchable empty corpus would only defer the error to query time.
    pub async fn build(&self, raw_text: &str) -> Result<(FlatIndex, IndexedCorpus)> {
        let sections = segment(raw_text);
        if sections.is_empty() {
            return Err(DocentError::Build(
                "document yielded no sections (no numbered headings found)".to_string(),
            ));
        }

        let titles: Vec<String> = sections.iter().map(|s| s.title.clone()).collect();
        let vectors = self
            .embedder
            .embed_many_boxed(&titles)
            .await
            .map_err(|e| DocentError::Build(format!("embedding failed: {}", e)))?;

        let dimension = self.embedder.dimensions();
        let index = FlatIndex::build(vectors.clone(), dimension)
            .map_err(|e| DocentError::Build(format!("index build failed: {}", e)))?;
        let corpus = IndexedCorpus::new(dimension, vectors, sections);

        info!(
            sections = corpus.len(),
            dimension,
            "Corpus built"
        );
        Ok((index, corpus))
    }

    /// Width of the vectors the underlying gateway produces.
    pub fn dimensions(&self) -> usize {
        self.embedder.dimensions()
    }
}
