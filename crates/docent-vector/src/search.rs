//! Query engine: embed a question, find the nearest indexed section.
//!
//! The engine is stateless across calls apart from the immutable loaded
//! corpus, so any number of `answer` calls may run concurrently against the
//! same instance without locking.

use std::sync::Arc;

use docent_core::error::{DocentError, Result};
use docent_core::types::{IndexedCorpus, QueryResult};

use crate::embedding::{DynEmbeddingService, EmbeddingService};
use crate::index::FlatIndex;

/// An in-memory corpus ready to serve queries: the structural index plus
/// the section records it points into.
#[derive(Debug, Clone)]
pub struct LoadedCorpus {
    pub index: FlatIndex,
    pub corpus: IndexedCorpus,
}

impl LoadedCorpus {
    pub fn new(index: FlatIndex, corpus: IndexedCorpus) -> Self {
        Self { index, corpus }
    }
}

/// Answers natural-language questions against one loaded corpus.
pub struct QueryEngine {
    loaded: Arc<LoadedCorpus>,
    embedder: Arc<dyn DynEmbeddingService>,
}

impl QueryEngine {
    /// Create an engine from a loaded corpus and a concrete gateway.
    pub fn new(loaded: Arc<LoadedCorpus>, embedder: impl EmbeddingService + 'static) -> Self {
        Self {
            loaded,
            embedder: Arc::new(embedder),
        }
    }

    /// Create an engine from a loaded corpus and a shared dynamic gateway.
    pub fn new_dyn(loaded: Arc<LoadedCorpus>, embedder: Arc<dyn DynEmbeddingService>) -> Self {
        Self { loaded, embedder }
    }

    /// Answer a question by returning the nearest indexed section.
    ///
    /// Empty or whitespace-only questions are rejected with `InvalidQuery`
    /// before any embedding call. A query against an empty corpus, or one
    /// whose best distance is non-finite, fails with `NoRelevantResult`.
    pub async fn answer(&self, question: &str) -> Result<QueryResult> {
        if question.trim().is_empty() {
            return Err(DocentError::InvalidQuery);
        }

        let query_vector = self.embedder.embed_one_boxed(question).await?;

        // The index's ascending sort order is authoritative: the single
        // nearest neighbor is all the answer needs.
        let hits = self.loaded.index.search(&query_vector, 1)?;
        let best = hits.first().ok_or(DocentError::NoRelevantResult)?;
        if !best.distance.is_finite() {
            return Err(DocentError::NoRelevantResult);
        }

        let matched_section = self
            .loaded
            .corpus
            .sections
            .get(best.position)
            .ok_or_else(|| {
                DocentError::CorpusCorrupt(format!(
                    "index position {} has no section record",
                    best.position
                ))
            })?
            .clone();

        Ok(QueryResult {
            question: question.to_string(),
            matched_section,
            distance: best.distance,
        })
    }

    /// The corpus this engine serves.
    pub fn corpus(&self) -> &IndexedCorpus {
        &self.loaded.corpus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedding;
    use crate::pipeline::BuildPipeline;

    const SAMPLE: &str = "\
1. What is X?
X is a thing.
2. What is Y?
Y is another thing.";

    async fn make_engine() -> QueryEngine {
        let (index, corpus) = BuildPipeline::new(HashEmbedding::new())
            .build(SAMPLE)
            .await
            .unwrap();
        QueryEngine::new(Arc::new(LoadedCorpus::new(index, corpus)), HashEmbedding::new())
    }

    /// Gateway that fails the test if it is ever invoked.
    #[derive(Debug, Clone)]
    struct UnreachableEmbedding;

    impl EmbeddingService for UnreachableEmbedding {
        async fn embed_one(&self, _text: &str) -> Result<Vec<f32>> {
            panic!("embedding gateway must not be called");
        }

        fn dimensions(&self) -> usize {
            HashEmbedding::DIMENSIONS
        }
    }

    #[tokio::test]
    async fn test_exact_title_query_matches_its_section() {
        let engine = make_engine().await;

        let result = engine.answer("1. What is X?").await.unwrap();
        assert_eq!(result.question, "1. What is X?");
        assert_eq!(result.matched_section.title, "1. What is X?");
        assert_eq!(result.matched_section.body, "X is a thing.");
        assert_eq!(result.distance, 0.0);
    }

    #[tokio::test]
    async fn test_empty_question_rejected_before_embedding() {
        let (index, corpus) = BuildPipeline::new(HashEmbedding::new())
            .build(SAMPLE)
            .await
            .unwrap();
        let engine = QueryEngine::new(
            Arc::new(LoadedCorpus::new(index, corpus)),
            UnreachableEmbedding,
        );

        assert!(matches!(
            engine.answer("").await,
            Err(DocentError::InvalidQuery)
        ));
        assert!(matches!(
            engine.answer("   \t\n").await,
            Err(DocentError::InvalidQuery)
        ));
    }

    #[tokio::test]
    async fn test_empty_corpus_yields_no_relevant_result() {
        // A tampered artifact set can load as an empty-but-consistent corpus;
        // the engine must fail cleanly rather than crash.
        let index: FlatIndex =
            serde_json::from_str(r#"{"dimension":384,"vectors":[]}"#).unwrap();
        let corpus = IndexedCorpus::new(384, vec![], vec![]);
        let engine = QueryEngine::new(
            Arc::new(LoadedCorpus::new(index, corpus)),
            HashEmbedding::new(),
        );

        assert!(matches!(
            engine.answer("anything").await,
            Err(DocentError::NoRelevantResult)
        ));
    }

    #[tokio::test]
    async fn test_answer_is_repeatable() {
        let engine = make_engine().await;
        let a = engine.answer("What is Y?").await.unwrap();
        let b = engine.answer("What is Y?").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_concurrent_answers_share_the_corpus() {
        let engine = Arc::new(make_engine().await);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move {
                engine.answer("1. What is X?").await.unwrap()
            }));
        }
        for handle in handles {
            let result = handle.await.unwrap();
            assert_eq!(result.matched_section.title, "1. What is X?");
        }
    }

    #[tokio::test]
    async fn test_corpus_accessor() {
        let engine = make_engine().await;
        assert_eq!(engine.corpus().len(), 2);
    }
}
