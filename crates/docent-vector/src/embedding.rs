//! Embedding gateway trait and implementations.
//!
//! - `OnnxEmbedder` loads a sentence-transformer ONNX export (e.g.
//!   multi-qa-MiniLM-L6-cos-v1) via ort and tokenizes with the HuggingFace
//!   tokenizers crate. This is the production gateway.
//! - `HashEmbedding` produces deterministic hash-based unit vectors; it
//!   backs the test suite and serves as a fallback when no model assets are
//!   installed.
//!
//! All gateway failures surface as `EmbeddingGateway` errors. Timeouts and
//! retries are the gateway's concern; the retrieval core never retries.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::{Arc, Mutex};

use ort::session::Session;
use ort::value::TensorRef;
use tokenizers::Tokenizer;
use tracing::info;

use docent_core::error::{DocentError, Result};

/// Gateway for generating text embeddings.
///
/// `embed_many` is the batched build-time entry point (one vector per
/// section title); `embed_one` serves queries. A given implementation must
/// return vectors of one fixed width, reported by `dimensions`.
pub trait EmbeddingService: Send + Sync {
    /// Generate an embedding vector for a single text.
    fn embed_one(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>>> + Send;

    /// Generate one embedding per input text, preserving order.
    fn embed_many(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>>> + Send {
        async move {
            let mut vectors = Vec::with_capacity(texts.len());
            for text in texts {
                vectors.push(self.embed_one(text).await?);
            }
            Ok(vectors)
        }
    }

    /// Width of the vectors this gateway produces.
    fn dimensions(&self) -> usize;
}

/// Object-safe version of [`EmbeddingService`] for dynamic dispatch.
///
/// Because the trait methods return `impl Future` they are not object-safe.
/// This trait uses boxed futures instead, so engines can hold an
/// `Arc<dyn DynEmbeddingService>` without generics. A blanket implementation
/// covers every `EmbeddingService`.
pub trait DynEmbeddingService: Send + Sync {
    /// Generate an embedding vector for a single text (boxed future).
    fn embed_one_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>>> + Send + 'a>>;

    /// Generate one embedding per input text, preserving order (boxed future).
    fn embed_many_boxed<'a>(
        &'a self,
        texts: &'a [String],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<Vec<f32>>>> + Send + 'a>>;

    /// Width of the vectors this gateway produces.
    fn dimensions(&self) -> usize;
}

impl<T: EmbeddingService> DynEmbeddingService for T {
    fn embed_one_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>>> + Send + 'a>> {
        Box::pin(self.embed_one(text))
    }

    fn embed_many_boxed<'a>(
        &'a self,
        texts: &'a [String],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<Vec<f32>>>> + Send + 'a>>
    {
        Box::pin(self.embed_many(texts))
    }

    fn dimensions(&self) -> usize {
        EmbeddingService::dimensions(self)
    }
}

// ---------------------------------------------------------------------------
// OnnxEmbedder - real ONNX Runtime inference
// ---------------------------------------------------------------------------

/// ONNX Runtime-backed embedding gateway using a sentence-transformer model.
///
/// Expects a model directory containing:
/// - `model.onnx` — the sentence-transformer ONNX export
/// - `tokenizer.json` — the HuggingFace fast-tokenizer file
///
/// The model should accept `input_ids`, `attention_mask`, and
/// `token_type_ids` as i64 inputs and produce token-level embeddings.
/// Masked mean pooling and L2 normalization yield one vector per input.
pub struct OnnxEmbedder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    dimensions: usize,
}

// ort::Session is Send + Sync internally (uses Arc<SharedSessionInner>).
unsafe impl Send for OnnxEmbedder {}
unsafe impl Sync for OnnxEmbedder {}

impl std::fmt::Debug for OnnxEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbedder")
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl OnnxEmbedder {
    /// Load a sentence-transformer model from the given directory.
    ///
    /// The directory must contain `model.onnx` and `tokenizer.json`.
    pub fn from_directory(model_dir: &Path) -> Result<Self> {
        Self::from_files(
            &model_dir.join("model.onnx"),
            &model_dir.join("tokenizer.json"),
        )
    }

    /// Load from explicit model and tokenizer file paths.
    pub fn from_files(model_path: &Path, tokenizer_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            return Err(DocentError::EmbeddingGateway(format!(
                "ONNX model not found at {}",
                model_path.display()
            )));
        }
        if !tokenizer_path.exists() {
            return Err(DocentError::EmbeddingGateway(format!(
                "Tokenizer not found at {}",
                tokenizer_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| DocentError::EmbeddingGateway(format!("ONNX session builder: {}", e)))?
            .with_intra_threads(1)
            .map_err(|e| DocentError::EmbeddingGateway(format!("ONNX set threads: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| DocentError::EmbeddingGateway(format!("ONNX load model: {}", e)))?;

        // Detect output dimensions from the model output type.
        // Sentence-transformer output is typically [batch, seq_len, hidden_dim].
        let dimensions = session
            .outputs()
            .first()
            .and_then(|out| out.dtype().tensor_shape())
            .and_then(|shape| shape.last().copied())
            .map(|d| if d > 0 { d as usize } else { 384 })
            .unwrap_or(384);

        let tokenizer = Tokenizer::from_file(tokenizer_path).map_err(|e| {
            DocentError::EmbeddingGateway(format!("Failed to load tokenizer: {}", e))
        })?;

        info!(
            model = %model_path.display(),
            dimensions,
            "Loaded ONNX embedding model"
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            dimensions,
        })
    }

    /// Tokenize, run inference, and mean-pool the output.
    fn embed_sync(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(DocentError::EmbeddingGateway(
                "Cannot embed empty text".to_string(),
            ));
        }

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| DocentError::EmbeddingGateway(format!("Tokenization failed: {}", e)))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding
            .get_type_ids()
            .iter()
            .map(|&t| t as i64)
            .collect();

        let seq_len = input_ids.len();

        // Create ndarray views with shape [1, seq_len] for batch size 1.
        let ids_array = ndarray::Array2::from_shape_vec((1, seq_len), input_ids)
            .map_err(|e| DocentError::EmbeddingGateway(format!("input_ids array: {}", e)))?;
        let mask_array =
            ndarray::Array2::from_shape_vec((1, seq_len), attention_mask.clone()).map_err(
                |e| DocentError::EmbeddingGateway(format!("attention_mask array: {}", e)),
            )?;
        let type_array = ndarray::Array2::from_shape_vec((1, seq_len), token_type_ids)
            .map_err(|e| DocentError::EmbeddingGateway(format!("token_type_ids array: {}", e)))?;

        let ids_ref = TensorRef::from_array_view(&ids_array)
            .map_err(|e| DocentError::EmbeddingGateway(format!("TensorRef input_ids: {}", e)))?;
        let mask_ref = TensorRef::from_array_view(&mask_array).map_err(|e| {
            DocentError::EmbeddingGateway(format!("TensorRef attention_mask: {}", e))
        })?;
        let type_ref = TensorRef::from_array_view(&type_array).map_err(|e| {
            DocentError::EmbeddingGateway(format!("TensorRef token_type_ids: {}", e))
        })?;

        // Run inference: input_ids, attention_mask, token_type_ids
        let mut session = self
            .session
            .lock()
            .map_err(|e| DocentError::EmbeddingGateway(format!("Session lock poisoned: {}", e)))?;
        let outputs = session
            .run(ort::inputs![ids_ref, mask_ref, type_ref])
            .map_err(|e| DocentError::EmbeddingGateway(format!("ONNX inference failed: {}", e)))?;

        // Extract token embeddings as flat slice: [1, seq_len, hidden_dim].
        // ort 2.0 try_extract_tensor returns (&Shape, &[f32]).
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| DocentError::EmbeddingGateway(format!("Extract embeddings: {}", e)))?;

        let shape_dims: Vec<i64> = shape.iter().copied().collect();
        if shape_dims.len() < 2 {
            return Err(DocentError::EmbeddingGateway(format!(
                "Unexpected output shape: {:?}",
                shape_dims
            )));
        }

        let hidden_dim = *shape_dims.last().unwrap() as usize;

        // Mean pooling over the sequence dimension, masked by attention_mask.
        let mut pooled = vec![0.0f32; hidden_dim];
        let mut count = 0.0f32;

        for (tok_idx, &mask_val) in attention_mask.iter().enumerate() {
            if mask_val > 0 {
                let offset = tok_idx * hidden_dim;
                for dim in 0..hidden_dim {
                    pooled[dim] += data[offset + dim];
                }
                count += 1.0;
            }
        }

        if count > 0.0 {
            for val in &mut pooled {
                *val /= count;
            }
        }

        // L2-normalize the embedding.
        let norm: f32 = pooled.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut pooled {
                *val /= norm;
            }
        }

        Ok(pooled)
    }
}

impl EmbeddingService for OnnxEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        // ONNX Runtime inference is CPU-bound; run on a blocking thread.
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let dims = self.dimensions;
        let text_owned = text.to_string();

        tokio::task::spawn_blocking(move || {
            let gateway = OnnxEmbedder {
                session,
                tokenizer,
                dimensions: dims,
            };
            gateway.embed_sync(&text_owned)
        })
        .await
        .map_err(|e| DocentError::EmbeddingGateway(format!("Embedding task panicked: {}", e)))?
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ---------------------------------------------------------------------------
// HashEmbedding - deterministic hash-based vectors
// ---------------------------------------------------------------------------

/// Embedding gateway that returns deterministic 384-dimensional unit
/// vectors derived from a hash of the input text.
///
/// Identical inputs always produce identical outputs, so index build and
/// search behavior can be exercised without a real model.
#[derive(Debug, Clone, Default)]
pub struct HashEmbedding;

impl HashEmbedding {
    pub const DIMENSIONS: usize = 384;

    pub fn new() -> Self {
        Self
    }

    fn hash_to_vector(text: &str) -> Vec<f32> {
        let mut result = Vec::with_capacity(Self::DIMENSIONS);
        for i in 0..Self::DIMENSIONS {
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            i.hash(&mut hasher);
            let h = hasher.finish();
            let val = ((h as f64) / (u64::MAX as f64)) * 2.0 - 1.0;
            result.push(val as f32);
        }

        // L2-normalize to produce unit vectors (matching OnnxEmbedder).
        let norm: f32 = result.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut result {
                *val /= norm;
            }
        }

        result
    }
}

impl EmbeddingService for HashEmbedding {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(DocentError::EmbeddingGateway(
                "Cannot embed empty text".to_string(),
            ));
        }
        Ok(Self::hash_to_vector(text))
    }

    fn dimensions(&self) -> usize {
        Self::DIMENSIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_embedding_dimension() {
        let gateway = HashEmbedding::new();
        let vec = gateway.embed_one("hello world").await.unwrap();
        assert_eq!(vec.len(), 384);
    }

    #[tokio::test]
    async fn test_hash_embedding_deterministic() {
        let gateway = HashEmbedding::new();
        let v1 = gateway.embed_one("same text").await.unwrap();
        let v2 = gateway.embed_one("same text").await.unwrap();
        assert_eq!(v1, v2);
    }

    #[tokio::test]
    async fn test_hash_embedding_different_inputs() {
        let gateway = HashEmbedding::new();
        let v1 = gateway.embed_one("text one").await.unwrap();
        let v2 = gateway.embed_one("text two").await.unwrap();
        assert_ne!(v1, v2);
    }

    #[tokio::test]
    async fn test_hash_embedding_empty_text() {
        let gateway = HashEmbedding::new();
        assert!(gateway.embed_one("").await.is_err());
    }

    #[tokio::test]
    async fn test_hash_embedding_unit_norm() {
        let gateway = HashEmbedding::new();
        let vec = gateway.embed_one("norm check").await.unwrap();
        let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_embed_many_preserves_order() {
        let gateway = HashEmbedding::new();
        let titles = vec!["1. Alpha".to_string(), "2. Beta".to_string()];
        let batch = gateway.embed_many(&titles).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], gateway.embed_one("1. Alpha").await.unwrap());
        assert_eq!(batch[1], gateway.embed_one("2. Beta").await.unwrap());
    }

    #[tokio::test]
    async fn test_embed_many_fails_on_any_empty() {
        let gateway = HashEmbedding::new();
        let titles = vec!["1. Alpha".to_string(), String::new()];
        assert!(gateway.embed_many(&titles).await.is_err());
    }

    #[tokio::test]
    async fn test_dyn_dispatch() {
        let gateway: Arc<dyn DynEmbeddingService> = Arc::new(HashEmbedding::new());
        let vec = gateway.embed_one_boxed("dyn text").await.unwrap();
        assert_eq!(vec.len(), gateway.dimensions());
    }

    #[test]
    fn test_onnx_missing_model() {
        let result = OnnxEmbedder::from_directory(Path::new("/nonexistent"));
        assert!(matches!(
            result,
            Err(DocentError::EmbeddingGateway(_))
        ));
    }
}
