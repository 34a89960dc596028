//! Flat vector index with exhaustive squared-L2 search.
//!
//! The index is exact by construction: every query scans all stored vectors
//! at O(n·d) cost. For a single document's worth of sections this beats the
//! constant factors and false negatives of approximate tree/graph indexes.
//! The index is built once from the full vector set and read-only afterwards.

use serde::{Deserialize, Serialize};

use docent_core::error::{DocentError, Result};

/// A single hit returned from a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Position of the matching vector in insertion order.
    pub position: usize,
    /// Squared L2 distance to the query.
    pub distance: f32,
}

/// Exhaustive-scan index over fixed-width f32 vectors.
///
/// Vectors are identified by their position in the build input, matching the
/// section order produced by segmentation. Serializable as an opaque binary
/// artifact by the index store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    /// Build an index from the complete vector set.
    ///
    /// Fails with `DimensionMismatch` if `vectors` is empty or any vector's
    /// width differs from `dimension`.
    pub fn build(vectors: Vec<Vec<f32>>, dimension: usize) -> Result<Self> {
        if vectors.is_empty() {
            return Err(DocentError::DimensionMismatch {
                expected: dimension,
                actual: 0,
            });
        }
        for v in &vectors {
            if v.len() != dimension {
                return Err(DocentError::DimensionMismatch {
                    expected: dimension,
                    actual: v.len(),
                });
            }
        }
        Ok(Self { dimension, vectors })
    }

    /// Search for the k nearest stored vectors by squared L2 distance.
    ///
    /// Returns hits in ascending distance order; equal distances resolve to
    /// the lowest stored position. If `k` exceeds the stored count, all
    /// stored vectors are returned. Distance accumulation stays in f32
    /// throughout so tie-breaks are deterministic across platforms.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if k < 1 {
            return Err(DocentError::InvalidK(k));
        }
        if query.len() != self.dimension {
            return Err(DocentError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut hits: Vec<SearchHit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, stored)| SearchHit {
                position,
                distance: squared_l2(query, stored),
            })
            .collect();

        // Stable sort over the position-ordered scan keeps the
        // lowest-position hit first among equal distances.
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);

        Ok(hits)
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Embedding width every stored vector shares.
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Squared Euclidean distance, accumulated in f32.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
