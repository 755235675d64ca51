//! Semantic similarity scoring
//!
//! Encodes the query once and compares it against every precomputed document
//! vector in the embedding index.

use super::ScoreMap;
use crate::index::EmbeddingIndex;
use std::sync::Arc;
use tinyrag_common::{Embedder, Result};

/// Cosine similarity; 0.0 for mismatched lengths, zero-norm or non-finite input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot_product / (norm_a * norm_b);
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}

/// Vector scorer backed by the shared embedding encoder
pub struct VectorScorer {
    embedder: Arc<dyn Embedder>,
}

impl VectorScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    pub async fn score(&self, query: &str, index: &EmbeddingIndex) -> Result<ScoreMap> {
        let query_vector = self.embedder.embed(query).await?;
        Ok(ScoreMap::from_entries(
            index
                .iter()
                .map(|(id, vector)| (id.to_string(), cosine_similarity(&query_vector, vector)))
                .collect(),
        ))
    }
}
