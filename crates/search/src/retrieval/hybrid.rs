//! Hybrid retrieval combining keyword overlap and vector similarity
//!
//! Uses min-max fusion to combine both scorers. When the encoder cannot embed
//! the query the vector side contributes a flat map, which normalizes to the
//! same value for every document, so only keyword overlap discriminates.

use super::{
    fusion::MinMaxFusion, keyword::KeywordScorer, vector::VectorScorer, RankedEntry,
    RetrievalMode, ScoreMap,
};
use crate::index::EmbeddingIndex;
use serde::Serialize;
use std::sync::Arc;
use tinyrag_common::{Corpus, Embedder};

/// Ranked top-k documents plus the scorers that produced them
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub entries: Vec<RankedEntry>,
    pub mode: RetrievalMode,
}

/// Hybrid ranker over a fixed corpus
pub struct HybridRanker {
    keyword: KeywordScorer,
    vector: VectorScorer,
    fusion: MinMaxFusion,
    flat_vector: ScoreMap,
}

impl HybridRanker {
    /// Create a new hybrid ranker
    pub fn new(corpus: &Corpus, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            keyword: KeywordScorer::new(corpus),
            vector: VectorScorer::new(embedder),
            fusion: MinMaxFusion,
            flat_vector: ScoreMap::uniform(corpus, 0.0),
        }
    }

    /// Score every document against `query` and return the `top_k` best.
    ///
    /// Never fails: a missing index or an encoder error degrades to
    /// keyword-only ranking.
    pub async fn rank(&self, query: &str, index: Option<&EmbeddingIndex>, top_k: usize) -> Ranking {
        // Execute both scorers in parallel
        let (keyword_scores, (vector_scores, mode)) = tokio::join!(
            async { self.keyword.score(query) },
            self.vector_scores(query, index)
        );

        let entries = self.fusion.fuse(&keyword_scores, &vector_scores, top_k);

        tracing::debug!(
            mode = mode.as_str(),
            top_k,
            ranked = ?entries.iter().map(|e| (e.id.as_str(), e.score)).collect::<Vec<_>>(),
            "Ranked documents"
        );

        Ranking { entries, mode }
    }

    async fn vector_scores(&self, query: &str, index: Option<&EmbeddingIndex>) -> (ScoreMap, RetrievalMode) {
        let Some(index) = index else {
            tracing::warn!("Embedding index unavailable, ranking by keyword only");
            return (self.flat_vector.clone(), RetrievalMode::Keyword);
        };

        match self.vector.score(query, index).await {
            Ok(scores) => (scores, RetrievalMode::Hybrid),
            Err(e) => {
                tracing::warn!(error = %e, "Query embedding failed, ranking by keyword only");
                (self.flat_vector.clone(), RetrievalMode::Keyword)
            }
        }
    }
}
