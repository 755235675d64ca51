//! Hybrid retrieval over the fixed corpus
//!
//! Provides:
//! - Keyword scoring (unique-word overlap)
//! - Vector scoring (cosine similarity against the embedding index)
//! - Min-max normalization and additive fusion into a ranked top-k

mod fusion;
mod hybrid;
mod keyword;
mod vector;

pub use fusion::{normalize, MinMaxFusion};
pub use hybrid::{HybridRanker, Ranking};
pub use keyword::{tokenize, KeywordScorer};
pub use vector::{cosine_similarity, VectorScorer};

use serde::{Deserialize, Serialize};
use tinyrag_common::Corpus;

/// Per-document scores, kept in corpus order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreMap {
    entries: Vec<(String, f32)>,
}

impl ScoreMap {
    pub fn from_entries(entries: Vec<(String, f32)>) -> Self {
        Self { entries }
    }

    /// The same score for every document in the corpus.
    pub fn uniform(corpus: &Corpus, score: f32) -> Self {
        Self {
            entries: corpus.ids().map(|id| (id.to_string(), score)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, score)| *score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(id, score)| (id.as_str(), *score))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Smallest and largest score, or `None` for an empty map.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut scores = self.entries.iter().map(|(_, score)| *score);
        let first = scores.next()?;
        Some(scores.fold((first, first), |(min, max), s| (min.min(s), max.max(s))))
    }
}

/// A ranked document with its fused score in `[0, 2]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub id: String,
    pub score: f32,
}

/// Which scorers contributed to a ranking
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Keyword and vector scores fused
    Hybrid,
    /// Vector scoring was unavailable; only keyword overlap discriminates
    Keyword,
}

impl RetrievalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalMode::Hybrid => "hybrid",
            RetrievalMode::Keyword => "keyword",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max() {
        let map = ScoreMap::from_entries(vec![
            ("a".to_string(), 0.4),
            ("b".to_string(), -0.2),
            ("c".to_string(), 0.9),
        ]);
        assert_eq!(map.min_max(), Some((-0.2, 0.9)));
        assert_eq!(ScoreMap::default().min_max(), None);
    }

    #[test]
    fn test_uniform_follows_corpus_order() {
        let corpus = Corpus::builtin();
        let map = ScoreMap::uniform(&corpus, 0.0);
        let ids: Vec<&str> = map.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["policies", "security", "product"]);
        assert_eq!(map.get("product"), Some(0.0));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_mode_serializes_snake_case() {
        assert_eq!(RetrievalMode::Hybrid.as_str(), "hybrid");
        assert_eq!(
            serde_json::to_string(&RetrievalMode::Keyword).unwrap(),
            "\"keyword\""
        );
    }
}
