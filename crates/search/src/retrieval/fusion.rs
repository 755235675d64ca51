//! Min-max normalization and additive score fusion
//!
//! The keyword and vector scorers live on incompatible scales (word counts vs
//! cosine similarity), so each map is rescaled to `[0, 1]` on its own before
//! the two are summed. The fused score is therefore always within `[0, 2]`.

use super::{RankedEntry, ScoreMap};

/// Score assigned to every document when a map carries no signal
const TIED_SCORE: f32 = 0.5;

/// Rescale a score map to `[0, 1]`.
///
/// - empty map → empty map
/// - all scores equal (including all zero) → every id gets 0.5
/// - otherwise `(v - min) / (max - min)`
pub fn normalize(scores: &ScoreMap) -> ScoreMap {
    let Some((min, max)) = scores.min_max() else {
        return ScoreMap::default();
    };

    let range = max - min;
    ScoreMap::from_entries(
        scores
            .iter()
            .map(|(id, score)| {
                let normalized = if range > 0.0 {
                    ((score - min) / range).clamp(0.0, 1.0)
                } else {
                    TIED_SCORE
                };
                (id.to_string(), normalized)
            })
            .collect(),
    )
}

/// Unweighted sum of independently normalized keyword and vector scores
#[derive(Debug, Clone, Default)]
pub struct MinMaxFusion;

impl MinMaxFusion {
    /// Fuse both maps and keep the `limit` best documents.
    ///
    /// Ids follow the keyword map's (corpus) order; an id missing from the
    /// vector map contributes 0 from that side. Sorting is stable, so equal
    /// fused scores keep corpus order.
    pub fn fuse(&self, keyword: &ScoreMap, vector: &ScoreMap, limit: usize) -> Vec<RankedEntry> {
        let keyword = normalize(keyword);
        let vector = normalize(vector);

        let mut results: Vec<RankedEntry> = keyword
            .iter()
            .map(|(id, keyword_score)| RankedEntry {
                id: id.to_string(),
                score: keyword_score + vector.get(id).unwrap_or(0.0),
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(limit);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, f32)]) -> ScoreMap {
        ScoreMap::from_entries(
            entries
                .iter()
                .map(|(id, score)| (id.to_string(), *score))
                .collect(),
        )
    }

    #[test]
    fn test_normalize_distinct_values_span_unit_interval() {
        let normalized = normalize(&map(&[("a", 3.0), ("b", 1.0), ("c", 2.0)]));
        assert_eq!(normalized.get("a"), Some(1.0));
        assert_eq!(normalized.get("b"), Some(0.0));
        assert_eq!(normalized.get("c"), Some(0.5));
    }

    #[test]
    fn test_normalize_negative_similarities() {
        let normalized = normalize(&map(&[("a", -0.5), ("b", 0.5)]));
        assert_eq!(normalized.get("a"), Some(0.0));
        assert_eq!(normalized.get("b"), Some(1.0));
    }

    #[test]
    fn test_normalize_ties_and_empty() {
        let tied = normalize(&map(&[("a", 0.0), ("b", 0.0)]));
        assert!(tied.iter().all(|(_, s)| s == 0.5));

        let single = normalize(&map(&[("only", 7.0)]));
        assert_eq!(single.get("only"), Some(0.5));

        assert!(normalize(&ScoreMap::default()).is_empty());
    }

    #[test]
    fn test_fused_scores_stay_in_range() {
        let keyword = map(&[("a", 0.0), ("b", 4.0), ("c", 1.0)]);
        let vector = map(&[("a", 0.9), ("b", -0.3), ("c", 0.1)]);
        let ranked = MinMaxFusion.fuse(&keyword, &vector, 10);

        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|r| (0.0..=2.0).contains(&r.score)));
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_agreement_ranks_first() {
        let keyword = map(&[("policies", 2.0), ("security", 0.0), ("product", 0.0)]);
        let vector = map(&[("policies", 0.6), ("security", 0.1), ("product", 0.2)]);
        let ranked = MinMaxFusion.fuse(&keyword, &vector, 3);

        assert_eq!(ranked[0].id, "policies");
        assert_eq!(ranked[0].score, 2.0);
        assert_eq!(ranked[1].id, "product");
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let keyword = map(&[("x", 1.0), ("y", 1.0), ("z", 1.0)]);
        let vector = map(&[("x", 0.2), ("y", 0.2), ("z", 0.2)]);
        let ranked = MinMaxFusion.fuse(&keyword, &vector, 3);

        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
        assert!(ranked.iter().all(|r| r.score == 1.0));
    }

    #[test]
    fn test_limit_truncates() {
        let keyword = map(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]);
        let vector = map(&[("a", 0.0), ("b", 0.0), ("c", 0.0)]);
        let ranked = MinMaxFusion.fuse(&keyword, &vector, 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "c");

        assert!(MinMaxFusion.fuse(&keyword, &vector, 0).is_empty());
    }
}
