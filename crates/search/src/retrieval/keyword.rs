//! Lexical overlap scoring
//!
//! Score = number of unique whitespace-delimited, lowercased words shared by
//! query and document. No stemming, no punctuation stripping, no partial
//! credit for substrings.

use super::ScoreMap;
use std::collections::HashSet;
use tinyrag_common::Corpus;

/// Lowercase the text and split on whitespace into a set of unique words.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Keyword scorer with per-document word sets computed once.
pub struct KeywordScorer {
    documents: Vec<(String, HashSet<String>)>,
}

impl KeywordScorer {
    pub fn new(corpus: &Corpus) -> Self {
        Self {
            documents: corpus
                .iter()
                .map(|doc| (doc.id.clone(), tokenize(&doc.text)))
                .collect(),
        }
    }

    pub fn score(&self, query: &str) -> ScoreMap {
        let query_words = tokenize(query);
        ScoreMap::from_entries(
            self.documents
                .iter()
                .map(|(id, words)| {
                    let overlap = query_words.intersection(words).count();
                    (id.clone(), overlap as f32)
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinyrag_common::Document;

    #[test]
    fn test_tokenize_lowercases_and_dedupes() {
        let words = tokenize("The  the THE refund\tpolicy?");
        assert_eq!(words.len(), 3);
        assert!(words.contains("the"));
        assert!(words.contains("policy?"));
    }

    #[test]
    fn test_refund_query_favors_policies() {
        let scorer = KeywordScorer::new(&Corpus::builtin());
        let scores = scorer.score("What is the refund policy?");
        assert_eq!(scores.get("policies"), Some(2.0));
        assert_eq!(scores.get("security"), Some(0.0));
        assert_eq!(scores.get("product"), Some(0.0));
    }

    #[test]
    fn test_covers_every_document() {
        let scorer = KeywordScorer::new(&Corpus::builtin());
        let scores = scorer.score("zzz");
        assert_eq!(scores.len(), 3);
        assert!(scores.iter().all(|(_, s)| s == 0.0));
    }

    #[test]
    fn test_no_substring_credit_and_order_independent() {
        let corpus = Corpus::new(vec![Document::new("doc", "[1] refunds allowed")]).unwrap();
        let scorer = KeywordScorer::new(&corpus);
        assert_eq!(scorer.score("refund").get("doc"), Some(0.0));
        assert_eq!(
            scorer.score("allowed refunds").get("doc"),
            scorer.score("refunds allowed").get("doc")
        );
    }
}
