//! The fixed document corpus
//!
//! A corpus is loaded once at startup and never mutated afterwards. The order
//! in which documents are stored is the canonical tie-break order for every
//! scoring stage downstream.

use crate::config::CorpusConfig;
use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A source document whose text is a sequence of `[n] ...` numbered lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Ordered, immutable mapping from document id to document.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<Document>,
    positions: HashMap<String, usize>,
}

impl Corpus {
    /// Build a corpus, rejecting empty corpora and malformed or duplicate ids.
    ///
    /// Ids must be lowercase `[a-z0-9_-]+`: citation ids are lowercased before
    /// lookup, so any other id could never be cited.
    pub fn new(documents: Vec<Document>) -> Result<Self> {
        if documents.is_empty() {
            return Err(AppError::Corpus {
                message: "corpus must contain at least one document".to_string(),
            });
        }

        let mut positions = HashMap::with_capacity(documents.len());
        for (position, doc) in documents.iter().enumerate() {
            if !is_valid_id(&doc.id) {
                return Err(AppError::Corpus {
                    message: format!(
                        "document id {:?} must be non-empty lowercase [a-z0-9_-]",
                        doc.id
                    ),
                });
            }
            if positions.insert(doc.id.clone(), position).is_some() {
                return Err(AppError::Corpus {
                    message: format!("duplicate document id {:?}", doc.id),
                });
            }
        }

        Ok(Self {
            documents,
            positions,
        })
    }

    /// The three-document corpus the service ships with.
    pub fn builtin() -> Self {
        let documents = vec![
            Document::new(
                "policies",
                "[1] Refunds are allowed within 7 days of purchase if the user has watched less than 10% of the course.\n\
                 [2] Annual subscriptions renew automatically.\n\
                 [3] To avoid renewal charges, cancel at least 24 hours before the renewal date.\n\
                 [4] Support is available 24/7 via email.",
            ),
            Document::new(
                "security",
                "[1] API keys must never be logged.\n\
                 [2] PII includes email, phone, device identifiers.\n\
                 [3] Store access tokens encrypted at rest.\n\
                 [4] Rate-limit authentication endpoints to 10 req/min per IP.",
            ),
            Document::new(
                "product",
                "[1] \u{201c}FusionSuite\u{201d} collects event logs, crash reports, and user-reported bugs.\n\
                 [2] Duplicate bug detection uses semantic similarity + metadata filters.\n\
                 [3] A bug report contains title, description, repro steps, and optional screenshots.",
            ),
        ];

        let positions = documents
            .iter()
            .enumerate()
            .map(|(position, doc)| (doc.id.clone(), position))
            .collect();

        Self {
            documents,
            positions,
        }
    }

    /// Load a JSON array of `{ "id": ..., "text": ... }` documents.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| AppError::Corpus {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        let documents: Vec<Document> = serde_json::from_str(&raw)?;
        Self::new(documents)
    }

    /// Resolve the corpus named by configuration.
    pub fn load(config: &CorpusConfig) -> Result<Self> {
        match config.path.as_deref() {
            Some(path) => {
                let corpus = Self::from_json_file(path)?;
                tracing::info!(path, documents = corpus.len(), "Loaded corpus from file");
                Ok(corpus)
            }
            None => Ok(Self::builtin()),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.positions.get(id).map(|&position| &self.documents[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Documents in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|doc| doc.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_order_and_lookup() {
        let corpus = Corpus::builtin();
        let ids: Vec<&str> = corpus.ids().collect();
        assert_eq!(ids, vec!["policies", "security", "product"]);
        assert!(corpus.contains("security"));
        assert!(!corpus.contains("fusionsuite"));
        assert!(corpus
            .get("policies")
            .unwrap()
            .text
            .starts_with("[1] Refunds are allowed"));
    }

    #[test]
    fn test_builtin_lines_are_numbered() {
        let corpus = Corpus::builtin();
        let product = corpus.get("product").unwrap();
        let lines: Vec<&str> = product.text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("[3] A bug report"));
    }

    #[test]
    fn test_builtin_passes_validation() {
        let docs: Vec<Document> = Corpus::builtin().iter().cloned().collect();
        assert!(Corpus::new(docs).is_ok());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = Corpus::new(vec![Document::new("a", "[1] x"), Document::new("a", "[1] y")])
            .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_rejects_uppercase_id() {
        assert!(Corpus::new(vec![Document::new("FusionSuite", "[1] x")]).is_err());
        assert!(Corpus::new(vec![Document::new("", "[1] x")]).is_err());
        assert!(Corpus::new(vec![]).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "faq", "text": "[1] Hello."}}, {{"id": "terms", "text": "[1] Be nice."}}]"#
        )
        .unwrap();

        let corpus = Corpus::from_json_file(file.path()).unwrap();
        assert_eq!(corpus.ids().collect::<Vec<_>>(), vec!["faq", "terms"]);
    }
}
