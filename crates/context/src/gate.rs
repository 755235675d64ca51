//! Context admission
//!
//! Walks the ranked top-k and stitches every document whose fused score
//! clears the threshold into a single context buffer for the model.

use tinyrag_common::Corpus;
use tinyrag_search::RankedEntry;

/// Default admission threshold on the fused score
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Documents admitted for one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdmittedContext {
    /// `"Document: <id>\n<text>\n\n"` per admitted document, in rank order
    pub buffer: String,
    pub doc_ids: Vec<String>,
}

impl AdmittedContext {
    pub fn chunks_used(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ContextGate {
    threshold: f32,
}

impl Default for ContextGate {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl ContextGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Admit documents scoring strictly above the threshold.
    pub fn admit(&self, corpus: &Corpus, ranked: &[RankedEntry]) -> AdmittedContext {
        let mut context = AdmittedContext::default();

        for entry in ranked {
            if entry.score <= self.threshold {
                tracing::debug!(doc_id = %entry.id, score = entry.score, "Below admission threshold");
                continue;
            }
            let Some(doc) = corpus.get(&entry.id) else {
                continue;
            };

            context.buffer.push_str("Document: ");
            context.buffer.push_str(&doc.id);
            context.buffer.push('\n');
            context.buffer.push_str(&doc.text);
            context.buffer.push_str("\n\n");
            context.doc_ids.push(doc.id.clone());
        }

        context
    }
}
