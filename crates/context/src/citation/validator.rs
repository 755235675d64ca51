//! Citation policy
//!
//! Reconciles parsed tags with the corpus: ids are lowercased and trimmed,
//! unknown ids are dropped, line sets merge across mentions, and a refusal
//! in the model output clears everything.

use super::parser::CitationParser;
use super::Citation;
use crate::answer::{NOT_FOUND_ANSWER, REFUSAL_MARKER};
use std::collections::BTreeSet;
use tinyrag_common::Corpus;

/// Model output after citation validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
    /// The refusal override replaced the model output
    pub refused: bool,
}

#[derive(Debug, Clone)]
pub struct CitationValidator {
    parser: CitationParser,
}

impl CitationValidator {
    pub fn new(parser: CitationParser) -> Self {
        Self { parser }
    }

    /// Extract the citations of `raw` that point at known documents.
    ///
    /// Ids come out in first-seen order; lines within an id are ascending and
    /// unique.
    pub fn extract(&self, raw: &str, corpus: &Corpus) -> Vec<Citation> {
        let mut merged: Vec<(String, BTreeSet<u32>)> = Vec::new();

        for tag in self.parser.parse(raw) {
            let doc_id = tag.doc_id.trim().to_lowercase();
            if !corpus.contains(&doc_id) {
                tracing::debug!(doc_id = %tag.doc_id, "Dropping citation to unknown document");
                continue;
            }

            let lines = self.parser.line_numbers(&tag.line_list);
            match merged.iter_mut().find(|(id, _)| *id == doc_id) {
                Some((_, existing)) => existing.extend(lines),
                None => merged.push((doc_id, lines.into_iter().collect())),
            }
        }

        merged
            .into_iter()
            .map(|(doc_id, lines)| Citation {
                doc_id,
                lines: lines.into_iter().collect(),
            })
            .collect()
    }

    /// Apply the full policy to a model reply.
    pub fn validate(&self, raw: &str, corpus: &Corpus) -> ValidatedAnswer {
        if raw.contains(REFUSAL_MARKER) {
            return ValidatedAnswer {
                answer: NOT_FOUND_ANSWER.to_string(),
                citations: Vec::new(),
                refused: true,
            };
        }

        ValidatedAnswer {
            answer: raw.to_string(),
            citations: self.extract(raw, corpus),
            refused: false,
        }
    }
}
