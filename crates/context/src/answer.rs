//! Answer payload returned for every query

use crate::citation::Citation;
use serde::{Deserialize, Serialize};
use tinyrag_search::RetrievalMode;

/// Canonical answer when the corpus cannot support a response
pub const NOT_FOUND_ANSWER: &str = "Not found in provided documents.";

/// Substring that marks a model reply as a refusal (case-sensitive)
pub const REFUSAL_MARKER: &str = "Not found in provided documents";

/// Fixed identifier carried in every debug payload for log correlation
pub const TRACE_ID: &str = "RZW-7F3K-20260109";

/// Reasoning style advertised in the debug payload
pub const REASONING_STYLE: &str = "brief";

/// Final answer with validated citations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub debug: AnswerDebug,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerDebug {
    /// Documents admitted into the generation context
    pub chunks_used: usize,
    pub retrieval_method: String,
    pub reasoning_style: String,
    pub trace_id: String,
}

impl AnswerDebug {
    pub fn new(chunks_used: usize, mode: RetrievalMode) -> Self {
        Self {
            chunks_used,
            retrieval_method: mode.as_str().to_string(),
            reasoning_style: REASONING_STYLE.to_string(),
            trace_id: TRACE_ID.to_string(),
        }
    }
}

impl AnswerResult {
    /// The citation-free result returned when nothing was admitted.
    pub fn not_found(mode: RetrievalMode) -> Self {
        Self {
            answer: NOT_FOUND_ANSWER.to_string(),
            citations: Vec::new(),
            debug: AnswerDebug::new(0, mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_shape() {
        let result = AnswerResult::not_found(RetrievalMode::Hybrid);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["answer"], "Not found in provided documents.");
        assert_eq!(json["citations"], serde_json::json!([]));
        assert_eq!(json["debug"]["chunks_used"], 0);
        assert_eq!(json["debug"]["retrieval_method"], "hybrid");
        assert_eq!(json["debug"]["reasoning_style"], "brief");
        assert_eq!(json["debug"]["trace_id"], "RZW-7F3K-20260109");
    }

    #[test]
    fn test_refusal_marker_is_prefix_of_canonical_answer() {
        assert!(NOT_FOUND_ANSWER.starts_with(REFUSAL_MARKER));
    }
}
