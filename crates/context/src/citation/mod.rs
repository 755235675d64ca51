//! Citations in generated answers
//!
//! - `parser`: locates `[doc_id: L1, L2]` tags in model output
//! - `validator`: keeps only tags that point at corpus documents

mod parser;
mod validator;

pub use parser::{CitationParser, RawCitation, CITATION_PATTERN};
pub use validator::{CitationValidator, ValidatedAnswer};

use serde::{Deserialize, Serialize};

/// Validated reference from an answer to lines of a corpus document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub doc_id: String,
    /// Ascending, no duplicates
    pub lines: Vec<u32>,
}

impl Citation {
    pub fn new(doc_id: impl Into<String>, lines: Vec<u32>) -> Self {
        Self {
            doc_id: doc_id.into(),
            lines,
        }
    }
}
