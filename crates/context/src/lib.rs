//! TinyRAG answer pipeline
//!
//! Turns a ranked corpus into a grounded answer:
//! - Context admission over the hybrid ranking
//! - Single temperature-0 generation bound to the admitted documents
//! - Citation parsing and validation against the corpus
//! - Refusal override

pub mod answer;
pub mod citation;
pub mod gate;
pub mod service;
pub mod synthesizer;

pub use answer::{AnswerDebug, AnswerResult, NOT_FOUND_ANSWER, TRACE_ID};
pub use citation::Citation;
pub use service::{RagOptions, RagService};
