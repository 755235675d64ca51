//! TinyRAG retrieval
//!
//! Ranks the fixed corpus against a question by fusing keyword overlap with
//! embedding similarity.

pub mod index;
pub mod retrieval;

pub use index::{EmbeddingIndex, LazyIndex};
pub use retrieval::{HybridRanker, RankedEntry, Ranking, RetrievalMode, ScoreMap};
