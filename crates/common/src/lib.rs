//! TinyRAG Common Library
//!
//! Shared code for the TinyRAG crates including:
//! - The fixed document corpus
//! - Embedding encoder and chat model abstractions
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod errors;
pub mod llm;
pub mod metrics;

// Re-export commonly used types
pub use config::AppConfig;
pub use corpus::{Corpus, Document};
pub use embeddings::Embedder;
pub use errors::{AppError, Result};
pub use llm::{ChatModel, ModelError};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
