//! Embedding encoder abstraction
//!
//! Provides a unified interface for the encoders the service can run against:
//! - Ollama (`/api/embed`)
//! - OpenAI-compatible endpoints (`/embeddings`)
//! - A deterministic feature-hashing encoder for offline runs and tests

mod hashing;
mod ollama;
mod openai;

pub use hashing::HashingEmbedder;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::EmbeddingConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use backoff::{future::retry_notify, ExponentialBackoffBuilder};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding generation
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, one vector per input in order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Create an embedder based on configuration
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider.as_str() {
        "hashing" => Ok(Arc::new(HashingEmbedder::new(config.dimension))),
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(config)?)),
        "openai" => {
            let key = config.api_key.clone().ok_or_else(|| AppError::Configuration {
                message: "embedding.api_key is required for the openai provider".to_string(),
            })?;
            Ok(Arc::new(OpenAIEmbedder::new(key, config)?))
        }
        other => Err(AppError::Configuration {
            message: format!("unknown embedding provider: {}", other),
        }),
    }
}

/// Run a remote embedding call with exponential backoff, giving up after
/// `max_retries` retries.
pub(crate) async fn with_retry<T, F, Fut>(model: &str, max_retries: u32, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(100))
        .with_max_elapsed_time(None)
        .build();

    let mut attempts = 0u32;
    retry_notify(
        policy,
        || {
            attempts += 1;
            let attempt = attempts;
            let call = operation();
            async move {
                call.await.map_err(|e| {
                    if attempt > max_retries {
                        backoff::Error::permanent(e)
                    } else {
                        backoff::Error::transient(e)
                    }
                })
            }
        },
        |err: AppError, wait: Duration| {
            tracing::warn!(
                model,
                max_retries,
                wait_ms = wait.as_millis() as u64,
                error = %err,
                "Embedding request failed, retrying"
            );
        },
    )
    .await
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Internal {
            message: format!("Failed to create HTTP client: {}", e),
        })
}
