use super::{http_client, with_retry, Embedder};
use crate::config::EmbeddingConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// Embedding client for a local Ollama server
pub struct OllamaEmbedder {
    client: reqwest::Client,
    model: String,
    base_url: String,
    max_retries: u32,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout())?,
            model: config.model.clone(),
            base_url: config
                .api_base
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            max_retries: config.max_retries,
        })
    }

    async fn make_request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| AppError::EmbeddingError {
                message: format!("failed to call ollama embed endpoint: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::EmbeddingError {
                message: format!("ollama /api/embed returned {}: {}", status, body.trim()),
            });
        }

        let response: EmbedResponse =
            response
                .json()
                .await
                .map_err(|e| AppError::EmbeddingError {
                    message: format!("failed to decode ollama /api/embed response: {}", e),
                })?;

        if response.embeddings.len() != texts.len() {
            return Err(AppError::EmbeddingError {
                message: format!(
                    "ollama returned {} embeddings for {} inputs",
                    response.embeddings.len(),
                    texts.len()
                ),
            });
        }

        Ok(response.embeddings)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = text.trim();
        if input.is_empty() {
            return Err(AppError::EmbeddingError {
                message: "cannot embed empty text input".to_string(),
            });
        }

        self.embed_batch(&[input.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::EmbeddingError {
                message: "ollama /api/embed returned empty embeddings array".to_string(),
            })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let result = with_retry(&self.model, self.max_retries, || self.make_request(texts)).await;
        metrics::record_embedding(
            start.elapsed().as_secs_f64(),
            &self.model,
            texts.len(),
            result.is_ok(),
        );
        result
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder(api_base: Option<&str>) -> OllamaEmbedder {
        OllamaEmbedder::new(&EmbeddingConfig {
            provider: "ollama".to_string(),
            api_base: api_base.map(str::to_string),
            ..EmbeddingConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        assert_eq!(embedder(Some("http://gpu-box:11434/")).base_url, "http://gpu-box:11434");
        assert_eq!(embedder(None).base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_embed_request_shape() {
        let input = vec!["refund policy".to_string(), "api keys".to_string()];
        let body = serde_json::to_value(EmbedRequest {
            model: "all-minilm",
            input: &input,
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({"model": "all-minilm", "input": ["refund policy", "api keys"]})
        );
    }
}
