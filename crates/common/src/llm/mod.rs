//! Generative model abstraction
//!
//! The answer pipeline talks to a chat model through [`ChatModel`]: one
//! system instruction, one user message, a sampling temperature. Providers:
//! - Ollama (`/api/chat`)
//! - OpenAI-compatible endpoints (`/chat/completions`)

mod ollama;
mod openai;

pub use ollama::OllamaChat;
pub use openai::OpenAIChat;

use crate::config::LlmConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Failure of a single generation call.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("request to model failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode model response: {0}")]
    Decode(String),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("model unavailable: {0}")]
    Unavailable(String),
}

/// A chat-style generative model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a system instruction and a user message, returning the reply text.
    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> std::result::Result<String, ModelError>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Create a chat model based on configuration
pub fn create_chat_model(config: &LlmConfig) -> Result<Arc<dyn ChatModel>> {
    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaChat::new(config)?)),
        "openai" => {
            let key = config.api_key.clone().ok_or_else(|| AppError::Configuration {
                message: "llm.api_key is required for the openai provider".to_string(),
            })?;
            Ok(Arc::new(OpenAIChat::new(key, config)?))
        }
        other => Err(AppError::Configuration {
            message: format!("unknown llm provider: {}", other),
        }),
    }
}

/// Render a non-success body for error messages, preferring a JSON `error` field.
pub(crate) fn normalize_err_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match json.get("error") {
            Some(serde_json::Value::String(message)) => return message.clone(),
            Some(serde_json::Value::Object(obj)) => {
                if let Some(message) = obj.get("message").and_then(|m| m.as_str()) {
                    return message.to_string();
                }
            }
            _ => {}
        }
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_err_body() {
        assert_eq!(normalize_err_body("  "), "<empty body>");
        assert_eq!(
            normalize_err_body(r#"{"error": "model 'x' not found"}"#),
            "model 'x' not found"
        );
        assert_eq!(
            normalize_err_body(r#"{"error": {"message": "bad key", "type": "auth"}}"#),
            "bad key"
        );
        assert_eq!(normalize_err_body("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn test_factory() {
        assert!(create_chat_model(&LlmConfig::default()).is_ok());

        let openai_without_key = LlmConfig {
            provider: "openai".to_string(),
            ..LlmConfig::default()
        };
        assert!(create_chat_model(&openai_without_key).is_err());

        let unknown = LlmConfig {
            provider: "gpt4all".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(
            create_chat_model(&unknown),
            Err(AppError::Configuration { .. })
        ));
    }

    #[test]
    fn test_model_error_display() {
        let err = ModelError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "model returned 500: boom");
    }
}
