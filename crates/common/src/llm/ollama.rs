use super::{normalize_err_body, ChatModel, ModelError};
use crate::config::LlmConfig;
use crate::embeddings::http_client;
use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// Chat client for a local Ollama server
pub struct OllamaChat {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OllamaChat {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout())?,
            model: config.model.clone(),
            base_url: config
                .api_base
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn request<'a>(&'a self, system: &'a str, user: &'a str, temperature: f32) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            options: ChatOptions { temperature },
        }
    }
}

fn reply_text(response: ChatResponse) -> std::result::Result<String, ModelError> {
    Some(response.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(ModelError::EmptyResponse)
}

#[async_trait]
impl ChatModel for OllamaChat {
    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> std::result::Result<String, ModelError> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(url)
            .json(&self.request(system, user, temperature))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status,
                body: normalize_err_body(&body),
            });
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        reply_text(response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
