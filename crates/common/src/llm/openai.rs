use super::{normalize_err_body, ChatModel, ModelError};
use crate::config::LlmConfig;
use crate::embeddings::http_client;
use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Chat client for OpenAI-compatible `/chat/completions` endpoints
pub struct OpenAIChat {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl OpenAIChat {
    pub fn new(api_key: String, config: &LlmConfig) -> Result<Self> {
        let base = config
            .api_base
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());

        Ok(Self {
            client: http_client(config.timeout())?,
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", base.trim_end_matches('/')),
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
            temperature,
        }
    }
}

fn reply_text(response: ChatResponse) -> std::result::Result<String, ModelError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(ModelError::EmptyResponse)
}

#[async_trait]
impl ChatModel for OpenAIChat {
    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> std::result::Result<String, ModelError> {
        let request = self.request(system, user, temperature);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
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

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        reply_text(chat_response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
