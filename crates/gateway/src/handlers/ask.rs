//! Question answering handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::AppState;
use tinyrag_common::errors::{AppError, Result};
use tinyrag_context::AnswerResult;

/// Ask request
#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(max = 4000))]
    pub question: Option<String>,

    /// Documents to rank (defaults to `retrieval.top_k`), at most 50
    #[validate(range(max = 50))]
    pub top_k: Option<usize>,
}

/// Answer a question from the corpus
pub async fn ask(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AnswerResult>> {
    let Json(request) = payload.map_err(|rejection| match rejection {
        JsonRejection::JsonDataError(e) => AppError::Validation {
            message: e.body_text(),
            field: None,
        },
        other => {
            tracing::debug!(rejection = %other, "Rejected non-JSON body");
            AppError::InvalidFormat {
                message: "Request must be JSON".to_string(),
            }
        }
    })?;

    request.validate().map_err(|e| AppError::Validation {
        field: e.field_errors().keys().next().map(|k| k.to_string()),
        message: e.to_string(),
    })?;

    let question = request
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::MissingField {
            field: "question".to_string(),
        })?;
    let top_k = request.top_k.unwrap_or_else(|| state.service.default_top_k());

    tracing::info!(top_k, question_chars = question.len(), "Answering question");

    let result = state.service.answer(question, top_k).await;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_bound() {
        let ok = AskRequest {
            question: Some("refund?".to_string()),
            top_k: Some(50),
        };
        assert!(ok.validate().is_ok());

        let too_many = AskRequest {
            question: Some("refund?".to_string()),
            top_k: Some(51),
        };
        let err = too_many.validate().unwrap_err();
        assert!(err.field_errors().contains_key("top_k"));
    }

    #[test]
    fn test_optional_fields_deserialize() {
        let request: AskRequest = serde_json::from_str(r#"{"question": "hi"}"#).unwrap();
        assert_eq!(request.question.as_deref(), Some("hi"));
        assert!(request.top_k.is_none());

        let empty: AskRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.question.is_none());
    }
}
