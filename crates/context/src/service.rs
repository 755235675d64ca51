//! The answer pipeline
//!
//! `RagService` owns everything a query needs: the corpus, the lazily built
//! embedding index, the ranker, the admission gate, the synthesizer and the
//! citation validator. It is built once at startup and shared across
//! requests.

use crate::answer::{AnswerDebug, AnswerResult};
use crate::citation::{CitationParser, CitationValidator};
use crate::gate::{ContextGate, DEFAULT_THRESHOLD};
use crate::synthesizer::Synthesizer;
use std::sync::Arc;
use std::time::Instant;
use tinyrag_common::embeddings::create_embedder;
use tinyrag_common::llm::create_chat_model;
use tinyrag_common::metrics::{record_answer, AnswerOutcome};
use tinyrag_common::{AppConfig, AppError, ChatModel, Corpus, Embedder, Result};
use tinyrag_search::{HybridRanker, LazyIndex, Ranking};

/// Tunables for a `RagService`
#[derive(Debug, Clone)]
pub struct RagOptions {
    /// Documents ranked when the caller gives no `top_k`
    pub top_k: usize,
    pub admission_threshold: f32,
    /// Concurrent generation calls
    pub max_concurrent: usize,
}

impl Default for RagOptions {
    fn default() -> Self {
        Self {
            top_k: 3,
            admission_threshold: DEFAULT_THRESHOLD,
            max_concurrent: 2,
        }
    }
}

impl From<&AppConfig> for RagOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            admission_threshold: config.retrieval.admission_threshold,
            max_concurrent: config.llm.max_concurrent,
        }
    }
}

pub struct RagService {
    corpus: Corpus,
    embedder: Arc<dyn Embedder>,
    index: LazyIndex,
    ranker: HybridRanker,
    gate: ContextGate,
    synthesizer: Synthesizer,
    validator: CitationValidator,
    default_top_k: usize,
}

impl RagService {
    pub fn new(
        corpus: Corpus,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn ChatModel>,
        options: RagOptions,
    ) -> Result<Self> {
        let parser = CitationParser::new().map_err(|e| AppError::Internal {
            message: format!("invalid citation pattern: {}", e),
        })?;

        Ok(Self {
            ranker: HybridRanker::new(&corpus, embedder.clone()),
            gate: ContextGate::new(options.admission_threshold),
            synthesizer: Synthesizer::new(model, options.max_concurrent),
            validator: CitationValidator::new(parser),
            index: LazyIndex::new(),
            default_top_k: options.top_k,
            corpus,
            embedder,
        })
    }

    /// Wire up corpus, encoder and chat model from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let corpus = Corpus::load(&config.corpus)?;
        let embedder = create_embedder(&config.embedding)?;
        let model = create_chat_model(&config.llm)?;

        tracing::info!(
            documents = corpus.len(),
            embedder = embedder.model_name(),
            model = model.model_name(),
            "Initialized answer pipeline"
        );

        Self::new(corpus, embedder, model, RagOptions::from(config))
    }

    /// Build the embedding index ahead of the first request.
    pub async fn warm_up(&self) -> Result<()> {
        self.index
            .get_or_build(&self.corpus, self.embedder.as_ref())
            .await
            .map(|_| ())
    }

    pub fn is_ready(&self) -> bool {
        self.index.is_ready()
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Rank the corpus for `query`, building the index on first use.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Ranking {
        let index = match self
            .index
            .get_or_build(&self.corpus, self.embedder.as_ref())
            .await
        {
            Ok(index) => Some(index),
            Err(e) => {
                tracing::warn!(error = %e, "Embedding index build failed");
                None
            }
        };

        self.ranker.rank(query, index, top_k).await
    }

    /// Answer `query` from the corpus. Never fails: model errors become the
    /// answer text.
    pub async fn answer(&self, query: &str, top_k: usize) -> AnswerResult {
        let start = Instant::now();
        let ranking = self.retrieve(query, top_k).await;
        let context = self.gate.admit(&self.corpus, &ranking.entries);

        if context.is_empty() {
            tracing::info!(
                retrieval_method = ranking.mode.as_str(),
                "No document cleared the admission threshold"
            );
            record_answer(start.elapsed().as_secs_f64(), AnswerOutcome::NotFound, 0);
            return AnswerResult::not_found(ranking.mode);
        }

        let (raw, generated) = match self.synthesizer.generate(query, &context).await {
            Ok(raw) => (raw, true),
            Err(e) => (format!("Error generating answer: {}", e), false),
        };
        let validated = self.validator.validate(&raw, &self.corpus);

        let outcome = if !generated {
            AnswerOutcome::ModelError
        } else if validated.refused {
            AnswerOutcome::Refused
        } else {
            AnswerOutcome::Answered
        };
        let chunks_used = context.chunks_used();
        record_answer(start.elapsed().as_secs_f64(), outcome, chunks_used);

        tracing::info!(
            chunks_used,
            retrieval_method = ranking.mode.as_str(),
            citations = validated.citations.len(),
            outcome = outcome.as_str(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Answered query"
        );

        AnswerResult {
            answer: validated.answer,
            citations: validated.citations,
            debug: AnswerDebug::new(chunks_used, ranking.mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::NOT_FOUND_ANSWER;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tinyrag_common::embeddings::HashingEmbedder;
    use tinyrag_common::ModelError;

    struct CountingModel {
        calls: AtomicUsize,
        reply: std::result::Result<String, String>,
    }

    impl CountingModel {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: Ok(reply.to_string()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: Err(message.to_string()),
            })
        }
    }

    #[async_trait]
    impl ChatModel for CountingModel {
        async fn chat(&self, _system: &str, _user: &str, _temperature: f32) -> std::result::Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(ModelError::Unavailable)
        }

        fn model_name(&self) -> &str {
            "counting"
        }
    }

    fn service(model: Arc<CountingModel>) -> RagService {
        RagService::new(
            Corpus::builtin(),
            Arc::new(HashingEmbedder::new(384)),
            model,
            RagOptions::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_context_skips_model() {
        let model = CountingModel::replying("should not be used");
        let service = service(model.clone());

        let result = service.answer("What is the refund policy?", 0).await;
        assert_eq!(result.answer, NOT_FOUND_ANSWER);
        assert!(result.citations.is_empty());
        assert_eq!(result.debug.chunks_used, 0);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_model_error_becomes_answer_text() {
        let service = service(CountingModel::failing("connection refused"));

        let result = service.answer("What is the refund policy?", 3).await;
        assert_eq!(
            result.answer,
            "Error generating answer: model unavailable: connection refused"
        );
        assert!(result.citations.is_empty());
        assert!(result.debug.chunks_used >= 1);
    }

    #[tokio::test]
    async fn test_warm_up_builds_index_once() {
        let service = service(CountingModel::replying("ok"));
        assert!(!service.is_ready());
        service.warm_up().await.unwrap();
        assert!(service.is_ready());
        assert_eq!(service.default_top_k(), 3);
    }

    #[test]
    fn test_options_from_config() {
        let mut config = AppConfig::default();
        config.retrieval.top_k = 5;
        config.llm.max_concurrent = 4;
        let options = RagOptions::from(&config);

        assert_eq!(options.top_k, 5);
        assert_eq!(options.max_concurrent, 4);
        assert_eq!(options.admission_threshold, 0.1);
    }
}
