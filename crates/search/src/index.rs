//! Precomputed document embeddings
//!
//! The index is built once per process from the full corpus. `LazyIndex`
//! defers the build to first use; a failed build leaves it empty so the next
//! caller retries.

use std::time::Instant;
use tinyrag_common::{AppError, Corpus, Embedder, Result};
use tokio::sync::OnceCell;

/// One embedding vector per corpus document, in corpus order.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    entries: Vec<(String, Vec<f32>)>,
    dimension: usize,
    model: String,
}

impl EmbeddingIndex {
    /// Encode every document in a single batch.
    pub async fn build(corpus: &Corpus, embedder: &dyn Embedder) -> Result<Self> {
        let start = Instant::now();
        let texts: Vec<String> = corpus.iter().map(|doc| doc.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;

        if vectors.len() != corpus.len() {
            return Err(AppError::EmbeddingError {
                message: format!(
                    "encoder returned {} vectors for {} documents",
                    vectors.len(),
                    corpus.len()
                ),
            });
        }

        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = vectors.iter().position(|v| v.len() != dimension) {
            return Err(AppError::EmbeddingError {
                message: format!(
                    "inconsistent embedding dimension at document {}: expected {}, got {}",
                    bad,
                    dimension,
                    vectors[bad].len()
                ),
            });
        }

        let entries: Vec<(String, Vec<f32>)> = corpus
            .ids()
            .map(str::to_string)
            .zip(vectors)
            .collect();

        tracing::info!(
            documents = entries.len(),
            dimension,
            model = embedder.model_name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built embedding index"
        );

        Ok(Self {
            entries,
            dimension,
            model: embedder.model_name().to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.entries
            .iter()
            .map(|(id, vector)| (id.as_str(), vector.as_slice()))
    }

    pub fn get(&self, id: &str) -> Option<&[f32]> {
        self.entries
            .iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, vector)| vector.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Build-once holder for the embedding index.
#[derive(Debug, Default)]
pub struct LazyIndex {
    cell: OnceCell<EmbeddingIndex>,
}

impl LazyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index, building it if no build has succeeded yet.
    ///
    /// Concurrent callers wait on the same build.
    pub async fn get_or_build(&self, corpus: &Corpus, embedder: &dyn Embedder) -> Result<&EmbeddingIndex> {
        self.cell
            .get_or_try_init(|| EmbeddingIndex::build(corpus, embedder))
            .await
    }

    pub fn get(&self) -> Option<&EmbeddingIndex> {
        self.cell.get()
    }

    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }
}
