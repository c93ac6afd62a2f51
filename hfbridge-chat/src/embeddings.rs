//! Async embedding generation over a sentence embedding model.

use async_trait::async_trait;
use hfbridge_core::{BridgeError, Result};
use hfbridge_pipelines::SentenceTransformer;
use std::sync::Arc;

/// Async embedding interface.
#[async_trait]
pub trait EmbeddingGenerator: Send + Sync {
    /// Embed a batch of sentences. One row per input, input order preserved,
    /// all rows the same width.
    async fn embed(&self, sentences: Vec<String>) -> Result<Vec<Vec<f32>>>;
}

/// [`EmbeddingGenerator`] backed by a shared sentence embedding model.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    model: Arc<SentenceTransformer>,
}

impl EmbeddingClient {
    pub fn new(model: Arc<SentenceTransformer>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Arc<SentenceTransformer> {
        &self.model
    }
}

#[async_trait]
impl EmbeddingGenerator for EmbeddingClient {
    async fn embed(&self, sentences: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        let buffer = tokio::task::spawn_blocking(move || model.encode(&sentences))
            .await
            .map_err(|e| BridgeError::task(e.to_string()))??;
        let view = buffer.view2()?;
        tracing::debug!(rows = view.rows(), cols = view.cols(), "embeddings ready");
        Ok(view.iter_rows().map(<[f32]>::to_vec).collect())
    }
}
