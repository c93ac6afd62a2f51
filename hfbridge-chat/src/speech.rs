//! Async transcription over the speech recognition pipeline.

use async_trait::async_trait;
use hfbridge_core::{BridgeError, Result};
use hfbridge_pipelines::AutomaticSpeechRecognitionPipeline;
use std::sync::Arc;

/// Async speech-to-text interface.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe an in-memory audio buffer to text.
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String>;
}

/// [`SpeechToText`] backed by a shared speech recognition pipeline.
#[derive(Debug, Clone)]
pub struct SpeechToTextClient {
    pipeline: Arc<AutomaticSpeechRecognitionPipeline>,
}

impl SpeechToTextClient {
    pub fn new(pipeline: Arc<AutomaticSpeechRecognitionPipeline>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Arc<AutomaticSpeechRecognitionPipeline> {
        &self.pipeline
    }
}

#[async_trait]
impl SpeechToText for SpeechToTextClient {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String> {
        let pipeline = Arc::clone(&self.pipeline);
        tokio::task::spawn_blocking(move || pipeline.transcribe_bytes(&audio))
            .await
            .map_err(|e| BridgeError::task(e.to_string()))?
    }
}
