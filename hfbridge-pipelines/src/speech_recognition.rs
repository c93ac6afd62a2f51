//! Automatic speech recognition pipeline.

use crate::pipeline::{Pipeline, PipelineOptions, Task};
use crate::record;
use crate::tokenizer::Tokenizer;
use hfbridge_core::{BridgeError, Result};
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict};

/// Pipeline bound to the `automatic-speech-recognition` task.
#[derive(Debug)]
pub struct AutomaticSpeechRecognitionPipeline {
    inner: Pipeline,
}

impl AutomaticSpeechRecognitionPipeline {
    pub fn from_model(model: &str, options: &PipelineOptions) -> Result<Self> {
        Ok(Self {
            inner: Pipeline::load(Task::AutomaticSpeechRecognition, model, options)?,
        })
    }

    /// Transcribe audio addressed by local path or URL.
    pub fn transcribe(&self, audio: &str) -> Result<String> {
        if audio.trim().is_empty() {
            return Err(BridgeError::invalid_argument(
                "audio path or URL must not be empty",
            ));
        }
        let operation = "speech_recognition.transcribe";
        self.inner.with(operation, |py, pipeline| {
            let kwargs = PyDict::new(py);
            kwargs.set_item("return_timestamps", false)?;
            let result = pipeline.call((audio,), Some(&kwargs))?;
            record::require_str(operation, &result, "text")
        })
    }

    /// Transcribe an in-memory audio buffer. The buffer is consumed fully
    /// before the call; there is no streaming ingestion.
    pub fn transcribe_bytes(&self, audio: &[u8]) -> Result<String> {
        if audio.is_empty() {
            return Err(BridgeError::invalid_argument(
                "audio buffer must not be empty",
            ));
        }
        let operation = "speech_recognition.transcribe_bytes";
        self.inner.with(operation, |py, pipeline| {
            let kwargs = PyDict::new(py);
            kwargs.set_item("return_timestamps", false)?;
            let data = PyBytes::new(py, audio);
            let result = pipeline.call((data,), Some(&kwargs))?;
            record::require_str(operation, &result, "text")
        })
    }

    pub fn device(&self) -> &str {
        self.inner.device()
    }

    pub fn tokenizer(&self) -> Result<&Tokenizer> {
        self.inner.tokenizer()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    pub fn dispose(&mut self) -> Result<()> {
        self.inner.dispose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_audio_inputs_are_rejected() {
        let pipeline = AutomaticSpeechRecognitionPipeline {
            inner: Pipeline::stub_disposed(),
        };
        assert!(matches!(
            pipeline.transcribe(" ").unwrap_err(),
            BridgeError::InvalidArgument(_)
        ));
        assert!(matches!(
            pipeline.transcribe_bytes(&[]).unwrap_err(),
            BridgeError::InvalidArgument(_)
        ));
    }
}
