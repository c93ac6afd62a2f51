//! Text-to-audio pipeline.

use crate::pipeline::{Pipeline, PipelineOptions, Task};
use crate::record;
use crate::tokenizer::Tokenizer;
use hfbridge_core::tensor::narrow;
use hfbridge_core::{BridgeError, Result, TensorBuffer};
use pyo3::prelude::*;

/// Synthesized audio: a rank-2 waveform buffer (rows are channels) plus its
/// sampling rate.
#[derive(Debug, Clone)]
pub struct AudioResult {
    pub samples: TensorBuffer<f32>,
    pub sampling_rate: u32,
}

/// Pipeline bound to the `text-to-audio` task.
#[derive(Debug)]
pub struct TextToAudioPipeline {
    inner: Pipeline,
}

impl TextToAudioPipeline {
    pub fn from_model(model: &str, options: &PipelineOptions) -> Result<Self> {
        Ok(Self {
            inner: Pipeline::load(Task::TextToAudio, model, options)?,
        })
    }

    /// Synthesize speech for the given text.
    pub fn synthesize(&self, text: &str) -> Result<AudioResult> {
        if text.trim().is_empty() {
            return Err(BridgeError::invalid_argument("text must not be empty"));
        }
        let operation = "text_to_audio.synthesize";
        self.inner.with(operation, |py, pipeline| {
            let result = pipeline.call1((text,))?;
            let audio = record::require(operation, &result, "audio")?;
            let samples = TensorBuffer::<f32>::from_object(py, &audio, operation)?;
            if samples.rank() != 2 {
                return Err(BridgeError::contract(
                    operation,
                    format!(
                        "audio tensor must be rank 2, got rank {} {:?}",
                        samples.rank(),
                        samples.shape()
                    ),
                ));
            }
            let rate = record::require_i64(operation, &result, "sampling_rate")?;
            Ok(AudioResult {
                samples,
                sampling_rate: narrow("sampling_rate", rate)?,
            })
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
    fn empty_text_is_rejected_before_the_runtime() {
        let pipeline = TextToAudioPipeline {
            inner: Pipeline::stub_disposed(),
        };
        assert!(matches!(
            pipeline.synthesize("").unwrap_err(),
            BridgeError::InvalidArgument(_)
        ));
    }
}
