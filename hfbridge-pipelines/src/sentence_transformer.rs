//! Sentence embedding model wrapper.

use crate::handle::ObjectHandle;
use hfbridge_core::{BridgeError, Result, RuntimeBridge, TensorBuffer};
use pyo3::prelude::*;
use pyo3::types::PyDict;

/// Options for loading a sentence embedding model.
#[derive(Debug, Clone, Default)]
pub struct SentenceTransformerOptions {
    pub cache_dir: Option<String>,
    /// Pin a model revision (branch, tag, or commit)
    pub revision: Option<String>,
    pub device: Option<String>,
    pub trust_remote_code: bool,
}

impl SentenceTransformerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<String>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_trust_remote_code(mut self, trust_remote_code: bool) -> Self {
        self.trust_remote_code = trust_remote_code;
        self
    }
}

/// A loaded sentence embedding model. Encoding a batch of sentences yields
/// one fixed-width embedding row per input, in input order.
#[derive(Debug)]
pub struct SentenceTransformer {
    handle: ObjectHandle,
}

impl SentenceTransformer {
    /// Load a pretrained sentence embedding model.
    pub fn from_model(model: &str, options: &SentenceTransformerOptions) -> Result<Self> {
        if model.trim().is_empty() {
            return Err(BridgeError::invalid_argument(
                "model identifier must not be empty",
            ));
        }
        if let Some(device) = &options.device {
            if device.trim().is_empty() {
                return Err(BridgeError::invalid_argument(
                    "device must not be empty when provided",
                ));
            }
        }

        let bridge = RuntimeBridge::acquire()?;
        bridge.enter("sentence_transformer.load", |py| {
            let kwargs = PyDict::new(py);
            if let Some(cache_dir) = &options.cache_dir {
                kwargs.set_item("cache_folder", cache_dir.as_str())?;
            }
            if let Some(revision) = &options.revision {
                kwargs.set_item("revision", revision.as_str())?;
            }
            if let Some(device) = &options.device {
                kwargs.set_item("device", device.as_str())?;
            }
            if options.trust_remote_code {
                kwargs.set_item("trust_remote_code", true)?;
            }

            let module = py.import("sentence_transformers")?;
            let model_obj = module
                .getattr("SentenceTransformer")?
                .call((model,), Some(&kwargs))
                .map_err(|e| BridgeError::model_load(model, e.to_string()))?;
            tracing::debug!(model, "sentence transformer loaded");

            Ok(SentenceTransformer {
                handle: ObjectHandle::new(model_obj.unbind()),
            })
        })
    }

    /// Embed a batch of sentences into a rank-2 buffer with one row per
    /// input sentence, row order matching input order.
    pub fn encode(&self, sentences: &[String]) -> Result<TensorBuffer<f32>> {
        if sentences.is_empty() {
            return Err(BridgeError::invalid_argument(
                "sentence batch must not be empty",
            ));
        }
        let operation = "sentence_transformer.encode";
        self.handle.with(operation, |py, model| {
            let result = model.call_method1("encode", (sentences.to_vec(),))?;
            let buffer = TensorBuffer::<f32>::from_object(py, &result, operation)?;
            if buffer.rank() != 2 {
                return Err(BridgeError::contract(
                    operation,
                    format!(
                        "embedding tensor must be rank 2, got rank {} {:?}",
                        buffer.rank(),
                        buffer.shape()
                    ),
                ));
            }
            if buffer.shape()[0] != sentences.len() {
                return Err(BridgeError::contract(
                    operation,
                    format!(
                        "expected {} embedding rows, got {}",
                        sentences.len(),
                        buffer.shape()[0]
                    ),
                ));
            }
            Ok(buffer)
        })
    }

    /// Embed a single sentence.
    pub fn encode_one(&self, sentence: &str) -> Result<Vec<f32>> {
        let batch = [sentence.to_string()];
        let buffer = self.encode(&batch)?;
        let view = buffer.view2()?;
        let row = view.row(0).ok_or_else(|| {
            BridgeError::contract("sentence_transformer.encode_one", "embedding batch is empty")
        })?;
        Ok(row.to_vec())
    }

    pub fn is_disposed(&self) -> bool {
        self.handle.is_disposed()
    }

    /// Release the runtime-side model reference. Idempotent.
    pub fn dispose(&mut self) -> Result<()> {
        self.handle.dispose("sentence_transformer.dispose")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_model_identifier_is_rejected_before_the_runtime() {
        let err = SentenceTransformer::from_model("", &SentenceTransformerOptions::new());
        assert!(matches!(
            err.unwrap_err(),
            BridgeError::InvalidArgument(_)
        ));
    }

    #[test]
    fn empty_batch_is_rejected_before_the_runtime() {
        let model = SentenceTransformer {
            handle: ObjectHandle::already_disposed(),
        };
        assert!(matches!(
            model.encode(&[]).unwrap_err(),
            BridgeError::InvalidArgument(_)
        ));
    }
}
