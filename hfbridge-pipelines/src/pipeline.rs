//! Pipeline base handle: loading, device resolution, and tokenizer caching.

use crate::handle::ObjectHandle;
use crate::tokenizer::Tokenizer;
use hfbridge_core::{BridgeError, CancelToken, Dtype, Result, RuntimeBridge};
use once_cell::sync::OnceCell;
use pyo3::prelude::*;
use pyo3::types::PyDict;

/// Task kind a pipeline is bound to at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    TextClassification,
    TextGeneration,
    ObjectDetection,
    ImageClassification,
    AutomaticSpeechRecognition,
    TextToAudio,
}

impl Task {
    /// The runtime's task identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::TextClassification => "text-classification",
            Task::TextGeneration => "text-generation",
            Task::ObjectDetection => "object-detection",
            Task::ImageClassification => "image-classification",
            Task::AutomaticSpeechRecognition => "automatic-speech-recognition",
            Task::TextToAudio => "text-to-audio",
        }
    }
}

/// Options for loading a pretrained pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub dtype: Option<Dtype>,
    pub device: Option<String>,
    pub trust_remote_code: bool,
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the weight precision
    pub fn with_dtype(mut self, dtype: Dtype) -> Self {
        self.dtype = Some(dtype);
        self
    }

    /// Set the placement device (e.g. "cuda", "cpu")
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Allow the runtime to execute model-supplied code
    pub fn with_trust_remote_code(mut self, trust_remote_code: bool) -> Self {
        self.trust_remote_code = trust_remote_code;
        self
    }
}

/// A loaded, task-bound pipeline: an opaque runtime-resident object behind a
/// typed wrapper. Immutable configuration-plus-weights once loaded.
#[derive(Debug)]
pub struct Pipeline {
    handle: ObjectHandle,
    device: String,
    tokenizer: OnceCell<Tokenizer>,
}

impl Pipeline {
    /// Load a named pretrained artifact into the runtime under the given
    /// task kind.
    ///
    /// Argument validation happens before any interpreter call; an
    /// unknown or unreachable model surfaces as a load failure.
    pub fn load(task: Task, model: &str, options: &PipelineOptions) -> Result<Self> {
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
        bridge.enter("pipeline.load", |py| {
            let kwargs = PyDict::new(py);
            kwargs.set_item("task", task.as_str())?;
            kwargs.set_item("model", model)?;
            if let Some(dtype) = options.dtype {
                let torch = py.import("torch")?;
                kwargs.set_item("torch_dtype", torch.getattr(dtype.as_torch_name())?)?;
            }
            if let Some(device) = &options.device {
                kwargs.set_item("device", device.as_str())?;
            }
            if options.trust_remote_code {
                kwargs.set_item("trust_remote_code", true)?;
            }

            let transformers = py.import("transformers")?;
            let pipeline = transformers
                .getattr("pipeline")?
                .call((), Some(&kwargs))
                .map_err(|e| BridgeError::model_load(model, e.to_string()))?;
            let device = pipeline.getattr("device")?.str()?.to_string();
            tracing::debug!(task = task.as_str(), model, %device, "pipeline loaded");

            Ok(Pipeline {
                handle: ObjectHandle::new(pipeline.unbind()),
                device,
                tokenizer: OnceCell::new(),
            })
        })
    }

    /// Resolved execution device reported by the runtime.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Tokenizer read off this pipeline object. Constructed lazily on first
    /// access and cached per wrapper; no separate model load.
    pub fn tokenizer(&self) -> Result<&Tokenizer> {
        self.tokenizer.get_or_try_init(|| {
            self.handle.with("pipeline.tokenizer", |_py, pipeline| {
                let tokenizer = pipeline.getattr("tokenizer")?;
                if tokenizer.is_none() {
                    return Err(BridgeError::contract(
                        "pipeline.tokenizer",
                        "pipeline carries no tokenizer",
                    ));
                }
                Ok(Tokenizer::from_object(tokenizer.unbind()))
            })
        })
    }

    pub fn is_disposed(&self) -> bool {
        self.handle.is_disposed()
    }

    /// Release the runtime-side pipeline (and cached tokenizer) reference.
    /// Further task operations fail with a disposed-handle error.
    pub fn dispose(&mut self) -> Result<()> {
        if let Some(mut tokenizer) = self.tokenizer.take() {
            tokenizer.dispose()?;
        }
        self.handle.dispose("pipeline.dispose")
    }

    pub(crate) fn with<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(Python<'_>, &Bound<'_, PyAny>) -> Result<R>,
    ) -> Result<R> {
        self.handle.with(operation, f)
    }

    pub(crate) fn with_cancellable<R>(
        &self,
        operation: &'static str,
        cancel: &CancelToken,
        f: impl FnOnce(Python<'_>, &Bound<'_, PyAny>) -> Result<R>,
    ) -> Result<R> {
        self.handle.with_cancellable(operation, cancel, f)
    }

    #[cfg(test)]
    pub(crate) fn stub_disposed() -> Self {
        Pipeline {
            handle: ObjectHandle::already_disposed(),
            device: "cpu".to_string(),
            tokenizer: OnceCell::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_identifiers_match_the_runtime() {
        assert_eq!(Task::TextClassification.as_str(), "text-classification");
        assert_eq!(Task::TextGeneration.as_str(), "text-generation");
        assert_eq!(Task::ObjectDetection.as_str(), "object-detection");
        assert_eq!(Task::ImageClassification.as_str(), "image-classification");
        assert_eq!(
            Task::AutomaticSpeechRecognition.as_str(),
            "automatic-speech-recognition"
        );
        assert_eq!(Task::TextToAudio.as_str(), "text-to-audio");
    }

    #[test]
    fn empty_model_identifier_is_rejected_before_the_runtime() {
        let err = Pipeline::load(Task::TextClassification, "  ", &PipelineOptions::new());
        assert!(matches!(
            err.unwrap_err(),
            BridgeError::InvalidArgument(_)
        ));
    }

    #[test]
    fn empty_device_is_rejected_before_the_runtime() {
        let options = PipelineOptions::new().with_device("");
        let err = Pipeline::load(Task::TextGeneration, "facebook/opt-125m", &options);
        assert!(matches!(
            err.unwrap_err(),
            BridgeError::InvalidArgument(_)
        ));
    }
}
