//! Tokenizer wrapper: encode/decode over a runtime-resident tokenizer
//! object, whether loaded standalone or read off a pipeline.

use crate::handle::ObjectHandle;
use crate::record;
use hfbridge_core::{BridgeError, Result, RuntimeBridge};
use pyo3::prelude::*;
use pyo3::types::PyDict;

/// Options for loading a standalone pretrained tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerOptions {
    pub cache_dir: Option<String>,
    pub force_download: bool,
    pub revision: Option<String>,
    pub trust_remote_code: bool,
}

impl TokenizerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<String>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn with_force_download(mut self, force_download: bool) -> Self {
        self.force_download = force_download;
        self
    }

    /// Pin a model revision (branch, tag, or commit)
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn with_trust_remote_code(mut self, trust_remote_code: bool) -> Self {
        self.trust_remote_code = trust_remote_code;
        self
    }
}

/// A loaded tokenizer. Encoding produces the id sequence the bound model
/// consumes; decoding inverts it, special tokens aside.
#[derive(Debug)]
pub struct Tokenizer {
    handle: ObjectHandle,
}

impl Tokenizer {
    pub(crate) fn from_object(object: Py<PyAny>) -> Self {
        Self {
            handle: ObjectHandle::new(object),
        }
    }

    /// Load a pretrained tokenizer without loading its model.
    pub fn from_pretrained(model: &str, options: &TokenizerOptions) -> Result<Self> {
        if model.trim().is_empty() {
            return Err(BridgeError::invalid_argument(
                "model identifier must not be empty",
            ));
        }

        let bridge = RuntimeBridge::acquire()?;
        bridge.enter("tokenizer.from_pretrained", |py| {
            let kwargs = PyDict::new(py);
            if let Some(cache_dir) = &options.cache_dir {
                kwargs.set_item("cache_dir", cache_dir.as_str())?;
            }
            if options.force_download {
                kwargs.set_item("force_download", true)?;
            }
            if let Some(revision) = &options.revision {
                kwargs.set_item("revision", revision.as_str())?;
            }
            if options.trust_remote_code {
                kwargs.set_item("trust_remote_code", true)?;
            }

            let transformers = py.import("transformers")?;
            let tokenizer = transformers
                .getattr("AutoTokenizer")?
                .getattr("from_pretrained")?
                .call((model,), Some(&kwargs))
                .map_err(|e| BridgeError::model_load(model, e.to_string()))?;
            tracing::debug!(model, "tokenizer loaded");

            Ok(Tokenizer {
                handle: ObjectHandle::new(tokenizer.unbind()),
            })
        })
    }

    /// Encode text to token ids, special tokens excluded.
    pub fn encode(&self, text: &str) -> Result<Vec<i64>> {
        self.encode_inner("tokenizer.encode", text, false)
            .map(|(ids, _)| ids)
    }

    /// Encode text to token ids with the model's special tokens included.
    pub fn encode_with_special_tokens(&self, text: &str) -> Result<Vec<i64>> {
        self.encode_inner("tokenizer.encode_with_special_tokens", text, true)
            .map(|(ids, _)| ids)
    }

    /// Encode text and return both the id sequence and its attention mask.
    /// The two vectors always have the same length.
    pub fn encode_with_attention(&self, text: &str) -> Result<(Vec<i64>, Vec<i64>)> {
        self.encode_inner("tokenizer.encode_with_attention", text, true)
    }

    fn encode_inner(
        &self,
        operation: &'static str,
        text: &str,
        add_special_tokens: bool,
    ) -> Result<(Vec<i64>, Vec<i64>)> {
        self.handle.with(operation, |py, tokenizer| {
            let kwargs = PyDict::new(py);
            kwargs.set_item("add_special_tokens", add_special_tokens)?;
            // The encoding object is dict-like, not a dict; go through the
            // mapping protocol.
            let encoding = tokenizer.call((text,), Some(&kwargs))?;
            let ids: Vec<i64> = record::require(operation, &encoding, "input_ids")?
                .extract()
                .map_err(|_| {
                    BridgeError::contract(operation, "input_ids is not an integer sequence")
                })?;
            let mask: Vec<i64> = record::require(operation, &encoding, "attention_mask")?
                .extract()
                .map_err(|_| {
                    BridgeError::contract(operation, "attention_mask is not an integer sequence")
                })?;
            if ids.len() != mask.len() {
                return Err(BridgeError::contract(
                    operation,
                    format!(
                        "attention mask length {} does not match {} token ids",
                        mask.len(),
                        ids.len()
                    ),
                ));
            }
            Ok((ids, mask))
        })
    }

    /// Decode token ids back to text, dropping special tokens.
    pub fn decode(&self, ids: &[i64]) -> Result<String> {
        let operation = "tokenizer.decode";
        self.handle.with(operation, |py, tokenizer| {
            let kwargs = PyDict::new(py);
            kwargs.set_item("skip_special_tokens", true)?;
            let text = tokenizer.call_method("decode", (ids.to_vec(),), Some(&kwargs))?;
            text.extract().map_err(|_| {
                BridgeError::contract(operation, "decode did not return a string")
            })
        })
    }

    pub fn is_disposed(&self) -> bool {
        self.handle.is_disposed()
    }

    /// Release the runtime-side tokenizer reference. Idempotent.
    pub fn dispose(&mut self) -> Result<()> {
        self.handle.dispose("tokenizer.dispose")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_model_identifier_is_rejected_before_the_runtime() {
        let err = Tokenizer::from_pretrained("", &TokenizerOptions::new());
        assert!(matches!(
            err.unwrap_err(),
            BridgeError::InvalidArgument(_)
        ));
    }

    #[test]
    fn disposed_tokenizer_fails_with_a_state_error() {
        let tokenizer = Tokenizer {
            handle: ObjectHandle::already_disposed(),
        };
        assert!(tokenizer.is_disposed());
        assert!(matches!(
            tokenizer.encode("hello").unwrap_err(),
            BridgeError::Disposed(_)
        ));
    }
}
