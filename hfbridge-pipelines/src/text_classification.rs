//! Text classification pipeline.

use crate::pipeline::{Pipeline, PipelineOptions, Task};
use crate::record;
use crate::tokenizer::Tokenizer;
use hfbridge_core::{BridgeError, Result};
use pyo3::prelude::*;
use pyo3::types::PyList;
use serde::{Deserialize, Serialize};

/// One classification result: label plus confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

/// Pipeline bound to the `text-classification` task.
#[derive(Debug)]
pub struct TextClassificationPipeline {
    inner: Pipeline,
}

impl TextClassificationPipeline {
    pub fn from_model(model: &str, options: &PipelineOptions) -> Result<Self> {
        Ok(Self {
            inner: Pipeline::load(Task::TextClassification, model, options)?,
        })
    }

    /// Classify a single input.
    pub fn classify(&self, input: &str) -> Result<Vec<Classification>> {
        let operation = "text_classification.classify";
        self.inner.with(operation, |_py, pipeline| {
            let result = pipeline.call1((input,))?;
            extract_classifications(operation, &result)
        })
    }

    /// Classify an ordered batch as one batched runtime call.
    ///
    /// Result `i` corresponds to input `i`; the runtime returning a
    /// different count is a contract violation.
    pub fn classify_batch(&self, inputs: &[String]) -> Result<Vec<Classification>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let operation = "text_classification.classify_batch";
        let expected = inputs.len();
        self.inner.with(operation, |py, pipeline| {
            let batch = PyList::new(py, inputs)?;
            let result = pipeline.call1((batch,))?;
            let results = extract_classifications(operation, &result)?;
            if results.len() != expected {
                return Err(BridgeError::contract(
                    operation,
                    format!("{expected} inputs produced {} results", results.len()),
                ));
            }
            Ok(results)
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

pub(crate) fn extract_classifications(
    operation: &'static str,
    value: &Bound<'_, PyAny>,
) -> Result<Vec<Classification>> {
    let records = record::as_record_list(operation, value)?;
    records
        .iter()
        .map(|item| {
            Ok(Classification {
                label: record::require_str(operation, &item, "label")?,
                score: record::require_f64(operation, &item, "score")?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineOptions;

    #[test]
    fn empty_model_is_rejected_before_the_runtime() {
        let err = TextClassificationPipeline::from_model("", &PipelineOptions::new());
        assert!(matches!(
            err.unwrap_err(),
            BridgeError::InvalidArgument(_)
        ));
    }
}
