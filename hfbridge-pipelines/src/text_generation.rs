//! Text generation pipeline, including the chat-template invocation used by
//! the chat adapter.

use crate::pipeline::{Pipeline, PipelineOptions, Task};
use crate::record;
use crate::tokenizer::Tokenizer;
use hfbridge_core::{BridgeError, CancelToken, ChatMessage, GenerationOptions, Result, Role};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

/// Pipeline bound to the `text-generation` task.
#[derive(Debug)]
pub struct TextGenerationPipeline {
    inner: Pipeline,
}

impl TextGenerationPipeline {
    pub fn from_model(model: &str, options: &PipelineOptions) -> Result<Self> {
        Ok(Self {
            inner: Pipeline::load(Task::TextGeneration, model, options)?,
        })
    }

    /// Continue a plain text prompt.
    pub fn generate(&self, prompt: &str) -> Result<Vec<String>> {
        let operation = "text_generation.generate";
        self.inner.with(operation, |_py, pipeline| {
            let result = pipeline.call1((prompt,))?;
            let records = record::as_record_list(operation, &result)?;
            records
                .iter()
                .map(|item| record::require_str(operation, &item, "generated_text"))
                .collect()
        })
    }

    /// Run an ordered conversation through the model's chat template and
    /// return the resulting message list, assistant reply included. Order is
    /// preserved in both directions.
    pub fn generate_chat(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<Vec<ChatMessage>> {
        self.generate_chat_inner(messages, options, None)
    }

    /// Cancellable variant; the token is honored only before the call enters
    /// the runtime.
    pub fn generate_chat_cancellable(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
        cancel: &CancelToken,
    ) -> Result<Vec<ChatMessage>> {
        self.generate_chat_inner(messages, options, Some(cancel))
    }

    fn generate_chat_inner(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<ChatMessage>> {
        if messages.is_empty() {
            return Err(BridgeError::invalid_argument(
                "conversation must contain at least one message",
            ));
        }
        let operation = "text_generation.generate_chat";
        let options = options.clone();

        let call = move |py: Python<'_>, pipeline: &Bound<'_, PyAny>| -> Result<Vec<ChatMessage>> {
            let wire = messages_to_wire(py, messages)?;
            let kwargs = generation_kwargs(py, &options)?;
            let result = pipeline.call((wire,), Some(&kwargs))?;

            let generations = record::as_record_list(operation, &result)?;
            if generations.is_empty() {
                return Err(BridgeError::contract(
                    operation,
                    "runtime returned no generations",
                ));
            }
            let generated = record::require(operation, &generations.get_item(0)?, "generated_text")?;
            let replies = record::as_record_list(operation, &generated)?;
            replies
                .iter()
                .map(|reply| {
                    let role = record::require_str(operation, &reply, "role")?;
                    let role = Role::parse(&role).map_err(|_| {
                        BridgeError::contract(
                            operation,
                            format!("runtime returned unknown role '{role}'"),
                        )
                    })?;
                    let content = record::require_str(operation, &reply, "content")?;
                    Ok(ChatMessage::new(role, content))
                })
                .collect()
        };

        match cancel {
            Some(token) => self.inner.with_cancellable(operation, token, call),
            None => self.inner.with(operation, call),
        }
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

fn messages_to_wire<'py>(py: Python<'py>, messages: &[ChatMessage]) -> Result<Bound<'py, PyList>> {
    let items = messages
        .iter()
        .map(|message| {
            let item = PyDict::new(py);
            item.set_item("role", message.role.as_str())?;
            item.set_item("content", &message.content)?;
            Ok(item)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(PyList::new(py, items)?)
}

fn generation_kwargs<'py>(
    py: Python<'py>,
    options: &GenerationOptions,
) -> Result<Bound<'py, PyDict>> {
    let kwargs = PyDict::new(py);
    if let Some(max_length) = options.max_length {
        kwargs.set_item("max_length", max_length)?;
    }
    if let Some(max_new_tokens) = options.max_new_tokens {
        kwargs.set_item("max_new_tokens", max_new_tokens)?;
    }
    if let Some(min_length) = options.min_length {
        kwargs.set_item("min_length", min_length)?;
    }
    if let Some(min_new_tokens) = options.min_new_tokens {
        kwargs.set_item("min_new_tokens", min_new_tokens)?;
    }
    if let Some(stop_strings) = &options.stop_strings {
        kwargs.set_item("stop", PyList::new(py, stop_strings)?)?;
    }
    if let Some(temperature) = options.temperature {
        kwargs.set_item("temperature", temperature)?;
    }
    if let Some(top_k) = options.top_k {
        kwargs.set_item("top_k", top_k)?;
    }
    if let Some(top_p) = options.top_p {
        kwargs.set_item("top_p", top_p)?;
    }
    if let Some(min_p) = options.min_p {
        kwargs.set_item("min_p", min_p)?;
    }
    Ok(kwargs)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Argument validation must trigger before the handle is touched, so a
    // pipeline whose handle is already gone works as a probe.
    #[test]
    fn empty_conversation_is_rejected_before_the_runtime() {
        let pipeline = TextGenerationPipeline {
            inner: Pipeline::stub_disposed(),
        };
        let err = pipeline.generate_chat(&[], &GenerationOptions::new());
        assert!(matches!(
            err.unwrap_err(),
            BridgeError::InvalidArgument(_)
        ));
    }

    #[test]
    fn disposed_pipeline_fails_with_a_state_error() {
        let pipeline = TextGenerationPipeline {
            inner: Pipeline::stub_disposed(),
        };
        let err = pipeline.generate_chat(&[ChatMessage::user("hi")], &GenerationOptions::new());
        assert!(matches!(err.unwrap_err(), BridgeError::Disposed(_)));
    }
}
