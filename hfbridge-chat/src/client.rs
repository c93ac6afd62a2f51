//! Async chat client over the text generation pipeline.
//!
//! Pipeline calls are blocking by construction (one call lock around the
//! runtime), so the async surface offloads each request to the blocking
//! thread pool and never holds the lock across an await point.

use async_trait::async_trait;
use futures::Stream;
use hfbridge_core::{BridgeError, CancelToken, ChatMessage, GenerationOptions, Result, Role};
use hfbridge_pipelines::TextGenerationPipeline;
use std::sync::Arc;

/// One streamed unit of assistant output.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatUpdate {
    pub role: Role,
    pub content: String,
}

/// A completed chat turn: the full transcript with the prompt boundary
/// recorded, so replies can be separated from the input.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Full transcript, prompt messages included, in conversation order.
    pub messages: Vec<ChatMessage>,
    prompt_len: usize,
}

impl ChatResponse {
    pub fn new(messages: Vec<ChatMessage>, prompt_len: usize) -> Self {
        Self {
            messages,
            prompt_len,
        }
    }

    /// Messages produced by this turn, prompt excluded.
    pub fn replies(&self) -> &[ChatMessage] {
        &self.messages[self.prompt_len.min(self.messages.len())..]
    }

    /// Concatenated assistant text from this turn.
    pub fn reply_text(&self) -> String {
        self.replies()
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
            .collect()
    }

    /// Render this turn's replies as a sequence of stream updates.
    pub fn to_updates(&self) -> Vec<ChatUpdate> {
        self.replies()
            .iter()
            .map(|m| ChatUpdate {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }
}

/// Stream type alias for chat updates
pub type ChatUpdateStream = dyn Stream<Item = Result<ChatUpdate>> + Send + Unpin;

/// Async chat interface over a loaded generation model.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Run one chat turn to completion.
    async fn respond(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerationOptions,
        cancel: CancelToken,
    ) -> Result<ChatResponse>;

    /// Stream a chat turn. The underlying generation runs to completion
    /// first; updates are synthesized from the finished response.
    async fn stream_response(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerationOptions,
        cancel: CancelToken,
    ) -> Result<Box<ChatUpdateStream>>;
}

/// [`ChatClient`] backed by a shared text generation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineChatClient {
    pipeline: Arc<TextGenerationPipeline>,
}

impl PipelineChatClient {
    pub fn new(pipeline: Arc<TextGenerationPipeline>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Arc<TextGenerationPipeline> {
        &self.pipeline
    }

    async fn run_turn(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerationOptions,
        cancel: CancelToken,
    ) -> Result<ChatResponse> {
        let pipeline = Arc::clone(&self.pipeline);
        let prompt_len = messages.len();
        let transcript = tokio::task::spawn_blocking(move || {
            pipeline.generate_chat_cancellable(&messages, &options, &cancel)
        })
        .await
        .map_err(|e| BridgeError::task(e.to_string()))??;
        tracing::debug!(
            prompt_len,
            total = transcript.len(),
            "chat turn completed"
        );
        Ok(ChatResponse::new(transcript, prompt_len))
    }
}

#[async_trait]
impl ChatClient for PipelineChatClient {
    async fn respond(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerationOptions,
        cancel: CancelToken,
    ) -> Result<ChatResponse> {
        self.run_turn(messages, options, cancel).await
    }

    async fn stream_response(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerationOptions,
        cancel: CancelToken,
    ) -> Result<Box<ChatUpdateStream>> {
        let client = self.clone();
        // Lazy: nothing runs until the caller polls.
        let stream = async_stream::stream! {
            if cancel.is_cancelled() {
                yield Err(BridgeError::cancelled("chat.stream_response"));
                return;
            }
            match client.run_turn(messages, options, cancel).await {
                Ok(response) => {
                    for update in response.to_updates() {
                        yield Ok(update);
                    }
                }
                Err(e) => yield Err(e),
            }
        };
        Ok(Box::new(Box::pin(stream)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn() -> ChatResponse {
        ChatResponse::new(
            vec![
                ChatMessage::system("You are terse."),
                ChatMessage::user("hello"),
                ChatMessage::assistant("hi"),
            ],
            2,
        )
    }

    #[test]
    fn replies_exclude_the_prompt() {
        let response = turn();
        assert_eq!(response.replies().len(), 1);
        assert_eq!(response.replies()[0].content, "hi");
        assert_eq!(response.reply_text(), "hi");
    }

    #[test]
    fn updates_mirror_the_replies_in_order() {
        let updates = turn().to_updates();
        assert_eq!(
            updates,
            vec![ChatUpdate {
                role: Role::Assistant,
                content: "hi".to_string(),
            }]
        );
    }

    #[test]
    fn a_transcript_shorter_than_the_prompt_yields_no_replies() {
        let response = ChatResponse::new(vec![ChatMessage::user("hello")], 3);
        assert!(response.replies().is_empty());
        assert!(response.reply_text().is_empty());
    }
}
