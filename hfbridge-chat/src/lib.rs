//! Async client adapters over the typed pipeline facades.
//!
//! Each adapter wraps a shared pipeline behind a small async trait, running
//! the blocking runtime call on the blocking thread pool. Streaming is
//! synthesized: the generation runs to completion and the finished response
//! is replayed as a lazy update stream.

pub mod client;
pub mod embeddings;
pub mod speech;

pub use client::{ChatClient, ChatResponse, ChatUpdate, ChatUpdateStream, PipelineChatClient};
pub use embeddings::{EmbeddingClient, EmbeddingGenerator};
pub use speech::{SpeechToText, SpeechToTextClient};
