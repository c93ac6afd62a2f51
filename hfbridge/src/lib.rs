//! # hfbridge
//!
//! Typed facades and async clients over an embedded model runtime.
//!
//! hfbridge lets a Rust host load pretrained model pipelines into an
//! embedded Python interpreter and drive them through plain Rust types:
//! strings, structs, and numeric buffers in; typed results or typed errors
//! out. The interpreter is an implementation detail behind one process-wide
//! bridge with a single call lock.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! hfbridge = { version = "0.1", features = ["pipelines"] }
//! ```
//!
//! ```ignore
//! use hfbridge::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let pipeline = TextClassificationPipeline::from_model(
//!         "distilbert/distilbert-base-uncased-finetuned-sst-2-english",
//!         &PipelineOptions::new(),
//!     )?;
//!     for scored in pipeline.classify("I love programming!")? {
//!         println!("{}: {:.3}", scored.label, scored.score);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Includes `pipelines` and `chat`
//! - `pipelines`: Task pipeline facades (classification, generation, ...)
//! - `chat`: Async chat, embedding, and transcription clients
//! - `full`: All features enabled

// Re-export core types and traits
pub use hfbridge_core::*;

// Re-export pipeline facades under `pipelines` module
#[cfg(feature = "pipelines")]
pub mod pipelines {
    //! Typed task pipeline facades.
    pub use hfbridge_pipelines::*;
}

// Re-export async clients under `chat` module
#[cfg(feature = "chat")]
pub mod chat {
    //! Async chat, embedding, and transcription clients.
    pub use hfbridge_chat::*;
}

// Convenience re-exports at root level for common types
#[cfg(feature = "pipelines")]
pub use hfbridge_pipelines::{
    AutomaticSpeechRecognitionPipeline, Classification, Detection, DetectionBox, DetectionParams,
    ImageClassificationParams, ImageClassificationPipeline, ObjectDetectionPipeline,
    PipelineOptions, SentenceTransformer, SentenceTransformerOptions, Task,
    TextClassificationPipeline, TextGenerationPipeline, TextToAudioPipeline, Tokenizer,
    TokenizerOptions,
};

#[cfg(feature = "chat")]
pub use hfbridge_chat::{ChatClient, ChatResponse, ChatUpdate, PipelineChatClient};

/// Prelude module for convenient imports
pub mod prelude {
    //! Prelude module containing the most commonly used types and traits.
    //!
    //! ```
    //! use hfbridge::prelude::*;
    //! ```

    pub use crate::{
        BridgeError, CancelToken, ChatMessage, Dtype, GenerationOptions, Result, Role,
        RuntimeBridge,
    };

    #[cfg(feature = "pipelines")]
    pub use crate::pipelines::*;

    #[cfg(feature = "chat")]
    pub use crate::chat::*;
}
