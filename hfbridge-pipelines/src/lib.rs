//! Typed facades over runtime-resident model pipelines.
//!
//! Each task gets a dedicated wrapper owning one runtime object: load it by
//! model name, call its operations with plain host types, dispose it when
//! done. All runtime access funnels through the bridge's call lock; values
//! crossing the boundary are validated eagerly so failures surface as typed
//! errors at the call site.

mod handle;
mod record;

pub mod image_classification;
pub mod object_detection;
pub mod pipeline;
pub mod sentence_transformer;
pub mod speech_recognition;
pub mod text_classification;
pub mod text_generation;
pub mod text_to_audio;
pub mod tokenizer;

pub use image_classification::{ImageClassificationParams, ImageClassificationPipeline};
pub use object_detection::{Detection, DetectionBox, DetectionParams, ObjectDetectionPipeline};
pub use pipeline::{Pipeline, PipelineOptions, Task};
pub use sentence_transformer::{SentenceTransformer, SentenceTransformerOptions};
pub use speech_recognition::AutomaticSpeechRecognitionPipeline;
pub use text_classification::{Classification, TextClassificationPipeline};
pub use text_generation::TextGenerationPipeline;
pub use text_to_audio::{AudioResult, TextToAudioPipeline};
pub use tokenizer::{Tokenizer, TokenizerOptions};
