//! # hfbridge-core
//!
//! Runtime bridge and shared types for driving Hugging Face transformers
//! from Rust through an embedded Python interpreter.
//!
//! The bridge owns the interpreter's lifecycle process-wide, serializes
//! every call that crosses the language boundary, and converts the buffers
//! and records coming back into checked, typed values. Higher layers
//! (`hfbridge-pipelines`, `hfbridge-chat`) build the task-specific facade on
//! top of it.

pub mod cancel;
pub mod error;
pub mod runtime;
pub mod tensor;
pub mod types;

pub use cancel::CancelToken;
pub use error::{BridgeError, Result};
pub use runtime::{RuntimeBridge, RuntimeEnv, ENV_ROOT_VAR};
pub use tensor::{narrow, TensorBuffer, TensorView2};
pub use types::{ChatMessage, Dtype, GenerationOptions, ImageInput, PixelMode, Role};
