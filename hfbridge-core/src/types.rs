//! Core types crossing the runtime boundary.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};

/// Chat message role.
///
/// The role vocabulary is a fixed bijection with the runtime's role strings;
/// anything outside it is rejected before a runtime call is made.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    /// The wire string understood by the runtime's chat templates
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }

    /// Parse a role string, rejecting anything outside the fixed vocabulary
    pub fn parse(role: &str) -> Result<Self> {
        match role {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "tool" => Ok(Role::Tool),
            other => Err(BridgeError::invalid_argument(format!(
                "unknown chat role: '{other}'"
            ))),
        }
    }
}

/// Message in a conversation. Order within a conversation is meaningful and
/// preserved through marshaling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create a new assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// Create a new system message
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }
}

/// Text generation knobs.
///
/// An absent option means "use the runtime default"; the corresponding kwarg
/// is omitted from the call entirely rather than sent as zero/false.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_new_tokens: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_new_tokens: Option<i64>,

    /// Stop sequences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_strings: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_p: Option<f64>,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max new tokens
    pub fn with_max_new_tokens(mut self, max_new_tokens: i64) -> Self {
        self.max_new_tokens = Some(max_new_tokens);
        self
    }

    /// Set min new tokens
    pub fn with_min_new_tokens(mut self, min_new_tokens: i64) -> Self {
        self.min_new_tokens = Some(min_new_tokens);
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set top-k sampling
    pub fn with_top_k(mut self, top_k: i64) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Set top-p sampling
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set min-p sampling
    pub fn with_min_p(mut self, min_p: f64) -> Self {
        self.min_p = Some(min_p);
        self
    }

    /// Set stop sequences
    pub fn with_stop_strings(mut self, stop_strings: Vec<String>) -> Self {
        self.stop_strings = Some(stop_strings);
        self
    }
}

/// Numeric precision for model weights, mapped 1:1 to the runtime's native
/// dtype names (https://pytorch.org/docs/stable/tensor_attributes.html).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Float32,
    Float64,
    Complex64,
    Complex128,
    Float16,
    BFloat16,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Bool,
}

impl Dtype {
    /// The runtime's native dtype name
    pub fn as_torch_name(&self) -> &'static str {
        match self {
            Dtype::Float32 => "float32",
            Dtype::Float64 => "float64",
            Dtype::Complex64 => "complex64",
            Dtype::Complex128 => "complex128",
            Dtype::Float16 => "float16",
            Dtype::BFloat16 => "bfloat16",
            Dtype::UInt8 => "uint8",
            Dtype::UInt16 => "uint16",
            Dtype::UInt32 => "uint32",
            Dtype::UInt64 => "uint64",
            Dtype::Int8 => "int8",
            Dtype::Int16 => "int16",
            Dtype::Int32 => "int32",
            Dtype::Int64 => "int64",
            Dtype::Bool => "bool",
        }
    }

    /// Parse a dtype name, rejecting anything outside the fixed set
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "float32" => Ok(Dtype::Float32),
            "float64" => Ok(Dtype::Float64),
            "complex64" => Ok(Dtype::Complex64),
            "complex128" => Ok(Dtype::Complex128),
            "float16" => Ok(Dtype::Float16),
            "bfloat16" => Ok(Dtype::BFloat16),
            "uint8" => Ok(Dtype::UInt8),
            "uint16" => Ok(Dtype::UInt16),
            "uint32" => Ok(Dtype::UInt32),
            "uint64" => Ok(Dtype::UInt64),
            "int8" => Ok(Dtype::Int8),
            "int16" => Ok(Dtype::Int16),
            "int32" => Ok(Dtype::Int32),
            "int64" => Ok(Dtype::Int64),
            "bool" => Ok(Dtype::Bool),
            other => Err(BridgeError::invalid_argument(format!(
                "unknown dtype: '{other}'"
            ))),
        }
    }
}

/// Channel layout of a raw image buffer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PixelMode {
    Rgb,
    Greyscale,
}

impl PixelMode {
    /// The runtime-native channel-mode string (PIL mode)
    pub fn as_channel_mode(&self) -> &'static str {
        match self {
            PixelMode::Rgb => "RGB",
            PixelMode::Greyscale => "L",
        }
    }
}

/// Raw image input: byte buffer plus explicit dimensions and channel layout.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub pixel_mode: PixelMode,
}

impl ImageInput {
    pub fn new(bytes: Vec<u8>, width: u32, height: u32, pixel_mode: PixelMode) -> Self {
        Self {
            bytes,
            width,
            height,
            pixel_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_bijection_round_trips() {
        for role in [Role::System, Role::User, Role::Assistant, Role::Tool] {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_an_argument_error() {
        let err = Role::parse("narrator").unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
        assert!(err.to_string().contains("narrator"));
    }

    #[test]
    fn dtype_names_round_trip() {
        let names = [
            "float32",
            "float64",
            "complex64",
            "complex128",
            "float16",
            "bfloat16",
            "uint8",
            "uint16",
            "uint32",
            "uint64",
            "int8",
            "int16",
            "int32",
            "int64",
            "bool",
        ];
        for name in names {
            assert_eq!(Dtype::from_name(name).unwrap().as_torch_name(), name);
        }
        assert!(Dtype::from_name("float8").is_err());
    }

    #[test]
    fn absent_generation_options_stay_absent() {
        let opts = GenerationOptions::new().with_temperature(0.7);
        assert_eq!(opts.temperature, Some(0.7));
        assert_eq!(opts.top_k, None);
        assert_eq!(opts.max_new_tokens, None);

        let json = serde_json::to_value(&opts).unwrap();
        assert!(json.get("top_k").is_none());
    }

    #[test]
    fn pixel_modes_map_to_channel_strings() {
        assert_eq!(PixelMode::Rgb.as_channel_mode(), "RGB");
        assert_eq!(PixelMode::Greyscale.as_channel_mode(), "L");
    }
}
