//! Error types for bridge operations.

/// The main error type for operations crossing into the embedded runtime.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The embedded runtime environment could not be constructed
    #[error("Runtime initialization failed: {0}")]
    Initialization(String),

    /// Filesystem errors during environment bootstrap
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller-supplied value outside the accepted set, rejected before any
    /// runtime call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A named pretrained artifact could not be loaded
    #[error("Failed to load model '{model}': {message}")]
    ModelLoad { model: String, message: String },

    /// The runtime returned a shape, rank, or key set the facade does not
    /// recognize
    #[error("Result contract violation in '{operation}': {message}")]
    Contract { operation: String, message: String },

    /// Operation invoked on a handle after disposal
    #[error("Operation '{0}' invoked on a disposed handle")]
    Disposed(String),

    /// A wide numeric value returned by the runtime does not fit the target
    /// field type
    #[error("Value {value} for '{field}' does not fit in {target}")]
    NarrowingOverflow {
        field: &'static str,
        value: i64,
        target: &'static str,
    },

    /// Cancellation observed before the call entered the runtime
    #[error("Operation '{0}' cancelled before entering the runtime")]
    Cancelled(String),

    /// Error raised inside the embedded interpreter
    #[error("Python error: {0}")]
    Python(String),

    /// Background worker failures (e.g. a blocking task panicked)
    #[error("Task error: {0}")]
    Task(String),
}

impl BridgeError {
    /// Create an initialization error
    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a model load error
    pub fn model_load(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelLoad {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Create a result contract violation error
    pub fn contract(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Contract {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a disposed handle error
    pub fn disposed(operation: impl Into<String>) -> Self {
        Self::Disposed(operation.into())
    }

    /// Create a cancellation error
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled(operation.into())
    }

    /// Create a task error
    pub fn task(msg: impl Into<String>) -> Self {
        Self::Task(msg.into())
    }
}

impl From<pyo3::PyErr> for BridgeError {
    fn from(err: pyo3::PyErr) -> Self {
        Self::Python(err.to_string())
    }
}

/// Result alias used throughout the bridge crates.
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_error_names_operation_and_message() {
        let err = BridgeError::contract("detect", "missing record key 'box'");
        assert_eq!(
            err.to_string(),
            "Result contract violation in 'detect': missing record key 'box'"
        );
    }

    #[test]
    fn overflow_error_carries_offending_value() {
        let err = BridgeError::NarrowingOverflow {
            field: "xmin",
            value: i64::MAX,
            target: "i32",
        };
        let msg = err.to_string();
        assert!(msg.contains("xmin"));
        assert!(msg.contains(&i64::MAX.to_string()));
    }
}
