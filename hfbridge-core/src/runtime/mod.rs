//! Embedded runtime lifecycle: environment bootstrap and the process-wide
//! bridge that serializes every boundary crossing.

mod bridge;
mod env;

pub use bridge::RuntimeBridge;
pub use env::{RuntimeEnv, ENV_ROOT_VAR};
