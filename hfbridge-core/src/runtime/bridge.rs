//! Process-wide singleton owning the embedded interpreter.
//!
//! Exactly one `RuntimeBridge` exists per process. Every call that crosses
//! into the interpreter holds the bridge's call lock for the duration of
//! that single call: the runtime is not assumed safe for concurrent entry,
//! so serialization here is the correctness boundary, not an optimization.

use crate::cancel::CancelToken;
use crate::error::{BridgeError, Result};
use crate::runtime::env::RuntimeEnv;
use once_cell::sync::OnceCell;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

static BRIDGE: OnceCell<RuntimeBridge> = OnceCell::new();

/// Handle to the embedded runtime.
///
/// Lazily constructed on first [`acquire`](RuntimeBridge::acquire);
/// construction either fully succeeds or leaves the singleton uninitialized
/// with the error propagated to the caller that triggered it.
pub struct RuntimeBridge {
    env: RuntimeEnv,
    python_version: String,
    call_lock: Mutex<()>,
    disposed: AtomicBool,
}

impl RuntimeBridge {
    /// Get the process-wide runtime, initializing it at most once.
    ///
    /// Concurrent first callers block on a single initialization rather than
    /// racing. Initialization failure is not retried automatically.
    pub fn acquire() -> Result<&'static RuntimeBridge> {
        BRIDGE.get_or_try_init(RuntimeBridge::initialize)
    }

    fn initialize() -> Result<RuntimeBridge> {
        let env = RuntimeEnv::resolve();
        tracing::info!(root = %env.root().display(), "initializing embedded runtime");
        env.ensure()?;
        let site_packages = env.site_packages()?;

        let python_version = Python::with_gil(|py| -> Result<String> {
            let sys = py.import("sys")?;
            sys.getattr("path")?
                .call_method1("insert", (0, site_packages.to_string_lossy().into_owned()))?;
            let version: String = sys.getattr("version")?.extract()?;
            Ok(version)
        })?;

        tracing::info!(%python_version, "embedded runtime ready");
        Ok(RuntimeBridge {
            env,
            python_version,
            call_lock: Mutex::new(()),
            disposed: AtomicBool::new(false),
        })
    }

    /// Version string of the embedded interpreter.
    pub fn python_version(&self) -> &str {
        &self.python_version
    }

    /// The resolved isolated environment.
    pub fn environment(&self) -> &RuntimeEnv {
        &self.env
    }

    /// Run one call against the runtime, holding the call lock for its
    /// duration.
    pub fn enter<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(Python<'_>) -> Result<R>,
    ) -> Result<R> {
        self.enter_inner(operation, None, f)
    }

    /// Like [`enter`](RuntimeBridge::enter), but observes a cancellation
    /// token before the call starts. Once the callback is running, the call
    /// is not preemptible.
    pub fn enter_cancellable<R>(
        &self,
        operation: &'static str,
        cancel: &CancelToken,
        f: impl FnOnce(Python<'_>) -> Result<R>,
    ) -> Result<R> {
        self.enter_inner(operation, Some(cancel), f)
    }

    fn enter_inner<R>(
        &self,
        operation: &'static str,
        cancel: Option<&CancelToken>,
        f: impl FnOnce(Python<'_>) -> Result<R>,
    ) -> Result<R> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(BridgeError::disposed(operation));
        }
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(BridgeError::cancelled(operation));
            }
        }

        let _guard = self
            .call_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if self.disposed.load(Ordering::SeqCst) {
            return Err(BridgeError::disposed(operation));
        }
        if let Some(token) = cancel {
            // Last safe boundary; after this the call runs to completion.
            if token.is_cancelled() {
                return Err(BridgeError::cancelled(operation));
            }
        }

        let start = Instant::now();
        let result = Python::with_gil(|py| f(py));
        match &result {
            Ok(_) => {
                tracing::debug!(operation, elapsed = ?start.elapsed(), "runtime call complete")
            }
            Err(e) => {
                tracing::debug!(operation, error = %e, elapsed = ?start.elapsed(), "runtime call failed")
            }
        }
        result
    }

    /// Tear the bridge down. After disposal every further call fails fast
    /// rather than silently reinitializing. In-flight calls are allowed to
    /// finish first.
    ///
    /// The interpreter itself stays resident until process exit; finalizing
    /// an embedded interpreter while other host threads may still hold
    /// references into it is not sound.
    pub fn dispose(&self) {
        let _guard = self
            .call_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.disposed.store(true, Ordering::SeqCst);
        tracing::info!("runtime bridge disposed; further calls will fail fast");
    }

    /// Forward a credential token to the runtime's remote-artifact
    /// authentication. Pass-through, synchronous, no local validation beyond
    /// non-emptiness.
    pub fn login(&self, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(BridgeError::invalid_argument("login token must not be empty"));
        }
        self.enter("login", |py| {
            let hub = py.import("huggingface_hub")?;
            let kwargs = PyDict::new(py);
            kwargs.set_item("token", token)?;
            hub.getattr("login")?.call((), Some(&kwargs))?;
            Ok(())
        })
    }

    #[cfg(test)]
    fn stub() -> RuntimeBridge {
        RuntimeBridge {
            env: RuntimeEnv::from_root("/tmp/hfbridge-test"),
            python_version: "stub".to_string(),
            call_lock: Mutex::new(()),
            disposed: AtomicBool::new(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_before_the_lock_prevents_the_call() {
        let bridge = RuntimeBridge::stub();
        let token = CancelToken::new();
        token.cancel();

        let result: Result<()> = bridge.enter_cancellable("classify", &token, |_py| {
            panic!("the callback must never run for a cancelled call")
        });
        assert!(matches!(result.unwrap_err(), BridgeError::Cancelled(_)));
    }

    #[test]
    fn disposed_bridge_fails_fast() {
        let bridge = RuntimeBridge::stub();
        bridge.dispose();

        let result: Result<()> = bridge.enter("classify", |_py| {
            panic!("the callback must never run after disposal")
        });
        assert!(matches!(result.unwrap_err(), BridgeError::Disposed(_)));
    }

    #[test]
    fn empty_login_token_is_rejected_before_the_runtime() {
        let bridge = RuntimeBridge::stub();
        let result = bridge.login("  ");
        assert!(matches!(result.unwrap_err(), BridgeError::InvalidArgument(_)));
    }
}
