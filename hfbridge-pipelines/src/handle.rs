//! Owned references to runtime-resident objects.

use hfbridge_core::{BridgeError, CancelToken, Result, RuntimeBridge};
use pyo3::prelude::*;

/// Exclusive owner of a runtime-resident object reference.
///
/// Disposal releases the runtime-side reference under the bridge's call
/// lock; any further use is a state error. Not shared, not reference-counted
/// on the host side.
#[derive(Debug)]
pub(crate) struct ObjectHandle {
    object: Option<Py<PyAny>>,
}

impl ObjectHandle {
    pub(crate) fn new(object: Py<PyAny>) -> Self {
        Self {
            object: Some(object),
        }
    }

    #[cfg(test)]
    pub(crate) fn already_disposed() -> Self {
        Self { object: None }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.object.is_none()
    }

    /// Run one call against the owned object, rejecting disposed handles
    /// before entering the runtime.
    pub(crate) fn with<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(Python<'_>, &Bound<'_, PyAny>) -> Result<R>,
    ) -> Result<R> {
        let object = self
            .object
            .as_ref()
            .ok_or_else(|| BridgeError::disposed(operation))?;
        RuntimeBridge::acquire()?.enter(operation, |py| f(py, object.bind(py)))
    }

    /// Like [`with`](ObjectHandle::with), but observes a cancellation token
    /// before the call enters the runtime.
    pub(crate) fn with_cancellable<R>(
        &self,
        operation: &'static str,
        cancel: &CancelToken,
        f: impl FnOnce(Python<'_>, &Bound<'_, PyAny>) -> Result<R>,
    ) -> Result<R> {
        let object = self
            .object
            .as_ref()
            .ok_or_else(|| BridgeError::disposed(operation))?;
        RuntimeBridge::acquire()?.enter_cancellable(operation, cancel, |py| f(py, object.bind(py)))
    }

    /// Release the runtime-side reference. Idempotent.
    pub(crate) fn dispose(&mut self, operation: &'static str) -> Result<()> {
        if let Some(object) = self.object.take() {
            RuntimeBridge::acquire()?.enter(operation, |py| {
                drop(object.into_bound(py));
                Ok(())
            })?;
        }
        Ok(())
    }
}

impl Drop for ObjectHandle {
    fn drop(&mut self) {
        // Best effort; pyo3 defers the reference release when the bridge is
        // already gone.
        if let Some(object) = self.object.take() {
            if let Ok(bridge) = RuntimeBridge::acquire() {
                let _ = bridge.enter("handle.drop", |py| {
                    drop(object.into_bound(py));
                    Ok(())
                });
            }
        }
    }
}
