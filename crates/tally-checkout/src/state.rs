//! # Session State
//!
//! Holds the one active checkout session behind a lock.
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<Option<...>>>` because:
//! 1. UI commands may arrive concurrently
//! 2. Only one command should touch the session at a time
//! 3. `None` means no checkout is in progress
//!
//! The session itself is single-threaded; this layer serializes access
//! to it rather than making it concurrent.

use std::sync::{Arc, Mutex};

use tracing::info;

use crate::error::{CheckoutError, CheckoutResult};
use crate::session::CheckoutSession;

/// Shared handle to the (at most one) active checkout session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    inner: Arc<Mutex<Option<CheckoutSession>>>,
}

impl SessionState {
    /// Creates the state with no session open.
    pub fn new() -> Self {
        SessionState {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Installs a freshly opened session.
    ///
    /// ## Errors
    /// `SessionActive` if a checkout is already in progress; it must be
    /// finalized or cancelled first.
    pub fn open(&self, session: CheckoutSession) -> CheckoutResult<()> {
        let mut guard = self.inner.lock().expect("session mutex poisoned");
        if guard.is_some() {
            return Err(CheckoutError::SessionActive);
        }
        *guard = Some(session);
        Ok(())
    }

    /// Whether a checkout is in progress.
    pub fn is_open(&self) -> bool {
        self.inner
            .lock()
            .expect("session mutex poisoned")
            .is_some()
    }

    /// Executes a function with read access to the active session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let due = state.with_session(|s| s.remaining_due())?;
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> CheckoutResult<R>
    where
        F: FnOnce(&CheckoutSession) -> CheckoutResult<R>,
    {
        let guard = self.inner.lock().expect("session mutex poisoned");
        match guard.as_ref() {
            Some(session) => f(session),
            None => Err(CheckoutError::NoSession),
        }
    }

    /// Executes a function with write access to the active session.
    pub fn with_session_mut<F, R>(&self, f: F) -> CheckoutResult<R>
    where
        F: FnOnce(&mut CheckoutSession) -> CheckoutResult<R>,
    {
        let mut guard = self.inner.lock().expect("session mutex poisoned");
        match guard.as_mut() {
            Some(session) => f(session),
            None => Err(CheckoutError::NoSession),
        }
    }

    /// Removes and returns the active session (finalize or cancel path).
    /// Recorded payments are discarded with it on cancellation; nothing
    /// was committed anywhere else.
    pub fn close(&self) -> Option<CheckoutSession> {
        let closed = self.inner.lock().expect("session mutex poisoned").take();
        if let Some(session) = &closed {
            info!(session_id = %session.id(), "checkout session closed");
        }
        closed
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
