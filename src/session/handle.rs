//! Collaborator traits at the session boundary
//!
//! The engine never talks to a concrete automation driver. Everything
//! it needs from the outside world is expressed through these three
//! narrow traits, injected at construction time.

use crate::errors::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Boxed session handle, owned by the caller for the duration of a
/// recovery. `RestartSession` swaps the box contents in place.
pub type SessionBox = Box<dyn SessionHandle>;

/// Handle to one live interactive session (e.g. an open browser page)
#[async_trait]
pub trait SessionHandle: Send + Sync {
    /// Reload the current resource
    async fn reload(&mut self) -> Result<()>;

    /// Navigate to a new resource locator
    async fn navigate_to(&mut self, locator: &str) -> Result<()>;

    /// Current resource locator (page URL / session target)
    async fn current_locator(&self) -> Result<String>;

    /// Block until the session reports ready, up to `timeout`.
    /// Returns `Ok(false)` when the deadline passes without readiness.
    async fn is_ready(&self, timeout: Duration) -> Result<bool>;

    /// Ordered session/console log lines accumulated so far
    async fn session_log(&self) -> Result<Vec<String>>;

    /// Tear the session down
    async fn close(&mut self) -> Result<()>;
}

/// Factory for replacement sessions, required only by the
/// `RestartSession` strategy
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Construct a brand-new session handle
    async fn create(&self) -> Result<SessionBox>;
}

/// Diagnostic artifact capture (e.g. screenshots)
///
/// Failures here are never fatal: the facade logs them and carries on
/// with an artifact-less context.
#[async_trait]
pub trait DiagnosticCapture: Send + Sync {
    /// Capture an artifact for the failing operation, returning its path
    async fn capture(&self, session: &dyn SessionHandle, operation_name: &str)
        -> Result<PathBuf>;
}
