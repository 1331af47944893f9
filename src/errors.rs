//! Error types for the flakeguard recovery engine
//!
//! Every failure raised by a session collaborator is expressed as a
//! `SessionError` variant so the triage path never depends on a
//! concrete driver's exception hierarchy.

use thiserror::Error;

/// Failure raised by a session operation or collaborator
#[derive(Error, Debug)]
pub enum SessionError {
    /// Operation exceeded its deadline
    #[error("Operation '{operation}' timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// Element lookup failed
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Element handle no longer attached to the page
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    /// Click target was obscured by another element
    #[error("Click intercepted: {0}")]
    ClickIntercepted(String),

    /// Network-level failure between engine and session
    #[error("Connection error: {0}")]
    Connection(String),

    /// The driver/session itself is unusable
    #[error("Session failure: {0}")]
    SessionFailure(String),

    /// In-page script evaluation failed
    #[error("Script error: {0}")]
    Script(String),

    /// Navigation request was rejected or never completed
    #[error("Navigation failed for '{locator}': {reason}")]
    Navigation { locator: String, reason: String },

    /// I/O errors (artifact capture, log reads)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failures from outside the known taxonomy. The message passes
    /// through untouched so classification sees the original text.
    #[error("{0}")]
    Other(String),
}

impl SessionError {
    /// Stable failure-kind name, used as `FailureContext.error_type`
    /// and as the fallback key in the classifier's type table.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::Timeout { .. } => "Timeout",
            SessionError::ElementNotFound(_) => "ElementNotFound",
            SessionError::StaleElement(_) => "StaleElement",
            SessionError::ClickIntercepted(_) => "ClickIntercepted",
            SessionError::Connection(_) => "Connection",
            SessionError::SessionFailure(_) => "SessionFailure",
            SessionError::Script(_) => "Script",
            SessionError::Navigation { .. } => "Navigation",
            SessionError::Io(_) => "Io",
            SessionError::Serialization(_) => "Serialization",
            SessionError::Other(_) => "Other",
        }
    }

    /// Coarse retryability hint for `BoundedRetry` callers.
    ///
    /// Transient failures may resolve on a plain re-invocation;
    /// everything else needs an actual recovery strategy.
    pub fn is_transient(&self) -> bool {
        match self {
            SessionError::Timeout { .. } => true,
            SessionError::StaleElement(_) => true,
            SessionError::ClickIntercepted(_) => true,
            SessionError::Connection(_) => true,

            SessionError::ElementNotFound(_) => false,
            SessionError::SessionFailure(_) => false,
            SessionError::Script(_) => false,
            SessionError::Navigation { .. } => false,
            SessionError::Io(_) => false,
            SessionError::Serialization(_) => false,
            SessionError::Other(_) => false,
        }
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Convert anyhow errors to SessionError
impl From<anyhow::Error> for SessionError {
    fn from(err: anyhow::Error) -> Self {
        SessionError::Other(err.to_string())
    }
}
