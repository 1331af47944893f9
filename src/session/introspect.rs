//! Best-effort session introspection
//!
//! Context building must never hang or abort on a sick session, so
//! every read here is bounded by a short timeout and degrades to a
//! placeholder instead of returning an error.

use crate::session::SessionHandle;
use std::time::Duration;
use tracing::debug;

/// Placeholder used when the current locator cannot be read
pub const UNKNOWN_LOCATOR: &str = "unknown";

/// Current locator, or `"unknown"` if the read fails or exceeds `timeout`
pub async fn locator_or_unknown(session: &dyn SessionHandle, timeout: Duration) -> String {
    match tokio::time::timeout(timeout, session.current_locator()).await {
        Ok(Ok(locator)) => locator,
        Ok(Err(e)) => {
            debug!(error = %e, "current_locator failed during context build");
            UNKNOWN_LOCATOR.to_string()
        }
        Err(_) => {
            debug!(timeout_ms = timeout.as_millis() as u64, "current_locator timed out");
            UNKNOWN_LOCATOR.to_string()
        }
    }
}

/// Session log lines, or `None` if the read fails or exceeds `timeout`
pub async fn log_or_none(session: &dyn SessionHandle, timeout: Duration) -> Option<Vec<String>> {
    match tokio::time::timeout(timeout, session.session_log()).await {
        Ok(Ok(lines)) => Some(lines),
        Ok(Err(e)) => {
            debug!(error = %e, "session_log failed during context build");
            None
        }
        Err(_) => {
            debug!(timeout_ms = timeout.as_millis() as u64, "session_log timed out");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mock::MockSession;

    #[tokio::test]
    async fn test_locator_read_success() {
        let session = MockSession::new().with_locator("https://app.example.com/orders");
        let locator = locator_or_unknown(&session, Duration::from_millis(100)).await;
        assert_eq!(locator, "https://app.example.com/orders");
    }

    #[tokio::test]
    async fn test_locator_degrades_on_failure() {
        let session = MockSession::new().fail_introspection();
        let locator = locator_or_unknown(&session, Duration::from_millis(100)).await;
        assert_eq!(locator, UNKNOWN_LOCATOR);
    }

    #[tokio::test]
    async fn test_locator_degrades_on_timeout() {
        let session = MockSession::new().with_introspection_delay(Duration::from_secs(5));
        let locator = locator_or_unknown(&session, Duration::from_millis(20)).await;
        assert_eq!(locator, UNKNOWN_LOCATOR);
    }

    #[tokio::test]
    async fn test_log_read_success() {
        let session =
            MockSession::new().with_log(vec!["console: loaded".to_string()]);
        let log = log_or_none(&session, Duration::from_millis(100)).await;
        assert_eq!(log.unwrap(), vec!["console: loaded".to_string()]);
    }

    #[tokio::test]
    async fn test_log_degrades_to_none() {
        let session = MockSession::new().fail_introspection();
        let log = log_or_none(&session, Duration::from_millis(100)).await;
        assert!(log.is_none());
    }
}
