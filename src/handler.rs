//! Error handler facade
//!
//! Single entry point tying the engine together: build a failure
//! context, capture a diagnostic, classify, resolve an action, execute
//! it, and hand the caller one boolean. The original error stays the
//! caller's to re-raise or swallow based on that boolean.

use crate::classifier::ErrorClassifier;
use crate::config::EngineConfig;
use crate::errors::SessionError;
use crate::recovery::{FailureContext, RecoveryAction, RecoveryExecutor, RecoveryLedger};
use crate::session::{
    locator_or_unknown, log_or_none, DiagnosticCapture, SessionBox, SessionFactory, SessionHandle,
};
use std::sync::Arc;
use tracing::warn;

/// Orchestrates triage and recovery for one failure at a time
///
/// One in-flight `handle` call per session handle is the caller's
/// responsibility (the `&mut` borrow enforces it naturally); the
/// ledger behind the executor is safe for many concurrent facades.
pub struct ErrorHandlerFacade {
    classifier: ErrorClassifier,
    executor: RecoveryExecutor,
    config: EngineConfig,
    capture: Option<Arc<dyn DiagnosticCapture>>,
}

impl ErrorHandlerFacade {
    pub fn new(config: EngineConfig, ledger: RecoveryLedger) -> Self {
        Self {
            classifier: ErrorClassifier::new(),
            executor: RecoveryExecutor::new(ledger),
            config,
            capture: None,
        }
    }

    /// Enable the `restart_session` strategy
    pub fn with_session_factory(mut self, factory: Arc<dyn SessionFactory>) -> Self {
        self.executor = self.executor.with_session_factory(factory);
        self
    }

    /// Enable best-effort diagnostic artifacts
    pub fn with_diagnostic_capture(mut self, capture: Arc<dyn DiagnosticCapture>) -> Self {
        self.capture = Some(capture);
        self
    }

    pub fn ledger(&self) -> &RecoveryLedger {
        self.executor.ledger()
    }

    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Triage `error` and attempt recovery. Returns whether the
    /// session was recovered; never errors.
    ///
    /// An explicit action overrides the classifier's suggestion.
    /// Suggestions without a configured default budget (Skip, Fail)
    /// resolve to no action and yield `false`.
    pub async fn handle(
        &self,
        error: &SessionError,
        session: &mut SessionBox,
        operation_name: &str,
        explicit_action: Option<RecoveryAction>,
    ) -> bool {
        let mut context = self.build_context(error, session.as_ref(), operation_name).await;

        if let Some(capture) = &self.capture {
            match capture.capture(session.as_ref(), operation_name).await {
                Ok(path) => context = context.with_diagnostic_artifact(path),
                Err(e) => {
                    warn!(operation = operation_name, error = %e, "diagnostic capture failed");
                }
            }
        }

        let classification = self
            .classifier
            .classify(&context.error_type, &context.error_message);

        warn!(
            operation = operation_name,
            category = classification.category.name(),
            severity = classification.severity.name(),
            suggested = classification.suggested.name(),
            confidence = classification.confidence,
            locator = %context.resource_locator,
            "failure classified"
        );

        let resolved = match explicit_action {
            Some(action) => Some(action),
            None => RecoveryAction::defaults_for(classification.suggested, &self.config),
        };

        let Some(action) = resolved else {
            warn!(
                operation = operation_name,
                suggested = classification.suggested.name(),
                "no executable recovery action resolved"
            );
            return false;
        };

        self.executor.execute(session, &context, action).await
    }

    /// Best-effort context build: introspection reads are individually
    /// bounded and fail-soft, so a sick session still yields a usable
    /// context.
    async fn build_context(
        &self,
        error: &SessionError,
        session: &dyn SessionHandle,
        operation_name: &str,
    ) -> FailureContext {
        let timeout = self.config.introspection_timeout();

        let locator = locator_or_unknown(session, timeout).await;
        let log = log_or_none(session, timeout).await;

        let mut context = FailureContext::new(error.kind(), &error.to_string(), operation_name)
            .with_resource_locator(locator);
        if let Some(log) = log {
            context = context.with_session_log(log);
        }

        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::RecoveryStrategy;
    use crate::session::mock::{MockCapture, MockFactory, MockSession};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn facade() -> ErrorHandlerFacade {
        ErrorHandlerFacade::new(EngineConfig::default(), RecoveryLedger::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_end_to_end_timeout_recovery() {
        let facade = facade();
        let mut session: SessionBox = Box::new(MockSession::new());

        let error = SessionError::Other(
            "TimeoutException: element not found after timeout".to_string(),
        );

        // Classifier sees the timeout pattern first
        let classification = facade.classifier().classify("TimeoutException", &error.to_string());
        assert_eq!(classification.category.name(), "timeout");
        assert_eq!(classification.suggested, RecoveryStrategy::Retry);
        assert_eq!(classification.confidence, 0.8);

        // Override only the validator, keeping the default retry budget
        let action = RecoveryAction::defaults_for(RecoveryStrategy::Retry, &EngineConfig::default())
            .unwrap()
            .with_success_validator(Box::new(|_session| Box::pin(async { Ok(true) })));

        let recovered = facade
            .handle(&error, &mut session, "checkout_flow", Some(action))
            .await;

        assert!(recovered);
        let snapshot = facade.ledger().snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot[0].succeeded);
        assert_eq!(snapshot[0].strategy, RecoveryStrategy::Retry);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_resolves_default_action_from_suggestion() {
        let facade = facade();
        let mut session: SessionBox = Box::new(MockSession::new());

        // Retry suggestion, no explicit override: default 3 attempts / 2s.
        // No validator on the default action, so the first clean attempt
        // counts as recovered.
        let error = SessionError::Timeout {
            operation: "find_submit".to_string(),
            duration_ms: 30000,
        };

        let recovered = facade.handle(&error, &mut session, "login_flow", None).await;

        assert!(recovered);
        assert_eq!(facade.ledger().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_returns_false_for_fail_suggestion() {
        let facade = facade();
        let mut session: SessionBox = Box::new(MockSession::new());

        // Unmatched error: classification is unknown/Fail, which has no
        // default budget
        let error = SessionError::Other("##opaque##".to_string());

        let recovered = facade.handle(&error, &mut session, "login_flow", None).await;

        assert!(!recovered);
        // Nothing was executed, so nothing was recorded
        assert!(facade.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_action_overrides_suggestion() {
        let facade = facade();
        let mut session: SessionBox = Box::new(MockSession::new());

        let error = SessionError::Other("##opaque##".to_string());
        let recovered = facade
            .handle(
                &error,
                &mut session,
                "login_flow",
                Some(RecoveryAction::new(RecoveryStrategy::Skip)),
            )
            .await;

        assert!(recovered);
        assert_eq!(facade.ledger().snapshot()[0].strategy, RecoveryStrategy::Skip);
    }

    #[tokio::test]
    async fn test_capture_failure_is_not_fatal() {
        let capture = Arc::new(MockCapture::failing());
        let facade = ErrorHandlerFacade::new(EngineConfig::default(), RecoveryLedger::new())
            .with_diagnostic_capture(Arc::clone(&capture) as Arc<dyn DiagnosticCapture>);
        let mut session: SessionBox = Box::new(MockSession::new());

        let error = SessionError::Other("##opaque##".to_string());
        let recovered = facade
            .handle(
                &error,
                &mut session,
                "login_flow",
                Some(RecoveryAction::new(RecoveryStrategy::Skip)),
            )
            .await;

        assert!(recovered);
        assert_eq!(capture.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_context_carries_introspection_results() {
        let facade = facade();

        let session = MockSession::new()
            .with_locator("https://app.example.com/orders")
            .with_log(vec!["console: boom".to_string()]);
        let session_ref: &dyn SessionHandle = &session;

        let error = SessionError::ElementNotFound("#order-row".to_string());
        let context = facade
            .build_context(&error, session_ref, "orders_table")
            .await;

        assert_eq!(context.error_type, "ElementNotFound");
        assert_eq!(context.resource_locator, "https://app.example.com/orders");
        assert_eq!(
            context.session_log.as_deref().unwrap(),
            ["console: boom".to_string()]
        );
    }

    #[tokio::test]
    async fn test_successful_capture_lands_in_the_record_path() {
        let capture = Arc::new(MockCapture::new());
        let facade = ErrorHandlerFacade::new(EngineConfig::default(), RecoveryLedger::new())
            .with_diagnostic_capture(Arc::clone(&capture) as Arc<dyn DiagnosticCapture>);
        let mut session: SessionBox = Box::new(MockSession::new());

        let error = SessionError::Other("##opaque##".to_string());
        facade
            .handle(
                &error,
                &mut session,
                "orders_table",
                Some(RecoveryAction::new(RecoveryStrategy::Skip)),
            )
            .await;

        assert_eq!(capture.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_context_degrades_on_sick_session() {
        let facade = facade();
        let session = MockSession::new().fail_introspection();

        let error = SessionError::Connection("reset".to_string());
        let context = facade.build_context(&error, &session, "orders_table").await;

        assert_eq!(context.resource_locator, crate::session::UNKNOWN_LOCATOR);
        assert!(context.session_log.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_fatal_routes_to_restart() {
        let factory = Arc::new(MockFactory::default());
        let facade = ErrorHandlerFacade::new(EngineConfig::default(), RecoveryLedger::new())
            .with_session_factory(Arc::clone(&factory) as Arc<dyn SessionFactory>);
        let mut session: SessionBox = Box::new(MockSession::new());

        let error = SessionError::SessionFailure("chrome driver crashed".to_string());
        let recovered = facade.handle(&error, &mut session, "any_flow", None).await;

        assert!(recovered);
        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
        assert_eq!(
            facade.ledger().snapshot()[0].strategy,
            RecoveryStrategy::RestartSession
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_suggestion_without_factory_records_failure() {
        let facade = facade();
        let mut session: SessionBox = Box::new(MockSession::new());

        let error = SessionError::SessionFailure("chrome driver crashed".to_string());
        let recovered = facade.handle(&error, &mut session, "any_flow", None).await;

        assert!(!recovered);
        let snapshot = facade.ledger().snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot[0].succeeded);
    }

    #[tokio::test]
    async fn test_introspection_timeout_is_bounded() {
        let mut config = EngineConfig::default();
        config.introspection_timeout_ms = 50;
        let facade = ErrorHandlerFacade::new(config, RecoveryLedger::new());

        let session = MockSession::new().with_introspection_delay(Duration::from_secs(30));

        let started = std::time::Instant::now();
        let error = SessionError::Connection("reset".to_string());
        let context = facade.build_context(&error, &session, "slow_flow").await;

        assert_eq!(context.resource_locator, crate::session::UNKNOWN_LOCATOR);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
