//! Bounded recovery execution against a live session
//!
//! Every strategy runs inside an attempt/wait budget and converts all
//! collaborator failures into a `false` outcome. Nothing here
//! propagates an error to the caller, and every execution leaves
//! exactly one ledger record behind, whatever happened inside.

use crate::recovery::ledger::{RecoveryLedger, RecoveryRecord};
use crate::recovery::types::{FailureContext, RecoveryAction, RecoveryStrategy};
use crate::session::{SessionBox, SessionFactory, UNKNOWN_LOCATOR};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Executes resolved recovery actions and records their outcomes
pub struct RecoveryExecutor {
    /// Shared outcome history
    ledger: RecoveryLedger,

    /// Replacement-session factory, required only for `RestartSession`
    factory: Option<Arc<dyn SessionFactory>>,
}

impl RecoveryExecutor {
    pub fn new(ledger: RecoveryLedger) -> Self {
        Self {
            ledger,
            factory: None,
        }
    }

    pub fn with_session_factory(mut self, factory: Arc<dyn SessionFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn ledger(&self) -> &RecoveryLedger {
        &self.ledger
    }

    /// Execute `action` against `session`. Returns whether the session
    /// was recovered. Never errors, never panics on collaborator
    /// failure; the ledger gains one record on every path.
    pub async fn execute(
        &self,
        session: &mut SessionBox,
        context: &FailureContext,
        action: RecoveryAction,
    ) -> bool {
        let strategy = action.strategy;
        let start = Instant::now();

        let succeeded = match strategy {
            RecoveryStrategy::Retry => self.run_retry(session, &action).await,
            RecoveryStrategy::Refresh => self.run_refresh(session, &action).await,
            RecoveryStrategy::Navigate => self.run_navigate(session, context, &action).await,
            RecoveryStrategy::RestartSession => {
                self.run_restart(session, context, &action).await
            }
            RecoveryStrategy::Skip => true,
            RecoveryStrategy::Fail => false,
        };

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.ledger.append(RecoveryRecord {
            strategy,
            succeeded,
            duration_ms,
            context_id: context.id,
            operation_name: context.operation_name.clone(),
            recorded_at: Utc::now(),
        });

        debug!(
            strategy = strategy.name(),
            succeeded,
            duration_ms,
            operation = %context.operation_name,
            "recovery execution finished"
        );

        succeeded
    }

    /// Wait-and-revalidate loop. Callback errors count as a failed
    /// attempt and the loop keeps going; exhaustion is the only way
    /// out with `false`.
    async fn run_retry(&self, session: &mut SessionBox, action: &RecoveryAction) -> bool {
        let max_attempts = action.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            sleep(action.wait_between_attempts).await;

            if let Some(custom) = &action.custom_action {
                if let Err(e) = custom(session.as_mut()).await {
                    warn!(attempt, error = %e, "retry custom action failed");
                    continue;
                }
            }

            match &action.success_validator {
                Some(validator) => match validator(session.as_mut()).await {
                    Ok(true) => return true,
                    Ok(false) => {
                        debug!(attempt, max_attempts, "retry validation negative");
                    }
                    Err(e) => {
                        warn!(attempt, error = %e, "retry validator failed");
                    }
                },
                // No validator: a clean attempt is taken as recovered
                None => return true,
            }
        }

        false
    }

    /// Reload, wait for readiness, validate. A collaborator error
    /// anywhere aborts with `false`; a negative validation consumes
    /// one attempt.
    async fn run_refresh(&self, session: &mut SessionBox, action: &RecoveryAction) -> bool {
        let max_attempts = action.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            if let Err(e) = session.reload().await {
                warn!(attempt, error = %e, "refresh reload failed");
                return false;
            }

            let ready = match session.is_ready(action.wait_between_attempts).await {
                Ok(ready) => ready,
                Err(e) => {
                    warn!(attempt, error = %e, "refresh readiness probe failed");
                    return false;
                }
            };

            match &action.success_validator {
                Some(validator) => match validator(session.as_mut()).await {
                    Ok(true) => return true,
                    Ok(false) => {
                        debug!(attempt, max_attempts, "refresh validation negative");
                    }
                    Err(e) => {
                        warn!(attempt, error = %e, "refresh validator failed");
                        return false;
                    }
                },
                None => {
                    if ready {
                        return true;
                    }
                    debug!(attempt, max_attempts, "session not ready after reload");
                }
            }
        }

        false
    }

    /// Re-issue navigation to the failure's resource locator, or run
    /// the supplied custom action instead.
    async fn run_navigate(
        &self,
        session: &mut SessionBox,
        context: &FailureContext,
        action: &RecoveryAction,
    ) -> bool {
        if action.custom_action.is_none() && context.resource_locator == UNKNOWN_LOCATOR {
            warn!(
                operation = %context.operation_name,
                "navigate recovery has no target locator"
            );
            return false;
        }

        let max_attempts = action.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let navigated = match &action.custom_action {
                Some(custom) => custom(session.as_mut()).await,
                None => session.navigate_to(&context.resource_locator).await,
            };
            if let Err(e) = navigated {
                warn!(attempt, error = %e, "navigate recovery failed");
                return false;
            }

            let ready = match session.is_ready(action.wait_between_attempts).await {
                Ok(ready) => ready,
                Err(e) => {
                    warn!(attempt, error = %e, "navigate readiness probe failed");
                    return false;
                }
            };

            match &action.success_validator {
                Some(validator) => match validator(session.as_mut()).await {
                    Ok(true) => return true,
                    Ok(false) => {
                        debug!(attempt, max_attempts, "navigate validation negative");
                    }
                    Err(e) => {
                        warn!(attempt, error = %e, "navigate validator failed");
                        return false;
                    }
                },
                None => {
                    if ready {
                        return true;
                    }
                    debug!(attempt, max_attempts, "session not ready after navigation");
                }
            }
        }

        false
    }

    /// Close the handle, build a replacement through the factory, and
    /// re-establish the failure's target. Without a configured factory
    /// this fails fast with `false` instead of erroring.
    async fn run_restart(
        &self,
        session: &mut SessionBox,
        context: &FailureContext,
        action: &RecoveryAction,
    ) -> bool {
        let Some(factory) = &self.factory else {
            warn!(
                operation = %context.operation_name,
                "restart_session requested but no session factory is configured"
            );
            return false;
        };

        // A broken session may refuse to close; the replacement still proceeds
        if let Err(e) = session.close().await {
            warn!(error = %e, "closing the old session failed");
        }

        let fresh = match factory.create().await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(error = %e, "session factory could not build a replacement");
                return false;
            }
        };
        *session = fresh;

        if context.resource_locator != UNKNOWN_LOCATOR {
            if let Err(e) = session.navigate_to(&context.resource_locator).await {
                warn!(error = %e, locator = %context.resource_locator, "re-navigation after restart failed");
                return false;
            }
        }

        let ready = match session.is_ready(action.wait_between_attempts).await {
            Ok(ready) => ready,
            Err(e) => {
                warn!(error = %e, "readiness probe after restart failed");
                return false;
            }
        };

        match &action.success_validator {
            Some(validator) => match validator(session.as_mut()).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, "validator after restart failed");
                    false
                }
            },
            None => ready,
        }
    }
}
