//! Recovery engine type definitions

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::session::SessionHandle;
use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Remediation strategies available to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategy {
    /// Wait and re-validate, optionally re-running a caller action
    Retry,

    /// Reload the current resource
    Refresh,

    /// Re-issue navigation to the failure's resource locator
    Navigate,

    /// Replace the session handle via the injected factory
    RestartSession,

    /// Accept the failure as non-fatal
    Skip,

    /// Give up without attempting anything
    Fail,
}

impl RecoveryStrategy {
    /// Stable name for log fields and ledger keys
    pub fn name(&self) -> &'static str {
        match self {
            RecoveryStrategy::Retry => "retry",
            RecoveryStrategy::Refresh => "refresh",
            RecoveryStrategy::Navigate => "navigate",
            RecoveryStrategy::RestartSession => "restart_session",
            RecoveryStrategy::Skip => "skip",
            RecoveryStrategy::Fail => "fail",
        }
    }

    /// Whether this strategy actually touches the session
    pub fn is_executable(&self) -> bool {
        !matches!(self, RecoveryStrategy::Skip | RecoveryStrategy::Fail)
    }
}

/// Caller-supplied remediation step run inside an attempt
pub type CustomAction = Box<
    dyn for<'a> Fn(&'a mut (dyn SessionHandle + 'static)) -> BoxFuture<'a, Result<()>>
        + Send
        + Sync,
>;

/// Caller-supplied probe deciding whether recovery worked
pub type SuccessValidator = Box<
    dyn for<'a> Fn(&'a mut (dyn SessionHandle + 'static)) -> BoxFuture<'a, Result<bool>>
        + Send
        + Sync,
>;

/// A resolved, executable recovery plan with a bounded budget
pub struct RecoveryAction {
    /// Strategy to execute
    pub strategy: RecoveryStrategy,

    /// Attempt ceiling (always treated as at least 1)
    pub max_attempts: u32,

    /// Wait between attempts, also the readiness-probe bound
    pub wait_between_attempts: Duration,

    /// Optional remediation step run inside each attempt
    pub custom_action: Option<CustomAction>,

    /// Optional probe deciding whether recovery worked
    pub success_validator: Option<SuccessValidator>,
}

impl RecoveryAction {
    /// Minimal action: one attempt, no wait, no callbacks
    pub fn new(strategy: RecoveryStrategy) -> Self {
        Self {
            strategy,
            max_attempts: 1,
            wait_between_attempts: Duration::ZERO,
            custom_action: None,
            success_validator: None,
        }
    }

    /// Action with the configured default budget for `strategy`, or
    /// `None` for Skip/Fail, which carry no budget
    pub fn defaults_for(strategy: RecoveryStrategy, config: &EngineConfig) -> Option<Self> {
        let budget = config.budget_for(strategy)?;

        Some(Self {
            strategy,
            max_attempts: budget.max_attempts,
            wait_between_attempts: budget.wait(),
            custom_action: None,
            success_validator: None,
        })
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait_between_attempts = wait;
        self
    }

    pub fn with_custom_action(mut self, action: CustomAction) -> Self {
        self.custom_action = Some(action);
        self
    }

    pub fn with_success_validator(mut self, validator: SuccessValidator) -> Self {
        self.success_validator = Some(validator);
        self
    }
}

impl std::fmt::Debug for RecoveryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryAction")
            .field("strategy", &self.strategy)
            .field("max_attempts", &self.max_attempts)
            .field("wait_between_attempts", &self.wait_between_attempts)
            .field("custom_action", &self.custom_action.as_ref().map(|_| "<fn>"))
            .field(
                "success_validator",
                &self.success_validator.as_ref().map(|_| "<fn>"),
            )
            .finish()
    }
}

/// Everything known about one failure occurrence, immutable once built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Identity referenced by ledger records
    pub id: Uuid,

    /// Failure-kind name (`SessionError::kind()` or an engine's own)
    pub error_type: String,

    /// Rendered failure message
    pub error_message: String,

    /// When the failure was observed
    pub occurred_at: DateTime<Utc>,

    /// Calling test/operation identifier
    pub operation_name: String,

    /// Session target at failure time, `"unknown"` when unreadable
    pub resource_locator: String,

    /// Diagnostic artifact (screenshot) path, if capture succeeded
    pub diagnostic_artifact: Option<PathBuf>,

    /// Stack trace text, when the failure source provides one
    pub stack_trace: Option<String>,

    /// Session/console log lines, when readable
    pub session_log: Option<Vec<String>>,

    /// How many times this operation already failed
    pub attempt_number: u32,
}

impl FailureContext {
    pub fn new(error_type: &str, error_message: &str, operation_name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            error_type: error_type.to_string(),
            error_message: error_message.to_string(),
            occurred_at: Utc::now(),
            operation_name: operation_name.to_string(),
            resource_locator: crate::session::UNKNOWN_LOCATOR.to_string(),
            diagnostic_artifact: None,
            stack_trace: None,
            session_log: None,
            attempt_number: 0,
        }
    }

    pub fn with_resource_locator(mut self, locator: String) -> Self {
        self.resource_locator = locator;
        self
    }

    pub fn with_diagnostic_artifact(mut self, path: PathBuf) -> Self {
        self.diagnostic_artifact = Some(path);
        self
    }

    pub fn with_stack_trace(mut self, trace: String) -> Self {
        self.stack_trace = Some(trace);
        self
    }

    pub fn with_session_log(mut self, log: Vec<String>) -> Self {
        self.session_log = Some(log);
        self
    }

    pub fn with_attempt_number(mut self, attempt: u32) -> Self {
        self.attempt_number = attempt;
        self
    }
}
