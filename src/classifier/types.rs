//! Classification type definitions

use crate::recovery::RecoveryStrategy;
use serde::{Deserialize, Serialize};

/// Why a session operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Operation or wait exceeded its deadline
    Timeout,

    /// Locator did not resolve to an element
    ElementNotFound,

    /// Element handle detached from the live document
    StaleElement,

    /// Click target obscured by another element
    ClickIntercepted,

    /// Network-level failure between engine and session
    Connection,

    /// The driver/session itself is unusable
    SessionFatal,

    /// Nothing matched
    Unknown,
}

impl FailureCategory {
    /// Stable name for log fields and report keys
    pub fn name(&self) -> &'static str {
        match self {
            FailureCategory::Timeout => "timeout",
            FailureCategory::ElementNotFound => "element_not_found",
            FailureCategory::StaleElement => "stale_element",
            FailureCategory::ClickIntercepted => "click_intercepted",
            FailureCategory::Connection => "connection",
            FailureCategory::SessionFatal => "session_fatal",
            FailureCategory::Unknown => "unknown",
        }
    }
}

/// How badly a failure of this class hurts the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Result of classifying one failure occurrence
///
/// Confidence encodes how the match was found: 0.8 for a message
/// pattern hit, 0.6 for an error-type fallback, 0.3 for unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: FailureCategory,
    pub severity: Severity,
    pub suggested: RecoveryStrategy,
    pub confidence: f64,
}

impl Classification {
    pub fn new(
        category: FailureCategory,
        severity: Severity,
        suggested: RecoveryStrategy,
        confidence: f64,
    ) -> Self {
        Self {
            category,
            severity,
            suggested,
            confidence,
        }
    }

    /// The catch-all classification when nothing matched
    pub fn unknown() -> Self {
        Self {
            category: FailureCategory::Unknown,
            severity: Severity::High,
            suggested: RecoveryStrategy::Fail,
            confidence: 0.3,
        }
    }
}
