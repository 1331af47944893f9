//! Pattern-based failure classifier
//!
//! Matching is message-first so heterogeneous driver stacks with
//! different failure-type names still classify consistently; the
//! error-type table only breaks ties for opaque messages. The final
//! unknown branch makes `classify` total.

use crate::classifier::types::{Classification, FailureCategory, Severity};
use crate::errors::SessionError;
use crate::recovery::RecoveryStrategy;

/// One ordered matching rule: any needle hit on the lowercased message
/// produces the templated classification.
struct PatternRule {
    needles: &'static [&'static str],
    category: FailureCategory,
    severity: Severity,
    suggested: RecoveryStrategy,
}

/// Confidence assigned to a message-pattern match
const PATTERN_CONFIDENCE: f64 = 0.8;

/// Confidence assigned to an error-type fallback match
const TYPE_CONFIDENCE: f64 = 0.6;

/// Ordered rule list. Order is the tiebreak: a message carrying both
/// "timeout" and "driver" text classifies as a timeout.
const RULES: &[PatternRule] = &[
    PatternRule {
        needles: &["timeout", "timed out"],
        category: FailureCategory::Timeout,
        severity: Severity::Medium,
        suggested: RecoveryStrategy::Retry,
    },
    PatternRule {
        needles: &["element not found", "no such element", "unable to locate"],
        category: FailureCategory::ElementNotFound,
        severity: Severity::High,
        suggested: RecoveryStrategy::Refresh,
    },
    PatternRule {
        needles: &["stale element", "not attached"],
        category: FailureCategory::StaleElement,
        severity: Severity::Medium,
        suggested: RecoveryStrategy::Retry,
    },
    PatternRule {
        needles: &["click intercepted"],
        category: FailureCategory::ClickIntercepted,
        severity: Severity::Medium,
        suggested: RecoveryStrategy::Retry,
    },
    PatternRule {
        needles: &["connection", "network", "dns", "refused"],
        category: FailureCategory::Connection,
        severity: Severity::High,
        suggested: RecoveryStrategy::RestartSession,
    },
    PatternRule {
        needles: &["webdriver", "driver", "session"],
        category: FailureCategory::SessionFatal,
        severity: Severity::Critical,
        suggested: RecoveryStrategy::RestartSession,
    },
];

/// Failure classifier
///
/// `classify` is a pure function of its two string inputs: no session
/// access, no state, and no failure path of its own.
#[derive(Debug, Clone, Default)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify one failure occurrence. Total: always returns a
    /// `Classification`, falling through pattern match, type match,
    /// and finally the unknown template.
    pub fn classify(&self, error_type: &str, error_message: &str) -> Classification {
        let message = error_message.to_lowercase();

        for rule in RULES {
            if rule.needles.iter().any(|needle| message.contains(needle)) {
                return Classification::new(
                    rule.category,
                    rule.severity,
                    rule.suggested,
                    PATTERN_CONFIDENCE,
                );
            }
        }

        if let Some(classification) = Self::classify_by_type(error_type) {
            return classification;
        }

        Classification::unknown()
    }

    /// Convenience over a live `SessionError`: kind + rendered message
    pub fn classify_error(&self, error: &SessionError) -> Classification {
        self.classify(error.kind(), &error.to_string())
    }

    /// Exact-match fallback keyed on the failure-type name. Covers the
    /// common kind names across automation engines plus this crate's
    /// own `SessionError::kind()` values.
    fn classify_by_type(error_type: &str) -> Option<Classification> {
        let (category, severity, suggested) = match error_type {
            "Timeout" | "TimeoutError" | "TimeoutException" => (
                FailureCategory::Timeout,
                Severity::Medium,
                RecoveryStrategy::Retry,
            ),
            "ElementNotFound" | "NoSuchElementException" => (
                FailureCategory::ElementNotFound,
                Severity::High,
                RecoveryStrategy::Refresh,
            ),
            "StaleElement" | "StaleElementReferenceException" => (
                FailureCategory::StaleElement,
                Severity::Medium,
                RecoveryStrategy::Retry,
            ),
            "ClickIntercepted" | "ElementClickInterceptedException" => (
                FailureCategory::ClickIntercepted,
                Severity::Medium,
                RecoveryStrategy::Retry,
            ),
            "Connection" | "ConnectionError" | "ConnectionResetError" => (
                FailureCategory::Connection,
                Severity::High,
                RecoveryStrategy::RestartSession,
            ),
            "SessionFailure" | "WebDriverException" | "SessionNotCreatedException" => (
                FailureCategory::SessionFatal,
                Severity::Critical,
                RecoveryStrategy::RestartSession,
            ),
            _ => return None,
        };

        Some(Classification::new(
            category,
            severity,
            suggested,
            TYPE_CONFIDENCE,
        ))
    }
}
