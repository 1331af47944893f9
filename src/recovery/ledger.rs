//! Append-only recovery ledger and aggregate statistics
//!
//! The ledger is the one engine structure built for concurrent
//! writers: clones share the underlying store, appends are atomic,
//! and `snapshot()` hands back a point-in-time copy rather than a
//! live view.

use crate::recovery::RecoveryStrategy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// One completed recovery execution, never mutated after append
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryRecord {
    /// Strategy that ran
    pub strategy: RecoveryStrategy,

    /// Whether the session was recovered
    pub succeeded: bool,

    /// End-to-end execution time in milliseconds
    pub duration_ms: f64,

    /// Identity of the failure context that triggered the recovery
    pub context_id: Uuid,

    /// Operation the failure belonged to
    pub operation_name: String,

    /// When the record was appended
    pub recorded_at: DateTime<Utc>,
}

/// Per-strategy attempt tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyTally {
    pub total: usize,
    pub successful: usize,
}

/// Aggregate statistics over all recorded recoveries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_attempts: usize,
    pub successful_attempts: usize,
    /// Success rate in percent, rounded to 2 decimals
    pub success_rate_percent: f64,
    /// Mean recovery latency in milliseconds, rounded to 2 decimals
    pub average_recovery_ms: f64,
    /// Tally per strategy name
    pub per_strategy: HashMap<String, StrategyTally>,
}

/// Thread-safe append-only recovery history
///
/// Explicitly constructed at engine startup and cleared only by
/// `reset()`. Clones share the store, so one ledger can serve many
/// concurrent sessions.
#[derive(Debug, Clone, Default)]
pub struct RecoveryLedger {
    records: Arc<Mutex<Vec<RecoveryRecord>>>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl RecoveryLedger {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append one record. Atomic with respect to concurrent appenders.
    pub fn append(&self, record: RecoveryRecord) {
        let mut records = self.records.lock().unwrap();
        records.push(record);
    }

    /// Consistent point-in-time copy of the history, in append order
    pub fn snapshot(&self) -> Vec<RecoveryRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }

    /// Clear the history. Test isolation and engine teardown only.
    pub fn reset(&self) {
        self.records.lock().unwrap().clear();
    }

    /// Aggregate statistics, or `None` when no recovery attempts have
    /// been recorded
    pub fn stats(&self) -> Option<AggregateStats> {
        let records = self.records.lock().unwrap();

        if records.is_empty() {
            return None;
        }

        let total_attempts = records.len();
        let successful_attempts = records.iter().filter(|r| r.succeeded).count();
        let total_ms: f64 = records.iter().map(|r| r.duration_ms).sum();

        let mut per_strategy: HashMap<String, StrategyTally> = HashMap::new();
        for record in records.iter() {
            let tally = per_strategy
                .entry(record.strategy.name().to_string())
                .or_default();
            tally.total += 1;
            if record.succeeded {
                tally.successful += 1;
            }
        }

        Some(AggregateStats {
            total_attempts,
            successful_attempts,
            success_rate_percent: round2(successful_attempts as f64 / total_attempts as f64 * 100.0),
            average_recovery_ms: round2(total_ms / total_attempts as f64),
            per_strategy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(strategy: RecoveryStrategy, succeeded: bool, duration_ms: f64) -> RecoveryRecord {
        RecoveryRecord {
            strategy,
            succeeded,
            duration_ms,
            context_id: Uuid::new_v4(),
            operation_name: "login_flow".to_string(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_ledger_sentinel() {
        let ledger = RecoveryLedger::new();
        assert!(ledger.is_empty());
        assert!(ledger.stats().is_none());
    }

    #[test]
    fn test_append_and_snapshot() {
        let ledger = RecoveryLedger::new();
        ledger.append(record(RecoveryStrategy::Retry, true, 10.0));
        ledger.append(record(RecoveryStrategy::Refresh, false, 20.0));

        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].strategy, RecoveryStrategy::Retry);
        assert_eq!(snapshot[1].strategy, RecoveryStrategy::Refresh);

        // Snapshot is a copy, not a live view
        ledger.append(record(RecoveryStrategy::Retry, true, 5.0));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_stats_math() {
        let ledger = RecoveryLedger::new();
        ledger.append(record(RecoveryStrategy::Retry, true, 100.0));
        ledger.append(record(RecoveryStrategy::Retry, false, 200.0));
        ledger.append(record(RecoveryStrategy::Refresh, true, 300.0));

        let stats = ledger.stats().unwrap();
        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.successful_attempts, 2);
        assert_eq!(stats.success_rate_percent, 66.67);
        assert_eq!(stats.average_recovery_ms, 200.0);

        let retry = stats.per_strategy.get("retry").unwrap();
        assert_eq!(retry.total, 2);
        assert_eq!(retry.successful, 1);

        let refresh = stats.per_strategy.get("refresh").unwrap();
        assert_eq!(refresh.total, 1);
        assert_eq!(refresh.successful, 1);
    }

    #[test]
    fn test_stats_rounding() {
        let ledger = RecoveryLedger::new();
        ledger.append(record(RecoveryStrategy::Retry, true, 10.0));
        ledger.append(record(RecoveryStrategy::Retry, false, 10.0));
        ledger.append(record(RecoveryStrategy::Retry, false, 10.02));

        let stats = ledger.stats().unwrap();
        assert_eq!(stats.success_rate_percent, 33.33);
        assert_eq!(stats.average_recovery_ms, 10.01);
    }

    #[test]
    fn test_reset() {
        let ledger = RecoveryLedger::new();
        ledger.append(record(RecoveryStrategy::Skip, true, 0.0));
        assert_eq!(ledger.len(), 1);

        ledger.reset();
        assert!(ledger.is_empty());
        assert!(ledger.stats().is_none());
    }

    #[test]
    fn test_clones_share_the_store() {
        let ledger = RecoveryLedger::new();
        let writer = ledger.clone();

        writer.append(record(RecoveryStrategy::Navigate, true, 1.0));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        const WRITERS: usize = 8;
        const PER_WRITER: usize = 10;

        let ledger = RecoveryLedger::new();
        let mut handles = Vec::new();

        for _ in 0..WRITERS {
            let writer = ledger.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..PER_WRITER {
                    writer.append(record(RecoveryStrategy::Retry, true, 1.0));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.len(), WRITERS * PER_WRITER);
        let stats = ledger.stats().unwrap();
        assert_eq!(stats.total_attempts, WRITERS * PER_WRITER);
        assert_eq!(stats.successful_attempts, WRITERS * PER_WRITER);
    }

    #[test]
    fn test_record_serialization() {
        let r = record(RecoveryStrategy::RestartSession, false, 1500.25);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("restart_session"));

        let parsed: RecoveryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.strategy, RecoveryStrategy::RestartSession);
        assert!(!parsed.succeeded);
    }
}
