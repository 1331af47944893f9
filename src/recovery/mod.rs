//! Bounded recovery execution and outcome history
//! Strategy execution against the live session, plus the shared ledger

pub mod executor;
pub mod ledger;
pub mod types;

pub use executor::RecoveryExecutor;
pub use ledger::{AggregateStats, RecoveryLedger, RecoveryRecord, StrategyTally};
pub use types::{FailureContext, RecoveryAction, RecoveryStrategy};
