//! Reconciliation of progress updates that could not reach their tracker.

pub mod drainer;
pub mod outcome;
pub mod schedule;

pub use drainer::SyncDrainer;
pub use outcome::FailurePolicy;
pub use schedule::DelayedSyncScheduler;
