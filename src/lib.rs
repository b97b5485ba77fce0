//! Roundwatch - aggregator contract log tracker
//!
//! This library follows one aggregator contract's event logs, deduplicates
//! redelivered logs against replay and reorgs, and maintains the
//! latest-known consensus round state (config digest, epoch, round) for a
//! polling consensus engine to read.

pub mod cli;
pub mod config;
pub mod events;
pub mod keys;
pub mod round_state;
pub mod rpc;
pub mod store;
pub mod tracker;
pub mod types;
pub mod watcher;

// Re-export the main types for convenience
pub use events::AggregatorEvent;
pub use round_state::RoundState;
pub use store::{ConsumptionRecord, ConsumptionStore, RocksConsumptionStore};
pub use tracker::{ContractTracker, RoundLookback};
pub use types::{ConfigDigest, Log, LogIdentity};
