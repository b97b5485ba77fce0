//! Contract log tracker
//!
//! Orchestrates per-log processing for one aggregator contract: dedup via
//! the consumption store, address filtering, event decoding, and the
//! monotonic merge into round state. Written to from the log-delivery path
//! and read from by the polling consensus engine.

use crate::events::{self, AggregatorEvent};
use crate::round_state::RoundState;
use crate::rpc::RpcClient;
use crate::store::{ConsumptionRecord, ConsumptionStore};
use crate::types::Log;
use alloy_primitives::Address;
use anyhow::Result;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Chain-query fallback consulted when the in-memory round state is still
/// zero-valued (e.g. right after a restart).
///
/// Implementations perform a single bounded query; cancellation is the
/// caller's, by dropping the returned future.
#[allow(async_fn_in_trait)]
pub trait RoundLookback {
    /// Return the newest round request within `lookback_blocks` of head,
    /// or None if the window contains no round-request log.
    async fn latest_round_requested(
        &self,
        contract: Address,
        lookback_blocks: u64,
    ) -> Result<Option<RoundState>>;
}

/// Tracker for one aggregator contract's round-request and config logs.
///
/// Holds the only mutable shared state in this crate, a mutex-protected
/// `RoundState`. All external observation is through copied snapshots.
pub struct ContractTracker<R = RpcClient> {
    contract_address: Address,
    store: Arc<dyn ConsumptionStore>,
    state: Mutex<RoundState>,
    fallback: Option<R>,
    job_id: u32,
}

impl<R: RoundLookback> ContractTracker<R> {
    /// Create a tracker bound to one contract address.
    ///
    /// Performs no I/O; fails only on a structurally invalid binding.
    pub fn new(
        contract_address: Address,
        store: Arc<dyn ConsumptionStore>,
        fallback: Option<R>,
        job_id: u32,
    ) -> Result<Self> {
        if contract_address == Address::ZERO {
            anyhow::bail!("Tracker requires a non-zero contract address");
        }
        Ok(Self {
            contract_address,
            store,
            state: Mutex::new(RoundState::default()),
            fallback,
            job_id,
        })
    }

    /// The contract address this tracker is bound to.
    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Process one delivered log. Fire-and-forget: every per-log failure is
    /// absorbed here because the delivery path has no caller that could
    /// meaningfully react.
    ///
    /// Order matters: the consumed-check runs first, the address filter
    /// returns before any guard-table write, and marking happens only after
    /// the event has been applied (or found irrelevant). Marking is not
    /// atomic with the state mutation; a missed mark costs redundant decode
    /// work on redelivery, which the monotonic merge then rejects.
    pub fn handle_log(&self, log: &Log) {
        let identity = log.identity();

        match self.store.was_already_consumed(&identity) {
            Ok(true) => {
                debug!(
                    "Skipping already-consumed log at block {} index {}",
                    log.block_number, log.log_index
                );
                return;
            }
            Ok(false) => {}
            Err(e) => {
                // Treat as not-yet-consumed; duplicate application is a
                // no-op under the monotonic merge rule.
                warn!(
                    "Consumption check failed for log at block {} index {}: {:?}",
                    log.block_number, log.log_index, e
                );
            }
        }

        if log.address != self.contract_address {
            debug!(
                "Ignoring log from {:?}, tracking {:?}",
                log.address, self.contract_address
            );
            return;
        }

        match events::decode(log) {
            AggregatorEvent::Unrecognized => {
                debug!(
                    "Unrecognized log at block {} index {}, marking consumed",
                    log.block_number, log.log_index
                );
            }
            event => {
                let applied = self
                    .state
                    .lock()
                    .expect("round state lock poisoned")
                    .apply(&event);
                if applied {
                    info!(
                        "Applied {:?} from block {} (job {})",
                        event, log.block_number, self.job_id
                    );
                } else {
                    debug!(
                        "Ignoring stale event {:?} from block {}",
                        event, log.block_number
                    );
                }
            }
        }

        let record = ConsumptionRecord {
            block_number: log.block_number,
            job_id: self.job_id,
        };
        if let Err(e) = self.store.mark_consumed(&identity, &record) {
            warn!(
                "Failed to mark log at block {} index {} consumed: {:?}",
                log.block_number, log.log_index, e
            );
        }
    }

    /// Snapshot the latest observed round for the consensus engine.
    ///
    /// Fast path: return the in-memory snapshot once anything has been
    /// observed. When the state is still zero-valued and a chain-query
    /// fallback is configured, scan the last `lookback_blocks` blocks;
    /// a fallback failure surfaces as an error and callers must treat the
    /// state as unknown. Cancellation is bounded by dropping the future.
    pub async fn latest_round_requested(&self, lookback_blocks: u64) -> Result<RoundState> {
        let snapshot = *self.state.lock().expect("round state lock poisoned");
        if snapshot != RoundState::default() {
            return Ok(snapshot);
        }

        let Some(fallback) = &self.fallback else {
            return Ok(snapshot);
        };

        match fallback
            .latest_round_requested(self.contract_address, lookback_blocks)
            .await?
        {
            Some(found) => {
                // Merge under the lock: delivery may have advanced the
                // state while the query was in flight, and the newer of
                // the two must win.
                let mut state = self.state.lock().expect("round state lock poisoned");
                if found.key() > state.key() {
                    *state = found;
                }
                Ok(*state)
            }
            None => Ok(*self.state.lock().expect("round state lock poisoned")),
        }
    }
}
