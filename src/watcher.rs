//! Main log-delivery loop
//!
//! Polls the chain for new blocks and feeds the bound contract's logs to
//! the tracker. Delivery is at-least-once: a confirmation window behind the
//! cursor is re-scanned on every pass so that logs shuffled by a reorg are
//! redelivered. Deduplication is the consumption guard's job, not ours.

use crate::events;
use crate::rpc::RpcClient;
use crate::store::ConsumptionStore;
use crate::tracker::ContractTracker;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Upper bound on blocks covered by a single eth_getLogs call.
const MAX_SCAN_RANGE: u64 = 1_000;

/// Seconds between polls, roughly one mainnet block time.
const POLL_INTERVAL_SECS: u64 = 12;

/// Watcher that delivers one contract's logs to its tracker.
pub struct LogWatcher {
    tracker: Arc<ContractTracker>,
    rpc: RpcClient,
    store: Arc<dyn ConsumptionStore>,
    confirmation_window: u64,
}

impl LogWatcher {
    /// Create a new watcher.
    ///
    /// `confirmation_window` is how many already-scanned blocks are
    /// re-scanned each pass to pick up reorged-in logs.
    pub fn new(
        tracker: Arc<ContractTracker>,
        rpc: RpcClient,
        store: Arc<dyn ConsumptionStore>,
        confirmation_window: u64,
    ) -> Self {
        Self {
            tracker,
            rpc,
            store,
            confirmation_window,
        }
    }

    /// Initialize the delivery cursor.
    ///
    /// On first run the cursor is set to the current latest block; tracking
    /// is forward-only from that point. On restart the persisted cursor is
    /// kept and the confirmation window covers anything missed in between.
    pub async fn initialize(&self) -> Result<()> {
        if let Some(cursor) = self.store.get_cursor().context("Failed to get cursor")? {
            info!("Resuming log delivery from block {}", cursor);
            return Ok(());
        }

        let latest = self
            .rpc
            .get_block_number("latest")
            .await
            .context("Failed to get latest block number")?;
        self.store
            .set_cursor(latest)
            .context("Failed to set initial cursor")?;
        info!(
            "First run, starting log delivery at block {} for contract {:?}",
            latest,
            self.tracker.contract_address()
        );
        Ok(())
    }

    /// Fetch and deliver logs for one block range, inclusive.
    pub async fn process_block_range(&self, from: u64, to: u64) -> Result<()> {
        let topics = [events::round_requested_topic(), events::config_set_topic()];
        let logs = self
            .rpc
            .get_logs(self.tracker.contract_address(), from, to, Some(topics.as_slice()))
            .await
            .with_context(|| format!("Failed to fetch logs for blocks {}..={}", from, to))?;

        debug!("Delivering {} logs from blocks {}..={}", logs.len(), from, to);
        for log in &logs {
            self.tracker.handle_log(log);
        }

        self.store
            .set_cursor(to)
            .context("Failed to update cursor")?;
        Ok(())
    }

    /// Run the delivery loop until cancelled by the caller.
    pub async fn run(&self) -> Result<()> {
        info!("Starting log delivery loop...");

        loop {
            let cursor = self
                .store
                .get_cursor()
                .context("Failed to get cursor")?
                .unwrap_or(0);

            let latest = self
                .rpc
                .get_block_number("latest")
                .await
                .context("Failed to get latest block number")?;

            if let Some((from, to)) = next_scan_range(cursor, latest, self.confirmation_window) {
                self.process_block_range(from, to)
                    .await
                    .context("Failed to process block range")?;
            } else {
                debug!("Up to date. Cursor: {}, Latest: {}", cursor, latest);
            }

            tokio::time::sleep(tokio::time::Duration::from_secs(POLL_INTERVAL_SECS)).await;
        }
    }
}

/// Compute the next inclusive block range to scan.
///
/// Reaches `confirmation_window` blocks behind the cursor for reorg
/// redelivery and at most `MAX_SCAN_RANGE` blocks forward. Returns None
/// when there is nothing new and no window to re-cover.
fn next_scan_range(cursor: u64, latest: u64, confirmation_window: u64) -> Option<(u64, u64)> {
    if latest <= cursor && confirmation_window == 0 {
        return None;
    }

    let from = cursor.saturating_sub(confirmation_window).saturating_add(1);
    let to = latest.min(from.saturating_add(MAX_SCAN_RANGE - 1));
    if to < from {
        return None;
    }
    Some((from, to))
}
