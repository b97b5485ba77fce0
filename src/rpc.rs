//! JSON-RPC client for Ethereum nodes
//!
//! Provides the typed log-source interface the tracker's collaborators
//! consume: log fetching for the bound contract and block-number queries.
//! Handles hex string parsing and error handling.

use crate::events::{self, AggregatorEvent};
use crate::round_state::RoundState;
use crate::tracker::RoundLookback;
use crate::types::Log;
use alloy_primitives::{Address, B256};
use anyhow::{Context, Result};
use serde_json::{json, Value};

/// JSON-RPC client for Ethereum nodes.
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
}

impl RpcClient {
    /// Create a new RPC client.
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Make a JSON-RPC call.
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .context("Failed to send RPC request")?;

        let json: Value = response
            .json()
            .await
            .context("Failed to parse RPC response")?;

        // Check for RPC error
        if let Some(error) = json.get("error") {
            anyhow::bail!("RPC error: {}", error);
        }

        // Extract result
        json.get("result")
            .cloned()
            .context("RPC response missing 'result' field")
    }

    /// Get just the block number for a given block tag.
    ///
    /// `block` can be "finalized", "latest", etc.
    /// This is more efficient than fetching the full block when you only need the number.
    pub async fn get_block_number(&self, block: &str) -> Result<u64> {
        let params = json!([block, false]);
        let result = self.call("eth_getBlockByNumber", params).await?;

        // Extract number field from block
        let number_str = result
            .get("number")
            .and_then(|v| v.as_str())
            .context("Block missing 'number' field")?;

        let number_str = number_str.strip_prefix("0x").unwrap_or(number_str);
        if number_str.is_empty() {
            anyhow::bail!("Block number is empty");
        }
        u64::from_str_radix(number_str, 16).context("Failed to parse block number")
    }

    /// Fetch logs emitted by `address` in the inclusive block range.
    ///
    /// `topics` optionally restricts topic0; multiple entries are OR'd,
    /// matching the JSON-RPC filter semantics.
    pub async fn get_logs(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
        topics: Option<&[B256]>,
    ) -> Result<Vec<Log>> {
        let mut filter = json!({
            "address": format!("0x{}", hex::encode(address.as_slice())),
            "fromBlock": format!("0x{:x}", from_block),
            "toBlock": format!("0x{:x}", to_block),
        });

        if let Some(topics) = topics {
            let topic0: Vec<String> = topics.iter().map(|t| format!("{t}")).collect();
            filter["topics"] = json!([topic0]);
        }

        let result = self.call("eth_getLogs", json!([filter])).await?;
        serde_json::from_value(result).context("Failed to deserialize logs")
    }
}

impl RoundLookback for RpcClient {
    /// Scan the last `lookback_blocks` blocks for `RoundRequested` logs and
    /// return the newest one by ordering key. Used when the in-memory state
    /// is still zero-valued, e.g. right after a restart.
    async fn latest_round_requested(
        &self,
        contract: Address,
        lookback_blocks: u64,
    ) -> Result<Option<RoundState>> {
        let head = self
            .get_block_number("latest")
            .await
            .context("Failed to get head block for round lookback")?;
        let from = head.saturating_sub(lookback_blocks);

        let topics = [events::round_requested_topic()];
        let logs = self
            .get_logs(contract, from, head, Some(topics.as_slice()))
            .await
            .context("Failed to fetch round-request logs")?;

        let mut newest: Option<RoundState> = None;
        for log in &logs {
            let AggregatorEvent::RoundRequested {
                config_digest,
                epoch,
                round,
            } = events::decode(log)
            else {
                continue;
            };

            let candidate = RoundState {
                config_digest,
                epoch,
                round,
            };
            if newest.map_or(true, |n| candidate.key() > n.key()) {
                newest = Some(candidate);
            }
        }

        tracing::debug!(
            "Round lookback over blocks {}..={} found event: {}",
            from,
            head,
            newest.is_some()
        );
        Ok(newest)
    }
}
