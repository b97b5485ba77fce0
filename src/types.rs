//! Contract log types
//!
//! Type definitions for event logs returned from Ethereum JSON-RPC
//! endpoints, plus the identity key used for consumption tracking.

use alloy_primitives::{Address, FixedBytes, B256};
use serde::{Deserialize, Deserializer};

/// Opaque identifier of a consensus-protocol configuration version.
///
/// 16 bytes, matching the aggregator contract's `bytes16 configDigest`.
/// The all-zero digest means "no configuration observed yet".
pub type ConfigDigest = FixedBytes<16>;

/// Log entry emitted by a contract during transaction execution.
///
/// Carries enough positional metadata (block hash + log index) to identify
/// the log uniquely across reorgs: a sibling block's log at the same index
/// has a different block hash and is therefore a distinct identity.
#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    /// Address of the contract that emitted the log
    #[serde(rename = "address", deserialize_with = "deserialize_hex_address")]
    pub address: Address,

    /// Indexed topics (topic0 = event signature, topics[1..] = indexed params)
    #[serde(rename = "topics", default, deserialize_with = "deserialize_hex_b256_vec")]
    pub topics: Vec<B256>,

    /// Non-indexed event data (hex string in JSON)
    #[serde(rename = "data", deserialize_with = "deserialize_hex_bytes")]
    pub data: Vec<u8>,

    /// Hash of the block containing the log
    #[serde(rename = "blockHash", deserialize_with = "deserialize_hex_b256")]
    pub block_hash: B256,

    /// Number of the block containing the log
    #[serde(rename = "blockNumber", deserialize_with = "deserialize_hex_u64")]
    pub block_number: u64,

    /// Index of the log within its block
    #[serde(rename = "logIndex", deserialize_with = "deserialize_hex_u64")]
    pub log_index: u64,

    /// Hash of the transaction that emitted the log
    #[serde(rename = "transactionHash", deserialize_with = "deserialize_hex_b256")]
    pub tx_hash: B256,
}

impl Log {
    /// The compound key identifying this log for deduplication.
    pub fn identity(&self) -> LogIdentity {
        LogIdentity {
            block_hash: self.block_hash,
            log_index: self.log_index,
        }
    }
}

/// Unique identity of an on-chain log: block hash plus log index.
///
/// Used as the consumption-marker key. Two deliveries of the same log
/// (duplicate broadcast, restart re-scan) share an identity; the same
/// logical event re-emitted in a reorged sibling block does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogIdentity {
    /// Hash of the containing block
    pub block_hash: B256,
    /// Index of the log within that block
    pub log_index: u64,
}

// Hex deserialization helpers

/// Pad an odd-length hex string with a leading zero.
/// This handles cases where RPC returns hex strings without leading zeros.
fn pad_hex_string(s: &str) -> String {
    if s.is_empty() {
        return s.to_string();
    }
    if s.len() % 2 == 1 {
        format!("0{}", s)
    } else {
        s.to_string()
    }
}

/// Deserialize a hex string to u64.
fn deserialize_hex_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let s = s.strip_prefix("0x").unwrap_or(&s);
    u64::from_str_radix(s, 16).map_err(serde::de::Error::custom)
}

/// Deserialize a hex string to B256.
fn deserialize_hex_b256<'de, D>(deserializer: D) -> Result<B256, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    hex_to_b256(&s).map_err(serde::de::Error::custom)
}

/// Deserialize a list of hex strings to B256 values (log topics).
fn deserialize_hex_b256_vec<'de, D>(deserializer: D) -> Result<Vec<B256>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    raw.iter()
        .map(|s| hex_to_b256(s).map_err(serde::de::Error::custom))
        .collect()
}

/// Deserialize a hex string to Address.
fn deserialize_hex_address<'de, D>(deserializer: D) -> Result<Address, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let s = s.strip_prefix("0x").unwrap_or(&s);
    let s = pad_hex_string(s);
    let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
    if bytes.len() != 20 {
        return Err(serde::de::Error::custom(format!(
            "Expected 20 bytes for address, got {}",
            bytes.len()
        )));
    }
    Ok(Address::from_slice(&bytes))
}

/// Deserialize a hex string to bytes.
fn deserialize_hex_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let s = s.strip_prefix("0x").unwrap_or(&s);
    if s.is_empty() {
        Ok(Vec::new())
    } else {
        let s = pad_hex_string(s);
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

fn hex_to_b256(s: &str) -> Result<B256, String> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let s = pad_hex_string(s);
    let bytes = hex::decode(&s).map_err(|e| e.to_string())?;
    if bytes.len() != 32 {
        return Err(format!("Expected 32 bytes for hash, got {}", bytes.len()));
    }
    Ok(B256::from_slice(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn test_log_deserialization() {
        let json = r#"{
            "address": "0x03bd0d5d39629423979f8a0e53dbce78c1791ebf",
            "topics": [
                "0x3ea16a923ff4b1df6526e854c9e3a995c43385d70e73359e10623c74f0b52037"
            ],
            "data": "0x92eed6d902b18bdbf881402d47631bcd00000000000000000000000000000000",
            "blockHash": "0xfedcba0987654321fedcba0987654321fedcba0987654321fedcba0987654321",
            "blockNumber": "0x2a",
            "logIndex": "0x3",
            "transactionHash": "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef"
        }"#;

        let log: Log = serde_json::from_str(json).unwrap();
        assert_eq!(log.block_number, 42);
        assert_eq!(log.log_index, 3);
        assert_eq!(log.topics.len(), 1);
        assert_eq!(log.data.len(), 32);
        assert_eq!(
            log.block_hash,
            b256!("fedcba0987654321fedcba0987654321fedcba0987654321fedcba0987654321")
        );
    }

    #[test]
    fn test_log_identity() {
        let json = r#"{
            "address": "0x03bd0d5d39629423979f8a0e53dbce78c1791ebf",
            "topics": [],
            "data": "0x",
            "blockHash": "0xfedcba0987654321fedcba0987654321fedcba0987654321fedcba0987654321",
            "blockNumber": "0x10",
            "logIndex": "0x0",
            "transactionHash": "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef"
        }"#;

        let log: Log = serde_json::from_str(json).unwrap();
        let id = log.identity();
        assert_eq!(id.block_hash, log.block_hash);
        assert_eq!(id.log_index, 0);
        assert_eq!(id, log.identity());
    }

    #[test]
    fn test_empty_data_is_empty_vec() {
        let json = r#"{
            "address": "0x03bd0d5d39629423979f8a0e53dbce78c1791ebf",
            "topics": [],
            "data": "0x",
            "blockHash": "0xfedcba0987654321fedcba0987654321fedcba0987654321fedcba0987654321",
            "blockNumber": "0x1",
            "logIndex": "0x1",
            "transactionHash": "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef"
        }"#;

        let log: Log = serde_json::from_str(json).unwrap();
        assert!(log.data.is_empty());
    }
}
