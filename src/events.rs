//! Aggregator event decoding
//!
//! Pure mapping from a raw contract log (topics + data) to a typed event.
//! Malformed or unmatched logs decode to `Unrecognized`; decoding never
//! fails and touches no state.

use crate::types::{ConfigDigest, Log};
use alloy_primitives::{keccak256, B256};
use std::sync::LazyLock;

/// Solidity signature of the round-request event.
///
/// `requester` is indexed; `configDigest`, `epoch`, and `round` ride in the
/// data section as three 32-byte words.
const ROUND_REQUESTED_SIG: &str = "RoundRequested(address,bytes16,uint32,uint8)";

/// Solidity signature of the configuration-change event. All arguments are
/// unindexed; only the first three head words are decoded here.
const CONFIG_SET_SIG: &str =
    "ConfigSet(uint32,bytes16,uint64,address[],address[],uint8,uint64,bytes)";

static ROUND_REQUESTED_TOPIC: LazyLock<B256> =
    LazyLock::new(|| keccak256(ROUND_REQUESTED_SIG.as_bytes()));

static CONFIG_SET_TOPIC: LazyLock<B256> =
    LazyLock::new(|| keccak256(CONFIG_SET_SIG.as_bytes()));

/// topic0 identifying a `RoundRequested` log.
pub fn round_requested_topic() -> B256 {
    *ROUND_REQUESTED_TOPIC
}

/// topic0 identifying a `ConfigSet` log.
pub fn config_set_topic() -> B256 {
    *CONFIG_SET_TOPIC
}

/// Typed event decoded from an aggregator contract log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregatorEvent {
    /// A transmitter asked for a new reporting round.
    RoundRequested {
        /// Configuration the request was made under
        config_digest: ConfigDigest,
        /// Consensus epoch of the request
        epoch: u32,
        /// Round within the epoch
        round: u8,
    },
    /// The contract's reporting configuration changed.
    ConfigSet {
        /// Digest of the new configuration
        config_digest: ConfigDigest,
        /// Block number of the previous configuration change
        previous_config_block_number: u32,
        /// Total number of configurations ever set
        config_count: u64,
    },
    /// Log did not match any recognized event signature.
    Unrecognized,
}

/// Decode a raw log into a typed event.
///
/// Returns `Unrecognized` for logs with a foreign topic0, missing topics,
/// or truncated data. Callers treat `Unrecognized` as a no-op.
pub fn decode(log: &Log) -> AggregatorEvent {
    let Some(topic0) = log.topics.first() else {
        return AggregatorEvent::Unrecognized;
    };

    if *topic0 == *ROUND_REQUESTED_TOPIC {
        decode_round_requested(log).unwrap_or(AggregatorEvent::Unrecognized)
    } else if *topic0 == *CONFIG_SET_TOPIC {
        decode_config_set(log).unwrap_or(AggregatorEvent::Unrecognized)
    } else {
        AggregatorEvent::Unrecognized
    }
}

/// Data layout: word 0 = configDigest (bytes16, left-aligned),
/// word 1 = epoch (uint32), word 2 = round (uint8).
fn decode_round_requested(log: &Log) -> Option<AggregatorEvent> {
    // topic1 carries the indexed requester; its absence means a log that
    // merely reuses the selector.
    if log.topics.len() < 2 {
        return None;
    }

    let digest_word = word(&log.data, 0)?;
    let epoch_word = word(&log.data, 1)?;
    let round_word = word(&log.data, 2)?;

    let config_digest = ConfigDigest::from_slice(&digest_word[0..16]);
    let epoch = u32::from_be_bytes(epoch_word[28..32].try_into().ok()?);
    let round = round_word[31];

    Some(AggregatorEvent::RoundRequested {
        config_digest,
        epoch,
        round,
    })
}

/// Data layout (head words): word 0 = previousConfigBlockNumber (uint32),
/// word 1 = configDigest (bytes16, left-aligned), word 2 = configCount
/// (uint64). The signer/transmitter arrays that follow are not needed here.
fn decode_config_set(log: &Log) -> Option<AggregatorEvent> {
    let prev_word = word(&log.data, 0)?;
    let digest_word = word(&log.data, 1)?;
    let count_word = word(&log.data, 2)?;

    let previous_config_block_number = u32::from_be_bytes(prev_word[28..32].try_into().ok()?);
    let config_digest = ConfigDigest::from_slice(&digest_word[0..16]);
    let config_count = u64::from_be_bytes(count_word[24..32].try_into().ok()?);

    Some(AggregatorEvent::ConfigSet {
        config_digest,
        previous_config_block_number,
        config_count,
    })
}

/// Fetch the i-th 32-byte word of the data section.
fn word(data: &[u8], i: usize) -> Option<&[u8]> {
    let start = i.checked_mul(32)?;
    let end = start.checked_add(32)?;
    data.get(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{b256, Address, B256};

    fn fixture_log(topics: Vec<B256>, data: Vec<u8>) -> Log {
        let json = serde_json::json!({
            "address": "0x03bd0d5d39629423979f8a0e53dbce78c1791ebf",
            "topics": topics.iter().map(|t| format!("{t}")).collect::<Vec<_>>(),
            "data": format!("0x{}", hex::encode(data)),
            "blockHash": "0xfedcba0987654321fedcba0987654321fedcba0987654321fedcba0987654321",
            "blockNumber": "0x2a",
            "logIndex": "0x0",
            "transactionHash": "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef"
        });
        serde_json::from_value(json).unwrap()
    }

    fn digest_word(digest: ConfigDigest) -> [u8; 32] {
        let mut w = [0u8; 32];
        w[0..16].copy_from_slice(digest.as_slice());
        w
    }

    fn u64_word(v: u64) -> [u8; 32] {
        let mut w = [0u8; 32];
        w[24..32].copy_from_slice(&v.to_be_bytes());
        w
    }

    fn round_requested_data(digest: ConfigDigest, epoch: u32, round: u8) -> Vec<u8> {
        let mut data = Vec::with_capacity(96);
        data.extend_from_slice(&digest_word(digest));
        data.extend_from_slice(&u64_word(epoch as u64));
        data.extend_from_slice(&u64_word(round as u64));
        data
    }

    fn requester_topic() -> B256 {
        let mut t = [0u8; 32];
        t[12..32].copy_from_slice(Address::repeat_byte(0x11).as_slice());
        B256::from(t)
    }

    fn test_digest() -> ConfigDigest {
        ConfigDigest::from_slice(&hex::decode("92eed6d902b18bdbf881402d47631bcd").unwrap())
    }

    #[test]
    fn test_decode_round_requested() {
        let log = fixture_log(
            vec![round_requested_topic(), requester_topic()],
            round_requested_data(test_digest(), 1, 1),
        );

        let event = decode(&log);
        assert_eq!(
            event,
            AggregatorEvent::RoundRequested {
                config_digest: test_digest(),
                epoch: 1,
                round: 1,
            }
        );
    }

    #[test]
    fn test_decode_round_requested_large_counters() {
        let log = fixture_log(
            vec![round_requested_topic(), requester_topic()],
            round_requested_data(test_digest(), 0xdead_beef, 0xfe),
        );

        match decode(&log) {
            AggregatorEvent::RoundRequested { epoch, round, .. } => {
                assert_eq!(epoch, 0xdead_beef);
                assert_eq!(round, 0xfe);
            }
            other => panic!("expected RoundRequested, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_config_set() {
        let mut data = Vec::new();
        data.extend_from_slice(&u64_word(12345)); // previousConfigBlockNumber
        data.extend_from_slice(&digest_word(test_digest()));
        data.extend_from_slice(&u64_word(7)); // configCount
        // Tail words (array offsets etc.) are irrelevant to the decoder.
        data.extend_from_slice(&u64_word(0x100));

        let log = fixture_log(vec![config_set_topic()], data);
        assert_eq!(
            decode(&log),
            AggregatorEvent::ConfigSet {
                config_digest: test_digest(),
                previous_config_block_number: 12345,
                config_count: 7,
            }
        );
    }

    #[test]
    fn test_unknown_topic_is_unrecognized() {
        let log = fixture_log(
            vec![b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")],
            round_requested_data(test_digest(), 1, 1),
        );
        assert_eq!(decode(&log), AggregatorEvent::Unrecognized);
    }

    #[test]
    fn test_no_topics_is_unrecognized() {
        let log = fixture_log(vec![], vec![]);
        assert_eq!(decode(&log), AggregatorEvent::Unrecognized);
    }

    #[test]
    fn test_missing_requester_topic_is_unrecognized() {
        let log = fixture_log(
            vec![round_requested_topic()],
            round_requested_data(test_digest(), 1, 1),
        );
        assert_eq!(decode(&log), AggregatorEvent::Unrecognized);
    }

    #[test]
    fn test_truncated_data_is_unrecognized() {
        let mut data = round_requested_data(test_digest(), 1, 1);
        data.truncate(64);
        let log = fixture_log(vec![round_requested_topic(), requester_topic()], data);
        assert_eq!(decode(&log), AggregatorEvent::Unrecognized);
    }

    #[test]
    fn test_topics_differ() {
        assert_ne!(round_requested_topic(), config_set_topic());
    }
}
