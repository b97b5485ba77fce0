//! Key encoding for the consumption-marker store
//!
//! All keys use a single-byte prefix followed by binary data.
//! This ensures deterministic, lexicographically ordered keys in RocksDB.

use crate::types::LogIdentity;

/// Encode a consumption-marker key.
///
/// Format: byte 'L' (0x4C) + block hash (32 bytes) + log index (8 bytes, big-endian)
/// Total length: 41 bytes
pub fn encode_consumption_key(id: &LogIdentity) -> Vec<u8> {
    let mut key = Vec::with_capacity(41);
    key.push(b'L');
    key.extend_from_slice(id.block_hash.as_slice());
    key.extend_from_slice(&id.log_index.to_be_bytes());
    key
}

/// Encode a meta key.
///
/// Format: byte 'M' (0x4D) + meta_id (1 byte)
/// Total length: 2 bytes
///
/// Meta IDs:
/// - 0x01: delivery cursor (last scanned block)
pub fn encode_meta_key(meta_id: u8) -> Vec<u8> {
    vec![b'M', meta_id]
}
