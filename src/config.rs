//! Configuration parsing helpers
//!
//! Hex parsing for the identifiers the binaries accept on the command
//! line: contract addresses, block hashes, and config digests.

use crate::types::ConfigDigest;
use alloy_primitives::{Address, B256};
use anyhow::{Context, Result};

/// Pad an odd-length hex string with a leading zero.
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

/// Parse an address from a hex string.
///
/// Accepts addresses with or without 0x prefix.
pub fn parse_address(s: &str) -> Result<Address> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let s = pad_hex_string(s);
    let bytes = hex::decode(&s).with_context(|| format!("Invalid hex address: {}", s))?;

    if bytes.len() != 20 {
        anyhow::bail!(
            "Address must be 20 bytes (40 hex chars), got {} bytes",
            bytes.len()
        );
    }

    Ok(Address::from_slice(&bytes))
}

/// Parse a 32-byte hash from a hex string.
pub fn parse_hash(s: &str) -> Result<B256> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let s = pad_hex_string(s);
    let bytes = hex::decode(&s).with_context(|| format!("Invalid hex hash: {}", s))?;

    if bytes.len() != 32 {
        anyhow::bail!(
            "Hash must be 32 bytes (64 hex chars), got {} bytes",
            bytes.len()
        );
    }

    Ok(B256::from_slice(&bytes))
}

/// Parse a 16-byte config digest from a hex string.
pub fn parse_digest(s: &str) -> Result<ConfigDigest> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let s = pad_hex_string(s);
    let bytes = hex::decode(&s).with_context(|| format!("Invalid hex digest: {}", s))?;

    if bytes.len() != 16 {
        anyhow::bail!(
            "Config digest must be 16 bytes (32 hex chars), got {} bytes",
            bytes.len()
        );
    }

    Ok(ConfigDigest::from_slice(&bytes))
}
