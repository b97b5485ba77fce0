//! Latest-known consensus round state
//!
//! Holds the `(config digest, epoch, round)` record and the merge rule that
//! keeps it monotonic under duplicate and out-of-order log delivery.

use crate::events::AggregatorEvent;
use crate::types::ConfigDigest;

/// Snapshot of the latest observed consensus round.
///
/// Starts zero-valued and is only ever superseded, never deleted. The pair
/// `(epoch, round)` is non-decreasing across `apply` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundState {
    /// Configuration the latest round request was made under
    pub config_digest: ConfigDigest,
    /// Consensus epoch of the latest round request
    pub epoch: u32,
    /// Round within that epoch
    pub round: u8,
}

impl RoundState {
    /// Epoch-major ordering key: the epoch in the high bits, the round in
    /// the low byte, mirroring the protocol's packed epoch-and-round
    /// counter.
    pub fn ordering_key(epoch: u32, round: u8) -> u64 {
        ((epoch as u64) << 8) | round as u64
    }

    /// The ordering key of this snapshot.
    pub fn key(&self) -> u64 {
        Self::ordering_key(self.epoch, self.round)
    }

    /// Merge a decoded event into the state.
    ///
    /// `RoundRequested` overwrites all three fields iff its key is strictly
    /// greater than the stored one; an equal key is a duplicate and a lower
    /// key is a reorg/out-of-order replay, both ignored. `ConfigSet`
    /// overwrites only the digest, last-observed-wins: config changes are
    /// sequenced by the chain itself and are not ordered against rounds
    /// here. Returns whether anything changed.
    pub fn apply(&mut self, event: &AggregatorEvent) -> bool {
        match event {
            AggregatorEvent::RoundRequested {
                config_digest,
                epoch,
                round,
            } => {
                if Self::ordering_key(*epoch, *round) <= self.key() {
                    return false;
                }
                self.config_digest = *config_digest;
                self.epoch = *epoch;
                self.round = *round;
                true
            }
            AggregatorEvent::ConfigSet { config_digest, .. } => {
                self.config_digest = *config_digest;
                true
            }
            AggregatorEvent::Unrecognized => false,
        }
    }
}
