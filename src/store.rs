//! ConsumptionStore trait and RocksDB implementation
//!
//! Persists consumed-log markers so a restart does not re-apply logs that
//! already drove a state mutation, plus the delivery loop's block cursor.
//! Uses RocksDB with column families for efficient organization.

use crate::keys::{encode_consumption_key, encode_meta_key};
use crate::types::LogIdentity;
use anyhow::{Context, Result};
use rocksdb::{ColumnFamilyDescriptor, Options, DB};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Marker record stored per consumed log.
///
/// The block number ties the marker to chain history for inspection; the
/// job id scopes markers when several jobs share one database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    /// Number of the block the log was emitted in
    pub block_number: u64,
    /// Identifier of the job that consumed the log
    pub job_id: u32,
}

/// Trait defining the consumption-guard service.
///
/// Both calls are idempotent by design. Errors are surfaced to the caller,
/// which treats them as non-fatal: a failed check reads as "not yet
/// consumed", a failed mark merely costs redundant decode work later.
pub trait ConsumptionStore: Send + Sync {
    /// Has a state mutation already been driven by this log?
    fn was_already_consumed(&self, id: &LogIdentity) -> Result<bool>;

    /// Record that this log has been applied. Marking twice is a no-op.
    fn mark_consumed(&self, id: &LogIdentity, record: &ConsumptionRecord) -> Result<()>;

    /// Fetch the marker record for a log, if present.
    fn get_consumption(&self, id: &LogIdentity) -> Result<Option<ConsumptionRecord>>;

    /// Get the delivery cursor (last scanned block number).
    fn get_cursor(&self) -> Result<Option<u64>>;

    /// Set the delivery cursor.
    fn set_cursor(&self, block: u64) -> Result<()>;
}

/// RocksDB-backed implementation of ConsumptionStore.
///
/// Uses column families to organize the data:
/// - log_consumptions: consumed-log markers keyed by (block hash, log index)
/// - meta: metadata (delivery cursor)
pub struct RocksConsumptionStore {
    db: DB,
}

impl RocksConsumptionStore {
    /// Open or create a RocksDB database at the given path.
    ///
    /// Creates all required column families if they don't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let column_families = vec![
            ColumnFamilyDescriptor::new("log_consumptions", Options::default()),
            ColumnFamilyDescriptor::new("meta", Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, column_families)
            .context("Failed to open RocksDB database")?;

        Ok(Self { db })
    }

    /// Get a column family handle by name.
    fn get_cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .with_context(|| format!("Column family '{}' not found", name))
    }
}

impl ConsumptionStore for RocksConsumptionStore {
    fn was_already_consumed(&self, id: &LogIdentity) -> Result<bool> {
        let cf = self.get_cf("log_consumptions")?;
        let key = encode_consumption_key(id);
        let value = self
            .db
            .get_cf(cf, &key)
            .context("Failed to get consumption marker")?;
        Ok(value.is_some())
    }

    fn mark_consumed(&self, id: &LogIdentity, record: &ConsumptionRecord) -> Result<()> {
        let cf = self.get_cf("log_consumptions")?;
        let key = encode_consumption_key(id);
        let value =
            postcard::to_allocvec(record).context("Failed to serialize consumption record")?;
        self.db
            .put_cf(cf, &key, &value)
            .context("Failed to put consumption marker")?;
        Ok(())
    }

    fn get_consumption(&self, id: &LogIdentity) -> Result<Option<ConsumptionRecord>> {
        let cf = self.get_cf("log_consumptions")?;
        let key = encode_consumption_key(id);
        match self
            .db
            .get_cf(cf, &key)
            .context("Failed to get consumption marker")?
        {
            Some(bytes) => {
                let record = postcard::from_bytes(&bytes)
                    .context("Failed to deserialize consumption record")?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn get_cursor(&self) -> Result<Option<u64>> {
        let cf = self.get_cf("meta")?;
        let key = encode_meta_key(0x01); // 0x01 = delivery cursor
        match self.db.get_cf(cf, &key).context("Failed to get cursor")? {
            Some(bytes) => {
                if bytes.len() != 8 {
                    anyhow::bail!("Cursor must be 8 bytes (u64), got {}", bytes.len());
                }
                Ok(Some(u64::from_be_bytes(
                    bytes.try_into().expect("8 bytes for u64"),
                )))
            }
            None => Ok(None),
        }
    }

    fn set_cursor(&self, block: u64) -> Result<()> {
        let cf = self.get_cf("meta")?;
        let key = encode_meta_key(0x01); // 0x01 = delivery cursor
        self.db
            .put_cf(cf, &key, block.to_be_bytes())
            .context("Failed to set cursor")?;
        Ok(())
    }
}
