//! Snapshot persistence using RocksDB
//!
//! # Column Families
//!
//! - `snapshots` - the ledger snapshot document (single fixed key)
//!
//! The persisted unit is one bincode document holding the full ordered
//! entry array, newest first. Every mutation replaces the whole document,
//! so readers never observe a partially written snapshot.

use crate::{
    config::Config,
    error::{Error, Result},
    types::LedgerEntry,
};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Options, DB};

/// Column family names
const CF_SNAPSHOTS: &str = "snapshots";

/// Fixed key of the snapshot document
const SNAPSHOT_KEY: &[u8] = b"transactions";

/// Durable store for the ledger snapshot
pub struct SnapshotStore {
    db: DB,
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore").finish_non_exhaustive()
    }
}

impl SnapshotStore {
    /// Open or create the store
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        // Database options
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(
            CF_SNAPSHOTS,
            Self::cf_options_snapshots(),
        )];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!(path = ?path, "Opened snapshot store");

        Ok(Self { db })
    }

    fn cf_options_snapshots() -> Options {
        let mut opts = Options::default();
        opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
        opts
    }

    fn cf_handle(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_SNAPSHOTS)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", CF_SNAPSHOTS)))
    }

    /// Persist the snapshot, replacing any previous document
    pub fn save(&self, entries: &[LedgerEntry]) -> Result<()> {
        let cf = self.cf_handle()?;
        let value = bincode::serialize(entries)?;

        self.db.put_cf(cf, SNAPSHOT_KEY, &value)?;

        tracing::debug!(
            entries = entries.len(),
            bytes = value.len(),
            "Snapshot persisted"
        );

        Ok(())
    }

    /// Load the persisted snapshot
    ///
    /// A missing document yields `None`. So does a corrupt one: on this
    /// path corruption is treated as absence, never as a startup failure.
    pub fn load(&self) -> Result<Option<Vec<LedgerEntry>>> {
        let cf = self.cf_handle()?;

        let value = match self.db.get_cf(cf, SNAPSHOT_KEY)? {
            Some(value) => value,
            None => return Ok(None),
        };

        match bincode::deserialize::<Vec<LedgerEntry>>(&value) {
            Ok(entries) => Ok(Some(entries)),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "Corrupt snapshot document, treating as empty"
                );
                Ok(None)
            }
        }
    }

    /// Remove the persisted snapshot document
    pub fn clear(&self) -> Result<()> {
        let cf = self.cf_handle()?;
        self.db.delete_cf(cf, SNAPSHOT_KEY)?;

        tracing::debug!("Snapshot document removed");

        Ok(())
    }
}
