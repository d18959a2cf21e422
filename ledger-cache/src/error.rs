//! Error types for the ledger cache

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Remote-side failures are deliberately absent here: they are represented
/// by [`crate::remote::RemoteError`] and consumed on the spot (logged and
/// counted), because remote unavailability must never fail a local
/// operation.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Candidate entry rejected before persistence
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Feature key not present in the catalog
    #[error("Unknown feature key: {key}")]
    UnknownFeature {
        /// Offending key
        key: String,
    },

    /// Feature value kind does not match the catalog descriptor
    #[error("Feature '{key}' expects a {expected} value")]
    FeatureKind {
        /// Offending key
        key: String,
        /// Expected kind, as declared in the catalog
        expected: &'static str,
    },

    /// Operation attempted before hydration completed
    #[error("Ledger is not hydrated yet")]
    NotHydrated,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::Metrics(err.to_string())
    }
}
