//! FraudGuard Ledger Cache
//!
//! Local-first transaction ledger behind the fraud scoring dashboard.
//!
//! # Architecture
//!
//! - **Local First**: Every mutation lands in the local store; the remote
//!   ledger is a best-effort mirror
//! - **Remote Preferred on Read**: Hydration fetches from the remote
//!   authority and silently falls back to the persisted snapshot
//! - **Single Owner**: One service owns the in-memory snapshot; consumers
//!   only ever receive clones
//! - **Bounded**: The snapshot is capped at a configured capacity with
//!   oldest-first eviction

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod error;
pub mod export;
pub mod features;
pub mod metrics;
pub mod notify;
pub mod query;
pub mod remote;
pub mod scoring;
pub mod service;
pub mod stats;
pub mod store;
pub mod types;

// Re-exports
pub use config::{Config, RemoteConfig, RocksDBConfig, DEFAULT_CAPACITY};
pub use error::{Error, Result};
pub use export::{suggested_filename, to_csv, CSV_HEADER};
pub use features::{FeatureSchema, FeatureSpec, SCHEMA_VERSION};
pub use metrics::LedgerMetrics;
pub use notify::{NoticeLevel, Notifier, TracingNotifier};
pub use query::{query, PredictionFilter, QueryPage, QueryParams, DEFAULT_PAGE_SIZE};
pub use remote::{HttpRemoteLedger, RemoteError, RemoteLedger, RemoteResult};
pub use scoring::{HttpScoringClient, ScoringClient};
pub use service::{LedgerService, LedgerState, DEFAULT_IDENTITY};
pub use stats::LedgerStats;
pub use store::SnapshotStore;
pub use types::{
    AccountId, EntryDraft, EntryId, FeatureValue, LedgerEntry, Prediction, Verdict,
    HIGH_RISK_THRESHOLD,
};
