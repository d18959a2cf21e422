//! Ledger service
//!
//! Single owner of the in-memory snapshot and the only writer of the local
//! store. Hydration prefers the remote ledger and falls back to the
//! persisted snapshot; appends commit locally no matter what the remote
//! does. Consumers only ever see cloned snapshots, so a mutation is atomic
//! from their point of view.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::export;
use crate::features::FeatureSchema;
use crate::metrics::LedgerMetrics;
use crate::notify::{NoticeLevel, Notifier};
use crate::query::{self, QueryPage, QueryParams};
use crate::remote::RemoteLedger;
use crate::stats::LedgerStats;
use crate::store::SnapshotStore;
use crate::types::{EntryDraft, LedgerEntry};

/// Identity used to scope remote fetches when none is established
pub const DEFAULT_IDENTITY: &str = "local-user";

/// Lifecycle of the in-memory snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    /// No hydration attempted yet
    Uninitialized,
    /// A hydration is in flight
    Hydrating,
    /// Snapshot available; all operations allowed
    Ready,
}

enum SnapshotState {
    Uninitialized,
    Hydrating,
    Ready(Vec<LedgerEntry>),
}

/// The transaction ledger service
pub struct LedgerService {
    store: SnapshotStore,
    remote: Arc<dyn RemoteLedger>,
    notifier: Arc<dyn Notifier>,
    schema: Arc<FeatureSchema>,
    metrics: LedgerMetrics,
    capacity: usize,
    fetch_limit: usize,
    snapshot: RwLock<SnapshotState>,
    identity: RwLock<String>,
}

impl fmt::Debug for LedgerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerService")
            .field("capacity", &self.capacity)
            .field("fetch_limit", &self.fetch_limit)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl LedgerService {
    /// Create a new service; no hydration happens here
    pub fn new(
        store: SnapshotStore,
        remote: Arc<dyn RemoteLedger>,
        notifier: Arc<dyn Notifier>,
        schema: Arc<FeatureSchema>,
        metrics: LedgerMetrics,
        config: &Config,
    ) -> Result<Self> {
        schema.validate()?;

        if config.capacity == 0 {
            return Err(Error::Config(
                "Ledger capacity must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            store,
            remote,
            notifier,
            schema,
            metrics,
            capacity: config.capacity,
            fetch_limit: config.remote.fetch_limit,
            snapshot: RwLock::new(SnapshotState::Uninitialized),
            identity: RwLock::new(DEFAULT_IDENTITY.to_string()),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> LedgerState {
        match &*self.snapshot.read() {
            SnapshotState::Uninitialized => LedgerState::Uninitialized,
            SnapshotState::Hydrating => LedgerState::Hydrating,
            SnapshotState::Ready(_) => LedgerState::Ready,
        }
    }

    /// Identity the snapshot is currently scoped to
    pub fn identity(&self) -> String {
        self.identity.read().clone()
    }

    /// Hydrate the snapshot, remote-preferred
    ///
    /// On remote success the fetched entries replace the snapshot and the
    /// persisted copy. On any remote failure the persisted local snapshot
    /// (or an empty one) is used instead; the failure is logged and counted
    /// but never surfaced as an error. Local storage faults do fail the
    /// hydration.
    pub async fn hydrate(&self, identity: &str) -> Result<Vec<LedgerEntry>> {
        *self.snapshot.write() = SnapshotState::Hydrating;
        *self.identity.write() = identity.to_string();
        self.metrics.record_hydration();

        let entries = match self.remote.fetch_entries(identity, self.fetch_limit).await {
            Ok(mut entries) => {
                entries.truncate(self.capacity);
                if let Err(err) = self.store.save(&entries) {
                    *self.snapshot.write() = SnapshotState::Uninitialized;
                    return Err(err);
                }

                tracing::info!(
                    source = self.remote.name(),
                    identity = %identity,
                    count = entries.len(),
                    "Hydrated ledger from remote"
                );
                self.notifier
                    .notify(NoticeLevel::Info, "Loaded transactions from backend");
                entries
            }
            Err(err) => {
                self.metrics.record_remote_failure();
                self.metrics.record_hydration_fallback();
                tracing::warn!(error = %err, "Remote ledger unavailable, using local snapshot");

                match self.store.load() {
                    Ok(local) => local.unwrap_or_default(),
                    Err(err) => {
                        *self.snapshot.write() = SnapshotState::Uninitialized;
                        return Err(err);
                    }
                }
            }
        };

        self.metrics.set_entries(entries.len());
        *self.snapshot.write() = SnapshotState::Ready(entries.clone());
        Ok(entries)
    }

    /// Validate, finalize and append a candidate entry
    ///
    /// The entry is mirrored to the remote ledger on a best-effort basis;
    /// a mirror failure is reported through the notifier and metrics but the
    /// local append still succeeds. Returns the finalized entry.
    pub async fn append(&self, draft: EntryDraft) -> Result<LedgerEntry> {
        self.ensure_ready()?;
        draft.validate(&self.schema)?;
        let entry = draft.finalize();

        if let Err(err) = self.remote.mirror_entry(&entry).await {
            self.metrics.record_remote_failure();
            tracing::warn!(
                error = %err,
                entry_id = %entry.id,
                "Backend unavailable, saving locally"
            );
            self.notifier.notify(
                NoticeLevel::Warning,
                "Backend unavailable, transaction saved locally",
            );
        }

        {
            // State may have moved while the mirror call was in flight
            let mut snapshot = self.snapshot.write();
            let entries = match &mut *snapshot {
                SnapshotState::Ready(entries) => entries,
                _ => return Err(Error::NotHydrated),
            };

            entries.insert(0, entry.clone());
            while entries.len() > self.capacity {
                entries.pop();
                self.metrics.record_eviction();
            }

            self.store.save(entries)?;
            self.metrics.set_entries(entries.len());
        }

        self.metrics.record_append();
        self.notifier
            .notify(NoticeLevel::Success, "Transaction saved successfully");
        tracing::info!(entry_id = %entry.id, "Transaction appended");

        Ok(entry)
    }

    /// Empty the snapshot and delete the persisted copy
    ///
    /// Strictly local; the remote ledger is not contacted.
    pub fn clear(&self) -> Result<()> {
        {
            let mut snapshot = self.snapshot.write();
            match &mut *snapshot {
                SnapshotState::Ready(entries) => {
                    self.store.clear()?;
                    entries.clear();
                    self.metrics.set_entries(0);
                }
                _ => return Err(Error::NotHydrated),
            }
        }

        self.notifier
            .notify(NoticeLevel::Warning, "All transactions cleared");
        tracing::info!("Local transaction history cleared");

        Ok(())
    }

    /// Cloned copy of the snapshot, newest first
    pub fn snapshot(&self) -> Result<Vec<LedgerEntry>> {
        match &*self.snapshot.read() {
            SnapshotState::Ready(entries) => Ok(entries.clone()),
            _ => Err(Error::NotHydrated),
        }
    }

    /// Statistics over the current snapshot
    pub fn stats(&self) -> Result<LedgerStats> {
        match &*self.snapshot.read() {
            SnapshotState::Ready(entries) => Ok(LedgerStats::compute(entries)),
            _ => Err(Error::NotHydrated),
        }
    }

    /// Search, filter and paginate the current snapshot
    pub fn query(&self, params: &QueryParams) -> Result<QueryPage> {
        match &*self.snapshot.read() {
            SnapshotState::Ready(entries) => Ok(query::query(entries, params)),
            _ => Err(Error::NotHydrated),
        }
    }

    /// Render the current snapshot as CSV
    pub fn export_csv(&self) -> Result<String> {
        match &*self.snapshot.read() {
            SnapshotState::Ready(entries) => Ok(export::to_csv(entries)),
            _ => Err(Error::NotHydrated),
        }
    }

    /// The feature catalog this service validates against
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn ensure_ready(&self) -> Result<()> {
        if matches!(&*self.snapshot.read(), SnapshotState::Ready(_)) {
            Ok(())
        } else {
            Err(Error::NotHydrated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PredictionFilter;
    use crate::remote::{RemoteError, RemoteResult};
    use crate::types::{AccountId, Prediction, Verdict};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[derive(Default)]
    struct StubRemote {
        entries: Vec<LedgerEntry>,
        fetch_fails: bool,
        mirror_fails: bool,
        mirror_times_out: bool,
        mirrored: Mutex<usize>,
    }

    #[async_trait]
    impl RemoteLedger for StubRemote {
        async fn fetch_entries(
            &self,
            _identity: &str,
            limit: usize,
        ) -> RemoteResult<Vec<LedgerEntry>> {
            if self.fetch_fails {
                return Err(RemoteError::Network("connection refused".to_string()));
            }
            Ok(self.entries.iter().take(limit).cloned().collect())
        }

        async fn mirror_entry(&self, _entry: &LedgerEntry) -> RemoteResult<()> {
            if self.mirror_times_out {
                return Err(RemoteError::Timeout {
                    seconds: 5,
                    operation: "mirror entry".to_string(),
                });
            }
            if self.mirror_fails {
                return Err(RemoteError::Status { status: 500 });
            }
            *self.mirrored.lock() += 1;
            Ok(())
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Mutex<Vec<(NoticeLevel, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, level: NoticeLevel, message: &str) {
            self.notices.lock().push((level, message.to_string()));
        }
    }

    impl RecordingNotifier {
        fn levels(&self) -> Vec<NoticeLevel> {
            self.notices.lock().iter().map(|(level, _)| *level).collect()
        }
    }

    struct Harness {
        service: LedgerService,
        remote: Arc<StubRemote>,
        notifier: Arc<RecordingNotifier>,
        metrics: LedgerMetrics,
        dir: TempDir,
    }

    fn harness(remote: StubRemote) -> Harness {
        harness_with(remote, 100, tempfile::tempdir().unwrap())
    }

    fn harness_with(remote: StubRemote, capacity: usize, dir: TempDir) -> Harness {
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            capacity,
            ..Config::default()
        };

        let store = SnapshotStore::open(&config).unwrap();
        let remote = Arc::new(remote);
        let notifier = Arc::new(RecordingNotifier::default());
        let metrics = LedgerMetrics::new(&prometheus::Registry::new()).unwrap();

        let service = LedgerService::new(
            store,
            remote.clone(),
            notifier.clone(),
            Arc::new(FeatureSchema::builtin()),
            metrics.clone(),
            &config,
        )
        .unwrap();

        Harness {
            service,
            remote,
            notifier,
            metrics,
            dir,
        }
    }

    fn draft(amount: Decimal) -> EntryDraft {
        EntryDraft::new(AccountId::new("AC1"), AccountId::new("AC2"), amount)
    }

    fn remote_entry(prediction: Prediction) -> LedgerEntry {
        draft(dec!(250))
            .with_verdict(Verdict::new(prediction, 0.5))
            .finalize()
    }

    #[tokio::test]
    async fn test_operations_require_hydration() {
        let h = harness(StubRemote::default());

        assert_eq!(h.service.state(), LedgerState::Uninitialized);
        assert!(matches!(h.service.snapshot(), Err(Error::NotHydrated)));
        assert!(matches!(h.service.stats(), Err(Error::NotHydrated)));
        assert!(matches!(h.service.clear(), Err(Error::NotHydrated)));
        assert!(matches!(
            h.service.append(draft(dec!(100))).await,
            Err(Error::NotHydrated)
        ));
    }

    #[tokio::test]
    async fn test_hydrate_prefers_remote() {
        let remote = StubRemote {
            entries: vec![
                remote_entry(Prediction::Fraudulent),
                remote_entry(Prediction::Legitimate),
            ],
            ..StubRemote::default()
        };
        let h = harness(remote);

        let hydrated = h.service.hydrate(DEFAULT_IDENTITY).await.unwrap();

        assert_eq!(hydrated.len(), 2);
        assert_eq!(h.service.state(), LedgerState::Ready);
        assert_eq!(h.service.snapshot().unwrap().len(), 2);
        assert_eq!(h.metrics.hydrations_total.get(), 1);
        assert_eq!(h.metrics.hydration_fallbacks_total.get(), 0);
        assert_eq!(h.notifier.levels(), vec![NoticeLevel::Info]);
    }

    #[tokio::test]
    async fn test_hydrate_falls_back_to_local_snapshot() {
        let dir = {
            let remote = StubRemote {
                entries: vec![remote_entry(Prediction::Legitimate)],
                ..StubRemote::default()
            };
            let h = harness(remote);
            h.service.hydrate(DEFAULT_IDENTITY).await.unwrap();
            h.service.append(draft(dec!(999))).await.unwrap();
            h.dir
        };

        // Same data directory, remote now unreachable
        let failing = StubRemote {
            fetch_fails: true,
            ..StubRemote::default()
        };
        let h = harness_with(failing, 100, dir);

        let hydrated = h.service.hydrate(DEFAULT_IDENTITY).await.unwrap();

        assert_eq!(hydrated.len(), 2);
        assert_eq!(hydrated[0].amount, dec!(999));
        assert_eq!(h.service.state(), LedgerState::Ready);
        assert_eq!(h.metrics.hydration_fallbacks_total.get(), 1);
        assert_eq!(h.metrics.remote_failures_total.get(), 1);
        // The silent fallback surfaces nothing to the operator
        assert!(h.notifier.levels().is_empty());
    }

    #[tokio::test]
    async fn test_hydrate_failure_with_no_local_snapshot_starts_empty() {
        let remote = StubRemote {
            fetch_fails: true,
            ..StubRemote::default()
        };
        let h = harness(remote);

        let hydrated = h.service.hydrate(DEFAULT_IDENTITY).await.unwrap();

        assert!(hydrated.is_empty());
        assert_eq!(h.service.state(), LedgerState::Ready);
        assert_eq!(h.service.stats().unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_hydrate_truncates_to_capacity() {
        let remote = StubRemote {
            entries: vec![
                remote_entry(Prediction::Legitimate),
                remote_entry(Prediction::Legitimate),
                remote_entry(Prediction::Legitimate),
            ],
            ..StubRemote::default()
        };
        let h = harness_with(remote, 2, tempfile::tempdir().unwrap());

        let hydrated = h.service.hydrate(DEFAULT_IDENTITY).await.unwrap();

        assert_eq!(hydrated.len(), 2);
    }

    #[tokio::test]
    async fn test_append_succeeds_when_remote_mirror_fails() {
        let remote = StubRemote {
            mirror_fails: true,
            ..StubRemote::default()
        };
        let h = harness(remote);
        h.service.hydrate(DEFAULT_IDENTITY).await.unwrap();

        let entry = h.service.append(draft(dec!(512.5))).await.unwrap();

        let snapshot = h.service.snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, entry.id);
        assert_eq!(h.metrics.remote_failures_total.get(), 1);
        assert_eq!(h.metrics.appends_total.get(), 1);
        assert_eq!(
            h.notifier.levels(),
            vec![
                NoticeLevel::Info,
                NoticeLevel::Warning,
                NoticeLevel::Success
            ]
        );
    }

    #[tokio::test]
    async fn test_append_succeeds_when_remote_times_out() {
        let remote = StubRemote {
            mirror_times_out: true,
            ..StubRemote::default()
        };
        let h = harness(remote);
        h.service.hydrate(DEFAULT_IDENTITY).await.unwrap();

        h.service.append(draft(dec!(100))).await.unwrap();

        assert_eq!(h.service.snapshot().unwrap().len(), 1);
        assert_eq!(h.metrics.remote_failures_total.get(), 1);
    }

    #[tokio::test]
    async fn test_append_mirrors_to_remote_on_success() {
        let h = harness(StubRemote::default());
        h.service.hydrate(DEFAULT_IDENTITY).await.unwrap();

        h.service.append(draft(dec!(100))).await.unwrap();

        assert_eq!(*h.remote.mirrored.lock(), 1);
        assert_eq!(h.metrics.remote_failures_total.get(), 0);
    }

    #[tokio::test]
    async fn test_capacity_eviction_drops_oldest() {
        let h = harness_with(StubRemote::default(), 2, tempfile::tempdir().unwrap());
        h.service.hydrate(DEFAULT_IDENTITY).await.unwrap();

        h.service.append(draft(dec!(1))).await.unwrap();
        h.service.append(draft(dec!(2))).await.unwrap();
        h.service.append(draft(dec!(3))).await.unwrap();

        let snapshot = h.service.snapshot().unwrap();
        let amounts: Vec<Decimal> = snapshot.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![dec!(3), dec!(2)]);
        assert_eq!(h.metrics.evictions_total.get(), 1);
        assert_eq!(h.metrics.entries.get(), 2);
    }

    #[tokio::test]
    async fn test_append_rejects_invalid_draft_before_any_side_effect() {
        let h = harness(StubRemote::default());
        h.service.hydrate(DEFAULT_IDENTITY).await.unwrap();

        let blank = EntryDraft::new(AccountId::new(""), AccountId::new("AC2"), dec!(100));
        let err = h.service.append(blank).await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(h.service.snapshot().unwrap().is_empty());
        assert_eq!(*h.remote.mirrored.lock(), 0);
    }

    #[tokio::test]
    async fn test_clear_is_local_only() {
        let remote = StubRemote {
            entries: vec![remote_entry(Prediction::Legitimate)],
            ..StubRemote::default()
        };
        let h = harness(remote);
        h.service.hydrate(DEFAULT_IDENTITY).await.unwrap();
        h.service.append(draft(dec!(100))).await.unwrap();

        h.service.clear().unwrap();

        assert!(h.service.snapshot().unwrap().is_empty());
        assert_eq!(h.service.stats().unwrap().total, 0);
        assert_eq!(h.metrics.entries.get(), 0);
        assert_eq!(
            h.notifier.levels().last(),
            Some(&NoticeLevel::Warning)
        );

        // Only the append touched the remote side
        assert_eq!(*h.remote.mirrored.lock(), 1);
    }

    #[tokio::test]
    async fn test_cleared_snapshot_stays_empty_across_restart() {
        let dir = {
            let h = harness(StubRemote::default());
            h.service.hydrate(DEFAULT_IDENTITY).await.unwrap();
            h.service.append(draft(dec!(100))).await.unwrap();
            h.service.clear().unwrap();
            h.dir
        };

        let failing = StubRemote {
            fetch_fails: true,
            ..StubRemote::default()
        };
        let h = harness_with(failing, 100, dir);

        let hydrated = h.service.hydrate(DEFAULT_IDENTITY).await.unwrap();
        assert!(hydrated.is_empty());
    }

    #[tokio::test]
    async fn test_stats_and_query_over_snapshot() {
        let remote = StubRemote {
            entries: vec![
                remote_entry(Prediction::Fraudulent),
                remote_entry(Prediction::Legitimate),
            ],
            ..StubRemote::default()
        };
        let h = harness(remote);
        h.service.hydrate(DEFAULT_IDENTITY).await.unwrap();

        let stats = h.service.stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.frauds, 1);
        assert_eq!(stats.accuracy_proxy, 50.0);

        let page = h
            .service
            .query(&QueryParams::default().with_filter(PredictionFilter::Fraud))
            .unwrap();
        assert_eq!(page.total_matches, 1);

        let csv = h.service.export_csv().unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_identity_tracking() {
        let h = harness(StubRemote::default());

        assert_eq!(h.service.identity(), DEFAULT_IDENTITY);

        h.service.hydrate("analyst@example.com").await.unwrap();
        assert_eq!(h.service.identity(), "analyst@example.com");
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            capacity: 0,
            ..Config::default()
        };

        let store = SnapshotStore::open(&config).unwrap();
        let result = LedgerService::new(
            store,
            Arc::new(StubRemote::default()),
            Arc::new(RecordingNotifier::default()),
            Arc::new(FeatureSchema::builtin()),
            LedgerMetrics::new(&prometheus::Registry::new()).unwrap(),
            &config,
        );

        assert!(matches!(result, Err(Error::Config(_))));
    }
}
