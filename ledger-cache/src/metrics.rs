//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger cache.
//!
//! # Metrics
//!
//! - `ledger_appends_total` - Total number of entries appended
//! - `ledger_remote_failures_total` - Remote ledger calls that failed
//! - `ledger_hydrations_total` - Hydration attempts
//! - `ledger_hydration_fallbacks_total` - Hydrations served from the local snapshot
//! - `ledger_evictions_total` - Entries evicted at capacity
//! - `ledger_entries` - Current snapshot size

use prometheus::{IntCounter, IntGauge, Opts, Registry};

use crate::error::Result;

/// Metrics collector
///
/// Registers on a caller-supplied [`Registry`] rather than the process-wide
/// default, so several instances can coexist in one process.
#[derive(Debug, Clone)]
pub struct LedgerMetrics {
    /// Total entries appended
    pub appends_total: IntCounter,

    /// Remote ledger calls that failed
    pub remote_failures_total: IntCounter,

    /// Hydration attempts
    pub hydrations_total: IntCounter,

    /// Hydrations served from the local snapshot
    pub hydration_fallbacks_total: IntCounter,

    /// Entries evicted at capacity
    pub evictions_total: IntCounter,

    /// Current snapshot size
    pub entries: IntGauge,
}

impl LedgerMetrics {
    /// Create a new metrics collector registered on `registry`
    pub fn new(registry: &Registry) -> Result<Self> {
        let appends_total = IntCounter::with_opts(Opts::new(
            "ledger_appends_total",
            "Total number of entries appended",
        ))?;
        registry.register(Box::new(appends_total.clone()))?;

        let remote_failures_total = IntCounter::with_opts(Opts::new(
            "ledger_remote_failures_total",
            "Remote ledger calls that failed",
        ))?;
        registry.register(Box::new(remote_failures_total.clone()))?;

        let hydrations_total = IntCounter::with_opts(Opts::new(
            "ledger_hydrations_total",
            "Hydration attempts",
        ))?;
        registry.register(Box::new(hydrations_total.clone()))?;

        let hydration_fallbacks_total = IntCounter::with_opts(Opts::new(
            "ledger_hydration_fallbacks_total",
            "Hydrations served from the local snapshot",
        ))?;
        registry.register(Box::new(hydration_fallbacks_total.clone()))?;

        let evictions_total = IntCounter::with_opts(Opts::new(
            "ledger_evictions_total",
            "Entries evicted at capacity",
        ))?;
        registry.register(Box::new(evictions_total.clone()))?;

        let entries = IntGauge::with_opts(Opts::new(
            "ledger_entries",
            "Current snapshot size",
        ))?;
        registry.register(Box::new(entries.clone()))?;

        Ok(Self {
            appends_total,
            remote_failures_total,
            hydrations_total,
            hydration_fallbacks_total,
            evictions_total,
            entries,
        })
    }

    /// Record an appended entry
    pub fn record_append(&self) {
        self.appends_total.inc();
    }

    /// Record a failed remote call
    pub fn record_remote_failure(&self) {
        self.remote_failures_total.inc();
    }

    /// Record a hydration attempt
    pub fn record_hydration(&self) {
        self.hydrations_total.inc();
    }

    /// Record a hydration served from the local snapshot
    pub fn record_hydration_fallback(&self) {
        self.hydration_fallbacks_total.inc();
    }

    /// Record an eviction at capacity
    pub fn record_eviction(&self) {
        self.evictions_total.inc();
    }

    /// Update the snapshot size gauge
    pub fn set_entries(&self, count: usize) {
        self.entries.set(count as i64);
    }
}
