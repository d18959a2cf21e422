//! Operation outcome notifications
//!
//! The surrounding dashboard surfaces ledger outcomes to the operator
//! (entry recorded, remote unreachable, cache cleared). The service reports
//! them through this trait instead of calling a process-wide function, so
//! hosts inject their own sink and tests can record what was said.

/// Severity of a notice, mirroring the dashboard's toast levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational
    Info,
    /// Operation completed
    Success,
    /// Degraded but recovered (e.g. remote unavailable)
    Warning,
    /// Operation rejected
    Error,
}

/// Observer for user-facing operation outcomes
pub trait Notifier: Send + Sync {
    /// Deliver one notice
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Default notifier that forwards notices to the tracing subscriber
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => tracing::info!("{}", message),
            NoticeLevel::Warning => tracing::warn!("{}", message),
            NoticeLevel::Error => tracing::error!("{}", message),
        }
    }
}
