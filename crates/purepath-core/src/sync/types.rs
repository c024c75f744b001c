//! Sync status reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::RemoteError;

/// Current sync status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    /// The startup fetch is in flight.
    pub loading: bool,
    /// At least one push is in flight.
    pub syncing: bool,
    /// Number of pushes dispatched but not finished.
    pub pending_pushes: usize,
    /// Last successful remote round trip.
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Most recent swallowed remote failure.
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct MonitorInner {
    loading: AtomicBool,
    in_flight: AtomicUsize,
    last_sync_at: Mutex<Option<DateTime<Utc>>>,
    last_error: Mutex<Option<String>>,
}

/// Shared view of remote activity.
///
/// Cloned into every dispatched push so the tasks can report back, and
/// handed to callers that want to show a loading/syncing indicator while
/// the store itself is busy.
#[derive(Debug, Clone, Default)]
pub struct SyncMonitor {
    inner: Arc<MonitorInner>,
}

impl SyncMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SyncStatus {
        let pending = self.inner.in_flight.load(Ordering::SeqCst);
        SyncStatus {
            loading: self.inner.loading.load(Ordering::SeqCst),
            syncing: pending > 0,
            pending_pushes: pending,
            last_sync_at: *lock(&self.inner.last_sync_at),
            last_error: lock(&self.inner.last_error).clone(),
        }
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.inner.loading.store(loading, Ordering::SeqCst);
    }

    pub(crate) fn push_started(&self) {
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn push_finished(&self, result: &Result<(), RemoteError>) {
        match result {
            Ok(()) => self.record_success(),
            Err(e) => self.record_error(e),
        }
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn record_success(&self) {
        *lock(&self.inner.last_sync_at) = Some(Utc::now());
        *lock(&self.inner.last_error) = None;
    }

    pub(crate) fn record_error(&self, err: &RemoteError) {
        *lock(&self.inner.last_error) = Some(err.to_string());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
