//! Local-first streak store replicated to a remote record.
//!
//! The store owns the authoritative in-memory [`StreakData`]. Mutations
//! are applied locally first and republished immediately; the full
//! snapshot is then pushed to the remote record in a spawned task. Push
//! failures are logged and recorded in [`SyncStatus`] but never rolled
//! back or retried: local state stays authoritative until the next
//! successful push overwrites the remote copy.
//!
//! ## Flow
//!
//! ```text
//! set_identity ─► slot.store ─► initialize ─► fetch ─┬─ found      ─► adopt
//!                                                    ├─ not found  ─► upsert default, adopt
//!                                                    └─ failure    ─► log, keep local
//!
//! check_in / tick ─► StreakEngine ─► adopt + publish ─► spawn push (FIFO)
//! ```
//!
//! Pushes need a Tokio runtime; outside one they are skipped and the
//! failure is recorded in [`SyncStatus`].

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::types::{SyncMonitor, SyncStatus};
use crate::error::{RemoteError, Result};
use crate::events::StreakEvent;
use crate::identity::{Identity, IdentitySlot};
use crate::remote::RecordStore;
use crate::streak::{self, StreakData, StreakView, TimestampMs};

/// Default bound on the startup fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SyncedStore {
    remote: Arc<dyn RecordStore>,
    slot: Box<dyn IdentitySlot>,
    identity: Option<Identity>,
    data: StreakData,
    publisher: watch::Sender<StreakData>,
    monitor: SyncMonitor,
    /// Completion signal of the most recently dispatched push.
    last_push: Option<oneshot::Receiver<()>>,
    pending: Vec<JoinHandle<()>>,
    fetch_timeout: Duration,
}

impl SyncedStore {
    /// Create a logged-out store with default local state.
    pub fn new(remote: Arc<dyn RecordStore>, slot: Box<dyn IdentitySlot>) -> Self {
        let (publisher, _) = watch::channel(StreakData::default());
        Self {
            remote,
            slot,
            identity: None,
            data: StreakData::default(),
            publisher,
            monitor: SyncMonitor::new(),
            last_push: None,
            pending: Vec::new(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current local snapshot.
    pub fn snapshot(&self) -> &StreakData {
        &self.data
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Display snapshot at `now`.
    pub fn view(&self, now: TimestampMs) -> StreakView {
        streak::view(&self.data, now)
    }

    pub fn can_check_in(&self, now: TimestampMs) -> bool {
        streak::can_check_in(&self.data, now)
    }

    pub fn status(&self) -> SyncStatus {
        self.monitor.status()
    }

    /// Handle for observing loading/syncing while the store is busy.
    pub fn monitor(&self) -> SyncMonitor {
        self.monitor.clone()
    }

    /// Receive every snapshot the store adopts.
    pub fn subscribe(&self) -> watch::Receiver<StreakData> {
        self.publisher.subscribe()
    }

    // ── Identity ─────────────────────────────────────────────────────

    /// Validate and persist a user-entered key, then load its record.
    ///
    /// A key that is too short is rejected before anything is written or
    /// fetched. Local state starts from defaults so a previous user's data
    /// can never be pushed under the new key.
    pub async fn set_identity(&mut self, raw: &str) -> Result<StreakData> {
        let identity = Identity::parse(raw)?;
        self.slot.store(identity.as_str())?;
        info!(fingerprint = %identity.fingerprint(), "identity stored");

        self.adopt(StreakData::default());
        Ok(self.initialize(identity).await)
    }

    /// Resume the session cached in the identity slot, if any.
    pub async fn restore(&mut self) -> Result<Option<StreakData>> {
        let Some(raw) = self.slot.load()? else {
            debug!("no cached identity");
            return Ok(None);
        };
        match Identity::parse(&raw) {
            Ok(identity) => Ok(Some(self.initialize(identity).await)),
            Err(e) => {
                warn!(error = %e, "cached identity is invalid; clearing it");
                self.slot.clear()?;
                Ok(None)
            }
        }
    }

    /// Load the remote record for `key` and adopt it.
    ///
    /// A missing record is created from defaults. Any other failure, or a
    /// fetch exceeding the configured timeout, is logged and local state is
    /// kept. Never fails.
    pub async fn initialize(&mut self, key: Identity) -> StreakData {
        self.identity = Some(key.clone());
        self.monitor.set_loading(true);
        let outcome = tokio::time::timeout(self.fetch_timeout, self.fetch_or_create(&key)).await;
        self.monitor.set_loading(false);

        let result = outcome.unwrap_or_else(|_| {
            Err(RemoteError::Timeout {
                timeout_secs: self.fetch_timeout.as_secs(),
            })
        });

        match result {
            Ok(data) => {
                debug!(
                    fingerprint = %key.fingerprint(),
                    streak = data.current_streak,
                    "adopted remote record"
                );
                self.adopt(data.normalized());
            }
            Err(e) => {
                warn!(
                    fingerprint = %key.fingerprint(),
                    backend = self.remote.name(),
                    error = %e,
                    "remote fetch failed; keeping local state"
                );
                self.monitor.record_error(&e);
            }
        }
        self.data.clone()
    }

    async fn fetch_or_create(&self, key: &Identity) -> std::result::Result<StreakData, RemoteError> {
        match self.remote.fetch(key).await {
            Ok(data) => {
                self.monitor.record_success();
                Ok(data)
            }
            Err(RemoteError::NotFound) => {
                info!(fingerprint = %key.fingerprint(), "no remote record; creating one");
                let fresh = StreakData::default();
                match self.remote.upsert(key, &fresh).await {
                    Ok(()) => self.monitor.record_success(),
                    Err(e) => {
                        warn!(error = %e, "failed to create remote record");
                        self.monitor.record_error(&e);
                    }
                }
                Ok(fresh)
            }
            Err(e) => Err(e),
        }
    }

    /// Log out: clear the cached key and reset local state.
    ///
    /// The remote record is left untouched. Pushes already in flight finish
    /// against the old key.
    pub fn reset(&mut self) -> Result<StreakEvent> {
        self.slot.clear()?;
        if let Some(identity) = self.identity.take() {
            info!(fingerprint = %identity.fingerprint(), "logged out");
        }
        self.last_push = None;
        self.adopt(StreakData::default());
        Ok(StreakEvent::LoggedOut { at: Utc::now() })
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Record a check-in at `now` if allowed; otherwise a no-op.
    pub fn check_in(&mut self, now: TimestampMs) -> Option<StreakEvent> {
        let Some(next) = streak::apply_check_in(&self.data, now) else {
            debug!(now, "check-in ignored; still in cooldown");
            return None;
        };
        let event = StreakEvent::CheckedIn {
            streak: next.current_streak,
            max_streak: next.max_streak,
            at: now,
        };
        debug!(streak = next.current_streak, "checked in");
        self.adopt(next);
        self.push();
        Some(event)
    }

    /// Periodic re-evaluation; resets and pushes an expired streak.
    pub fn tick(&mut self, now: TimestampMs) -> Option<StreakEvent> {
        let lost_streak = self.data.current_streak;
        let next = streak::detect_expiry(&self.data, now)?;
        info!(lost_streak, "streak expired");
        self.adopt(next);
        self.push();
        Some(StreakEvent::StreakExpired {
            lost_streak,
            at: now,
        })
    }

    /// Wait for every dispatched push to finish.
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "push task did not complete");
            }
        }
    }

    fn adopt(&mut self, data: StreakData) {
        self.data = data;
        self.publisher.send_replace(self.data.clone());
    }

    /// Dispatch the current snapshot to the remote.
    ///
    /// Pushes are chained so the remote sees them in dispatch order.
    fn push(&mut self) {
        let Some(key) = self.identity.clone() else {
            debug!("no identity; push skipped");
            return;
        };

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(error = %e, "no async runtime; push skipped, local state kept");
                self.monitor
                    .record_error(&RemoteError::Unavailable("no async runtime".into()));
                return;
            }
        };

        let snapshot = self.data.clone();
        let remote = Arc::clone(&self.remote);
        let monitor = self.monitor.clone();
        let previous = self.last_push.take();
        let (done_tx, done_rx) = oneshot::channel();
        self.last_push = Some(done_rx);

        monitor.push_started();
        self.pending.retain(|handle| !handle.is_finished());
        self.pending.push(runtime.spawn(async move {
            if let Some(previous) = previous {
                // A dropped sender means the previous push already ended.
                let _ = previous.await;
            }
            let result = remote.upsert(&key, &snapshot).await;
            if let Err(e) = &result {
                warn!(
                    fingerprint = %key.fingerprint(),
                    error = %e,
                    "push failed; local state kept"
                );
            }
            monitor.push_finished(&result);
            let _ = done_tx.send(());
        }));
    }
}
