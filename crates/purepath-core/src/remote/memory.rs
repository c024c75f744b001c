use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::RecordStore;
use crate::error::RemoteError;
use crate::identity::Identity;
use crate::streak::StreakData;

#[derive(Default)]
struct Inner {
    records: Mutex<HashMap<String, StreakData>>,
    offline: AtomicBool,
    upserts: AtomicUsize,
}

/// In-process record store.
///
/// Used by `--offline` runs and by tests. Clones share the same records,
/// so a test can keep a handle while the store owns another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, StreakData>> {
        self.inner
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed a record directly, bypassing the offline switch.
    pub fn insert(&self, key: &str, data: StreakData) {
        self.records().insert(key.to_string(), data);
    }

    /// Read a record directly, bypassing the offline switch.
    pub fn get(&self, key: &str) -> Option<StreakData> {
        self.records().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Make every fetch/upsert fail with [`RemoteError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful upserts so far.
    pub fn upsert_count(&self) -> usize {
        self.inner.upserts.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), RemoteError> {
        if self.inner.offline.load(Ordering::SeqCst) {
            Err(RemoteError::Unavailable("memory store is offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, key: &Identity) -> Result<StreakData, RemoteError> {
        self.check_online()?;
        self.records()
            .get(key.as_str())
            .cloned()
            .ok_or(RemoteError::NotFound)
    }

    async fn upsert(&self, key: &Identity, data: &StreakData) -> Result<(), RemoteError> {
        self.check_online()?;
        self.records().insert(key.as_str().to_string(), data.clone());
        self.inner.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
