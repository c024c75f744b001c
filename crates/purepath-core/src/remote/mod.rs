//! Remote record store.
//!
//! One logical table of records keyed by private key, each holding a
//! serialized [`StreakData`]. Writes are create-or-replace: last writer
//! wins, there is no version check.

mod memory;
mod postgrest;

pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::identity::Identity;
use crate::streak::StreakData;

/// Every remote backend implements this trait.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend identifier for logs (e.g. "postgrest", "memory").
    fn name(&self) -> &str;

    /// Point lookup by key.
    ///
    /// Returns [`RemoteError::NotFound`] when no record exists, so callers
    /// can tell first use apart from an outage.
    async fn fetch(&self, key: &Identity) -> Result<StreakData, RemoteError>;

    /// Create or replace the record for `key`.
    async fn upsert(&self, key: &Identity, data: &StreakData) -> Result<(), RemoteError>;
}
