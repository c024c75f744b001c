//! Remote synchronization layer.
//!
//! [`SyncedStore`] keeps the local streak state and replicates it to a
//! [`crate::remote::RecordStore`] with last-writer-wins upserts.
//! [`run_session`] is the clock-and-input loop around it.

pub mod session;
pub mod synced_store;
pub mod types;


pub use session::{run_session, SessionCommand, SessionEnd, SessionUpdate};
pub use synced_store::{SyncedStore, DEFAULT_FETCH_TIMEOUT};
pub use types::{SyncMonitor, SyncStatus};
