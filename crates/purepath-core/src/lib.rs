//! # Purepath Core Library
//!
//! This library provides the core logic for the Purepath daily check-in
//! streak tracker. All operations are available via the standalone
//! `purepath` CLI binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Streak Engine**: Pure functions deciding whether a check-in is allowed,
//!   applying it, and detecting a streak that lapsed past its 48h window
//! - **Synced Store**: Local-first state replicated to a remote record with
//!   last-writer-wins upserts, keyed by a user-chosen private key
//! - **Remote**: The record store trait plus a PostgREST client and an
//!   in-memory store for offline use and tests
//! - **Storage**: TOML-based configuration and the data directory
//!
//! ## Key Components
//!
//! - [`SyncedStore`]: Local state, identity and push dispatch
//! - [`StreakData`]: The single persisted entity
//! - [`RecordStore`]: Trait for remote record backends
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod identity;
pub mod remote;
pub mod storage;
pub mod streak;
pub mod sync;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, IdentityError, RemoteError, ValidationError};
pub use events::StreakEvent;
pub use identity::{FileSlot, Identity, IdentitySlot, KeyringSlot, MemorySlot};
pub use remote::{MemoryStore, PostgrestStore, RecordStore};
pub use storage::{data_dir, Config};
pub use streak::{Cooldown, StreakData, StreakView, TimestampMs};
pub use sync::{run_session, SessionCommand, SessionEnd, SessionUpdate, SyncStatus, SyncedStore};
