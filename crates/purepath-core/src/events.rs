use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::streak::TimestampMs;

/// Every state change in the store produces an Event.
/// The CLI prints them; callers may log or forward them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreakEvent {
    /// A check-in was recorded locally (push dispatched).
    CheckedIn {
        streak: u32,
        max_streak: u32,
        at: TimestampMs,
    },
    /// 48h passed without a check-in; the streak was reset.
    StreakExpired {
        lost_streak: u32,
        at: TimestampMs,
    },
    /// An identity was accepted and persisted.
    LoggedIn {
        fingerprint: String,
        at: DateTime<Utc>,
    },
    /// Local state and cached identity were cleared.
    LoggedOut { at: DateTime<Utc> },
}
