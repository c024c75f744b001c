//! Persisted streak record and the display shapes derived from it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since the Unix epoch.
pub type TimestampMs = i64;

/// The single persisted entity.
///
/// Serialized with camelCase field names; this is the payload stored in
/// the remote record, so the names must not change. Missing fields decode
/// to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakData {
    /// Consecutive successful check-ins.
    #[serde(default)]
    pub current_streak: u32,
    /// Historical maximum of `current_streak`. Always `>= current_streak`.
    #[serde(default)]
    pub max_streak: u32,
    /// Time of the most recent successful check-in.
    #[serde(default)]
    pub last_check_in: Option<TimestampMs>,
    /// Every successful check-in, oldest first. Append-only.
    #[serde(default)]
    pub history: Vec<TimestampMs>,
}

impl StreakData {
    /// Whether the user has ever checked in.
    pub fn has_checked_in(&self) -> bool {
        self.last_check_in.is_some()
    }

    /// Lift `max_streak` to `current_streak` if a record arrived with the
    /// invariant broken (hand-edited or written by an older client).
    pub fn normalized(mut self) -> Self {
        if self.max_streak < self.current_streak {
            self.max_streak = self.current_streak;
        }
        self
    }
}

/// Time left until the next check-in is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    pub remaining_ms: u64,
}

impl Cooldown {
    const MS_PER_SECOND: u64 = 1_000;
    const MS_PER_MINUTE: u64 = 60 * Self::MS_PER_SECOND;
    const MS_PER_HOUR: u64 = 60 * Self::MS_PER_MINUTE;

    pub fn hours(&self) -> u64 {
        self.remaining_ms / Self::MS_PER_HOUR
    }

    pub fn minutes(&self) -> u64 {
        (self.remaining_ms % Self::MS_PER_HOUR) / Self::MS_PER_MINUTE
    }

    pub fn seconds(&self) -> u64 {
        (self.remaining_ms % Self::MS_PER_MINUTE) / Self::MS_PER_SECOND
    }
}

impl fmt::Display for Cooldown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m {}s", self.hours(), self.minutes(), self.seconds())
    }
}

/// Display-ready snapshot of a [`StreakData`] at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakView {
    pub current_streak: u32,
    pub max_streak: u32,
    pub last_check_in: Option<TimestampMs>,
    pub can_check_in: bool,
    /// Human-readable cooldown, e.g. `"3h 12m 5s"`.
    pub cooldown: Option<String>,
    pub cooldown_ms: Option<u64>,
    pub hours_until_expiry: Option<u32>,
    /// Fewer than twelve hours remain before the streak resets.
    pub expiry_urgent: bool,
}

/// Reserved shape for an AI-written streak summary.
///
/// Kept for payload compatibility only. Nothing in this crate produces or
/// consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub summary: String,
    pub advice: String,
    pub consistency_score: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}
