mod data;
mod engine;

pub use data::{AiAnalysis, Cooldown, StreakData, StreakView, TimestampMs, Trend};
pub use engine::{
    apply_check_in, can_check_in, cooldown_remaining, detect_expiry, hours_until_expiry, view,
    CHECK_IN_COOLDOWN_MS, EXPIRY_URGENT_HOURS, STREAK_EXPIRY_MS,
};
