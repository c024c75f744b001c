//! Streak state machine.
//!
//! Pure functions over a [`StreakData`] snapshot and an explicit `now`.
//! Nothing here reads the clock or touches the network; the caller
//! re-evaluates on every tick so eligibility and countdowns advance with
//! wall-clock time.
//!
//! ## Rules
//!
//! ```text
//! elapsed = now - last_check_in
//!
//! elapsed <  24h            locked (cooldown shown)
//! 24h <= elapsed            check-in allowed
//! 48h <= elapsed, streak>0  streak resets to 0
//! ```
//!
//! Both thresholds are inclusive: a check-in exactly 24h after the last one
//! is allowed, and an absence of exactly 48h resets the streak.

use super::data::{Cooldown, StreakData, StreakView, TimestampMs};

/// Minimum gap between two check-ins.
pub const CHECK_IN_COOLDOWN_MS: i64 = 24 * 60 * 60 * 1000;

/// Absence after which the streak is lost.
pub const STREAK_EXPIRY_MS: i64 = 48 * 60 * 60 * 1000;

const MS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Hours-until-expiry below which the expiry warning is raised.
pub const EXPIRY_URGENT_HOURS: u32 = 12;

fn elapsed_since_check_in(data: &StreakData, now: TimestampMs) -> Option<i64> {
    data.last_check_in.map(|last| now.saturating_sub(last))
}

// ── Queries ──────────────────────────────────────────────────────

/// Whether a check-in is allowed at `now`.
pub fn can_check_in(data: &StreakData, now: TimestampMs) -> bool {
    match elapsed_since_check_in(data, now) {
        None => true,
        Some(elapsed) => elapsed >= CHECK_IN_COOLDOWN_MS,
    }
}

/// Time left until [`can_check_in`] flips to true, or `None` if it already is.
///
/// A `now` earlier than the last check-in counts as zero elapsed time.
pub fn cooldown_remaining(data: &StreakData, now: TimestampMs) -> Option<Cooldown> {
    if can_check_in(data, now) {
        return None;
    }
    let elapsed = elapsed_since_check_in(data, now)?.max(0);
    let remaining = (CHECK_IN_COOLDOWN_MS - elapsed).max(0);
    Some(Cooldown {
        remaining_ms: remaining as u64,
    })
}

/// Whole hours left before the streak expires.
///
/// `None` before the first check-in or while the streak is already zero.
/// A `now` earlier than the last check-in counts as zero elapsed time.
pub fn hours_until_expiry(data: &StreakData, now: TimestampMs) -> Option<u32> {
    if data.current_streak == 0 {
        return None;
    }
    let elapsed = elapsed_since_check_in(data, now)?.max(0);
    let remaining = STREAK_EXPIRY_MS.saturating_sub(elapsed).clamp(0, STREAK_EXPIRY_MS);
    Some((remaining / MS_PER_HOUR) as u32)
}

/// Bundle every query into one display snapshot.
pub fn view(data: &StreakData, now: TimestampMs) -> StreakView {
    let cooldown = cooldown_remaining(data, now);
    let hours_until_expiry = hours_until_expiry(data, now);
    StreakView {
        current_streak: data.current_streak,
        max_streak: data.max_streak,
        last_check_in: data.last_check_in,
        can_check_in: can_check_in(data, now),
        cooldown: cooldown.map(|c| c.to_string()),
        cooldown_ms: cooldown.map(|c| c.remaining_ms),
        hours_until_expiry,
        expiry_urgent: hours_until_expiry.is_some_and(|h| h < EXPIRY_URGENT_HOURS),
    }
}

// ── Transitions ──────────────────────────────────────────────────

/// Record a check-in at `now`.
///
/// Returns a fresh snapshot; the input is never modified. Returns `None`
/// when the check-in is not allowed, which callers treat as a no-op.
pub fn apply_check_in(data: &StreakData, now: TimestampMs) -> Option<StreakData> {
    if !can_check_in(data, now) {
        return None;
    }
    let current_streak = data.current_streak.saturating_add(1);
    let mut history = Vec::with_capacity(data.history.len() + 1);
    history.extend_from_slice(&data.history);
    history.push(now);
    Some(StreakData {
        current_streak,
        max_streak: data.max_streak.max(current_streak),
        last_check_in: Some(now),
        history,
    })
}

/// Reset the streak if the last check-in is 48h or more in the past.
///
/// Returns `None` when nothing changes: no check-in yet, streak already
/// zero, or still inside the window.
pub fn detect_expiry(data: &StreakData, now: TimestampMs) -> Option<StreakData> {
    if data.current_streak == 0 {
        return None;
    }
    let elapsed = elapsed_since_check_in(data, now)?;
    if elapsed < STREAK_EXPIRY_MS {
        return None;
    }
    Some(StreakData {
        current_streak: 0,
        ..data.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = CHECK_IN_COOLDOWN_MS;
    const HOUR: i64 = MS_PER_HOUR;

    fn streak_of(n: u32, last: TimestampMs) -> StreakData {
        StreakData {
            current_streak: n,
            max_streak: n,
            last_check_in: Some(last),
            history: (0..n as i64).map(|i| last - (n as i64 - 1 - i) * DAY).collect(),
        }
    }

    #[test]
    fn fresh_data_can_check_in() {
        assert!(can_check_in(&StreakData::default(), 0));
        assert!(can_check_in(&StreakData::default(), i64::MAX));
    }

    #[test]
    fn check_in_on_fresh_data() {
        let next = apply_check_in(&StreakData::default(), 1000).unwrap();
        assert_eq!(
            next,
            StreakData {
                current_streak: 1,
                max_streak: 1,
                last_check_in: Some(1000),
                history: vec![1000],
            }
        );
    }

    #[test]
    fn check_in_allowed_exactly_at_cooldown_boundary() {
        let data = streak_of(3, 1000);
        assert!(!can_check_in(&data, 1000 + DAY - 1));
        assert!(can_check_in(&data, 1000 + DAY));

        let next = apply_check_in(&data, 1000 + DAY).unwrap();
        assert_eq!(next.current_streak, 4);
        assert_eq!(next.max_streak, 4);
        assert_eq!(next.history.last(), Some(&(1000 + DAY)));
    }

    #[test]
    fn check_in_keeps_higher_historical_max() {
        let data = StreakData {
            current_streak: 0,
            max_streak: 9,
            last_check_in: Some(0),
            history: vec![0],
        };
        let next = apply_check_in(&data, 3 * DAY).unwrap();
        assert_eq!(next.current_streak, 1);
        assert_eq!(next.max_streak, 9);
    }

    #[test]
    fn check_in_too_soon_is_rejected_without_touching_input() {
        let data = streak_of(2, 5000);
        let before = data.clone();
        assert_eq!(apply_check_in(&data, 5000 + HOUR), None);
        assert_eq!(data, before);
    }

    #[test]
    fn just_checked_in_is_locked_and_not_expired() {
        let data = streak_of(1, 42);
        assert!(!can_check_in(&data, 42));
        assert_eq!(detect_expiry(&data, 42), None);
    }

    #[test]
    fn expiry_fires_exactly_at_48_hours() {
        let data = streak_of(3, 1000);
        assert_eq!(detect_expiry(&data, 1000 + 2 * DAY - 1), None);

        let reset = detect_expiry(&data, 1000 + 2 * DAY).unwrap();
        assert_eq!(reset.current_streak, 0);
        assert_eq!(reset.max_streak, data.max_streak);
        assert_eq!(reset.history, data.history);
        assert_eq!(reset.last_check_in, data.last_check_in);
    }

    #[test]
    fn expiry_is_noop_when_streak_already_zero() {
        let data = StreakData {
            current_streak: 0,
            max_streak: 4,
            last_check_in: Some(0),
            history: vec![0],
        };
        assert_eq!(detect_expiry(&data, 100 * DAY), None);
        assert_eq!(detect_expiry(&StreakData::default(), 100 * DAY), None);
    }

    #[test]
    fn cooldown_counts_down_to_eligibility() {
        let data = streak_of(1, 0);
        let cooldown = cooldown_remaining(&data, HOUR + 30 * 60_000).unwrap();
        assert_eq!(cooldown.to_string(), "22h 30m 0s");

        let last_second = cooldown_remaining(&data, DAY - 1).unwrap();
        assert_eq!(last_second.remaining_ms, 1);
        assert_eq!(last_second.to_string(), "0h 0m 0s");

        assert_eq!(cooldown_remaining(&data, DAY), None);
    }

    #[test]
    fn cooldown_with_clock_skew_never_exceeds_a_day() {
        let data = streak_of(1, 10 * HOUR);
        let cooldown = cooldown_remaining(&data, 9 * HOUR).unwrap();
        assert_eq!(cooldown.remaining_ms, DAY as u64);
    }

    #[test]
    fn cooldown_absent_before_first_check_in() {
        assert_eq!(cooldown_remaining(&StreakData::default(), 0), None);
    }

    #[test]
    fn hours_until_expiry_floors_and_clamps() {
        let data = streak_of(2, 0);
        assert_eq!(hours_until_expiry(&data, 0), Some(48));
        assert_eq!(hours_until_expiry(&data, 30 * 60_000), Some(47));
        assert_eq!(hours_until_expiry(&data, 47 * HOUR + 1), Some(0));
        assert_eq!(hours_until_expiry(&data, 3 * DAY), Some(0));
    }

    #[test]
    fn hours_until_expiry_ignores_clock_skew() {
        let data = streak_of(2, 10 * HOUR);
        assert_eq!(hours_until_expiry(&data, 9 * HOUR), Some(48));
        assert_eq!(cooldown_remaining(&data, 9 * HOUR).unwrap().remaining_ms, DAY as u64);
    }

    #[test]
    fn hours_until_expiry_never_exceeds_window() {
        let bogus = StreakData {
            current_streak: 1,
            max_streak: 1,
            last_check_in: Some(i64::MAX),
            history: vec![i64::MAX],
        };
        assert_eq!(hours_until_expiry(&bogus, 1_700_000_000_000), Some(48));
        assert_eq!(hours_until_expiry(&bogus, i64::MIN), Some(48));
    }

    #[test]
    fn hours_until_expiry_absent_without_active_streak() {
        assert_eq!(hours_until_expiry(&StreakData::default(), 0), None);
        let lapsed = StreakData {
            current_streak: 0,
            max_streak: 3,
            last_check_in: Some(0),
            history: vec![0],
        };
        assert_eq!(hours_until_expiry(&lapsed, HOUR), None);
    }

    #[test]
    fn view_flags_urgent_expiry() {
        let data = streak_of(5, 0);
        let calm = view(&data, DAY);
        assert!(calm.can_check_in);
        assert_eq!(calm.cooldown, None);
        assert_eq!(calm.hours_until_expiry, Some(24));
        assert!(!calm.expiry_urgent);

        let urgent = view(&data, 40 * HOUR);
        assert_eq!(urgent.hours_until_expiry, Some(8));
        assert!(urgent.expiry_urgent);
    }

    #[test]
    fn view_while_locked_carries_cooldown() {
        let data = streak_of(1, 0);
        let locked = view(&data, 2 * HOUR);
        assert!(!locked.can_check_in);
        assert_eq!(locked.cooldown.as_deref(), Some("22h 0m 0s"));
        assert_eq!(locked.cooldown_ms, Some((22 * HOUR) as u64));
    }
}
