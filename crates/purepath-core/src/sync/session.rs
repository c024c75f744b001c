//! Interactive session loop.
//!
//! Drives a [`SyncedStore`] from two sources: a recurring clock tick that
//! re-evaluates expiry (and lets the caller redraw countdowns), and user
//! commands arriving on a channel. Everything runs on the caller's task,
//! so state transitions never race.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::synced_store::SyncedStore;
use crate::clock::Clock;
use crate::error::Result;
use crate::events::StreakEvent;
use crate::streak::TimestampMs;

/// User input forwarded into a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    CheckIn,
    Logout,
    Quit,
}

/// Why a session loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    LoggedOut,
    /// Every command sender was dropped.
    InputClosed,
}

/// Something the caller may want to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionUpdate<'a> {
    Tick,
    Event(&'a StreakEvent),
    /// A check-in was requested while still locked.
    CheckInRejected,
}

/// Run until `Quit`, `Logout`, or the command channel closes.
///
/// The first tick fires immediately. Missed ticks are skipped rather than
/// replayed, since every rule is evaluated against the current time anyway.
/// Dispatched pushes are flushed before returning.
pub async fn run_session<F>(
    store: &mut SyncedStore,
    clock: &dyn Clock,
    period: Duration,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    mut on_update: F,
) -> Result<SessionEnd>
where
    F: FnMut(&SyncedStore, TimestampMs, SessionUpdate<'_>),
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let end = loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = clock.now_ms();
                match store.tick(now) {
                    Some(event) => on_update(&*store, now, SessionUpdate::Event(&event)),
                    None => on_update(&*store, now, SessionUpdate::Tick),
                }
            }
            command = commands.recv() => {
                let now = clock.now_ms();
                match command {
                    Some(SessionCommand::CheckIn) => match store.check_in(now) {
                        Some(event) => on_update(&*store, now, SessionUpdate::Event(&event)),
                        None => on_update(&*store, now, SessionUpdate::CheckInRejected),
                    },
                    Some(SessionCommand::Logout) => {
                        let event = store.reset()?;
                        on_update(&*store, now, SessionUpdate::Event(&event));
                        break SessionEnd::LoggedOut;
                    }
                    Some(SessionCommand::Quit) => break SessionEnd::Quit,
                    None => break SessionEnd::InputClosed,
                }
            }
        }
    };

    debug!(?end, "session ended; flushing pushes");
    store.flush().await;
    Ok(end)
}
