use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use purepath_core::{
    run_session, Clock, SessionCommand, SessionEnd, SessionUpdate, StreakView, SystemClock,
};

use super::{load_config, open_session, open_store, warn_if_unsynced, CliResult};

pub async fn checkin(offline: bool) -> CliResult {
    let (_, mut store) = open_session(offline).await?;
    warn_if_unsynced(&store);
    let now = SystemClock.now_ms();

    if let Some(event) = store.tick(now) {
        println!("{}", serde_json::to_string(&event)?);
    }
    match store.check_in(now) {
        Some(event) => println!("{}", serde_json::to_string(&event)?),
        None => {
            let view = store.view(now);
            println!(
                "Locked. Next check-in in {}",
                view.cooldown.as_deref().unwrap_or("0h 0m 0s")
            );
        }
    }
    store.flush().await;
    Ok(())
}

pub async fn status(json: bool, offline: bool) -> CliResult {
    let config = load_config()?;
    let mut store = open_store(&config, offline)?;
    if store.restore().await?.is_none() {
        eprintln!("not logged in; showing an empty streak");
    }
    let now = SystemClock.now_ms();
    store.tick(now);
    store.flush().await;

    let view = store.view(now);
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", render(&view));
    }
    Ok(())
}

pub async fn watch(offline: bool) -> CliResult {
    let (config, mut store) = open_session(offline).await?;
    let (tx, rx) = mpsc::unbounded_channel();

    let input = tx.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let command = match line.trim() {
                "c" | "checkin" => SessionCommand::CheckIn,
                "q" | "quit" => SessionCommand::Quit,
                "logout" => SessionCommand::Logout,
                other => {
                    debug!(input = other, "ignored watch input");
                    continue;
                }
            };
            if input.send(command).is_err() {
                break;
            }
        }
    });

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(SessionCommand::Quit);
        }
    });

    let period = Duration::from_millis(config.clock.tick_interval_ms);
    let mut last_line = String::new();
    let end = run_session(&mut store, &SystemClock, period, rx, |store, now, update| {
        match update {
            SessionUpdate::Event(event) => {
                if let Ok(json) = serde_json::to_string(event) {
                    println!("{json}");
                }
            }
            SessionUpdate::CheckInRejected => println!("Still locked."),
            SessionUpdate::Tick => {}
        }
        let line = render(&store.view(now));
        if line != last_line {
            println!("{line}");
            last_line = line;
        }
    })
    .await?;

    if end == SessionEnd::LoggedOut {
        println!("Logged out.");
    }
    Ok(())
}

fn render(view: &StreakView) -> String {
    let next = match &view.cooldown {
        Some(cooldown) => format!("next check-in in {cooldown}"),
        None => "check-in available".to_string(),
    };
    let mut line = format!(
        "Streak: {} (best {}) | {}",
        view.current_streak, view.max_streak, next
    );
    if let Some(hours) = view.hours_until_expiry {
        line.push_str(&format!(" | expires in {hours}h"));
        if view.expiry_urgent {
            line.push_str(" (!)");
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> StreakView {
        StreakView {
            current_streak: 3,
            max_streak: 9,
            last_check_in: Some(1000),
            can_check_in: false,
            cooldown: Some("3h 12m 5s".to_string()),
            cooldown_ms: Some(11_525_000),
            hours_until_expiry: Some(27),
            expiry_urgent: false,
        }
    }

    #[test]
    fn test_render_locked_view() {
        assert_eq!(
            render(&view()),
            "Streak: 3 (best 9) | next check-in in 3h 12m 5s | expires in 27h"
        );
    }

    #[test]
    fn test_render_urgent_view() {
        let urgent = StreakView {
            can_check_in: true,
            cooldown: None,
            cooldown_ms: None,
            hours_until_expiry: Some(5),
            expiry_urgent: true,
            ..view()
        };
        assert_eq!(
            render(&urgent),
            "Streak: 3 (best 9) | check-in available | expires in 5h (!)"
        );
    }

    #[test]
    fn test_render_empty_view() {
        let empty = StreakView {
            current_streak: 0,
            max_streak: 0,
            last_check_in: None,
            can_check_in: true,
            cooldown: None,
            cooldown_ms: None,
            hours_until_expiry: None,
            expiry_urgent: false,
        };
        assert_eq!(render(&empty), "Streak: 0 (best 0) | check-in available");
    }
}
