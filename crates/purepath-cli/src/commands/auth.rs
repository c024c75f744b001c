use chrono::Utc;
use std::io::BufRead;
use std::sync::Arc;

use purepath_core::storage::data_dir;
use purepath_core::{MemoryStore, StreakEvent, SyncedStore};

use super::{load_config, open_store, warn_if_unsynced, CliResult};

pub async fn login(key: Option<String>, offline: bool) -> CliResult {
    let key = match key {
        Some(key) => key,
        None => read_key()?,
    };

    let config = load_config()?;
    let mut store = open_store(&config, offline)?;
    let data = store.set_identity(&key).await?;
    store.flush().await;

    warn_if_unsynced(&store);

    let fingerprint = store
        .identity()
        .map(|identity| identity.fingerprint())
        .unwrap_or_default();
    let event = StreakEvent::LoggedIn {
        fingerprint,
        at: Utc::now(),
    };
    println!("{}", serde_json::to_string(&event)?);
    println!(
        "Logged in. Current streak: {} (best {})",
        data.current_streak, data.max_streak
    );
    Ok(())
}

/// Logging out never touches the remote record.
pub fn logout() -> CliResult {
    let config = load_config()?;
    let slot = config.identity.open_slot(&data_dir()?);
    let mut store = SyncedStore::new(Arc::new(MemoryStore::new()), slot);
    let event = store.reset()?;
    println!("{}", serde_json::to_string(&event)?);
    Ok(())
}

fn read_key() -> CliResult<String> {
    eprint!("Private key: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    // Only the line terminator is stripped; the key is used as entered.
    let key = line
        .strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(&line);
    Ok(key.to_string())
}
