pub mod auth;
pub mod config;
pub mod streak;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use purepath_core::storage::{data_dir, ENV_REMOTE_URL};
use purepath_core::{Config, MemoryStore, PostgrestStore, RecordStore, SyncedStore};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Run a command future on a single-threaded runtime.
pub fn block_on<F>(future: F) -> CliResult
where
    F: Future<Output = CliResult>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(future);
    // A pending stdin read would otherwise hold shutdown open.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

/// Load the config with environment overrides applied.
pub fn load_config() -> CliResult<Config> {
    Ok(Config::load()?.with_env_overrides())
}

/// Build a store wired to the configured identity slot and remote.
pub fn open_store(config: &Config, offline: bool) -> CliResult<SyncedStore> {
    let slot = config.identity.open_slot(&data_dir()?);

    let remote: Arc<dyn RecordStore> = if offline {
        Arc::new(MemoryStore::new())
    } else if config.remote.is_configured() {
        Arc::new(PostgrestStore::new(&config.remote)?)
    } else {
        return Err(format!(
            "remote store is not configured; run `purepath config set remote.url <URL>`, \
             set {ENV_REMOTE_URL}, or pass --offline"
        )
        .into());
    };

    Ok(SyncedStore::new(remote, slot)
        .with_fetch_timeout(Duration::from_secs(config.remote.fetch_timeout_secs)))
}

/// Tell the user when the remote could not be reached.
pub fn warn_if_unsynced(store: &SyncedStore) {
    if let Some(err) = store.status().last_error {
        eprintln!("warning: remote sync failed ({err}); continuing with local state");
    }
}

/// Restore the cached identity or fail with a login hint.
pub async fn open_session(offline: bool) -> CliResult<(Config, SyncedStore)> {
    let config = load_config()?;
    let mut store = open_store(&config, offline)?;
    if store.restore().await?.is_none() {
        return Err("not logged in; run `purepath login <KEY>` first".into());
    }
    Ok((config, store))
}
