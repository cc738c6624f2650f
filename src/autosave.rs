use crate::state::persist::{ConfigStore, PersistedConfig};
use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;

/// Spawn a background task that writes the setup configuration to disk
/// whenever it differs from what was last saved
pub fn spawn_config_autosave(
    state: Arc<AppState>,
    store: ConfigStore,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_saved: Option<PersistedConfig> = None;

        loop {
            tokio::time::sleep(interval).await;
            save_if_changed(&state, &store, &mut last_saved).await;
        }
    })
}

/// One autosave tick. Returns whether anything was written.
pub async fn save_if_changed(
    state: &AppState,
    store: &ConfigStore,
    last_saved: &mut Option<PersistedConfig>,
) -> bool {
    let current = state.export_config().await;
    if last_saved.as_ref() == Some(&current) {
        return false;
    }

    match store.save(&current).await {
        Ok(()) => {
            tracing::debug!("Configuration saved to {}", store.path().display());
            *last_saved = Some(current);
            true
        }
        Err(e) => {
            // Retried on the next tick since last_saved is unchanged
            tracing::error!("Failed to save configuration: {}", e);
            false
        }
    }
}
