//! Configuration file watcher for hot reload.
//!
//! Editors and `notify` report a single save as several modify events, and
//! the first of them can observe a half-written file. Events are therefore
//! collapsed: a reload happens once the file has been quiet for
//! [`RELOAD_QUIET_PERIOD`]. A file that fails to parse or validate is logged and
//! the running configuration stays in place.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time;

use crate::config::loader::load_config;
use crate::config::schema::GatewayConfig;

/// How long the file must stay unchanged before it is re-read.
pub const RELOAD_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Watches the configuration file and emits validated replacements.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiver that validated configurations arrive on.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Must be called inside a Tokio runtime; the returned
    /// handle must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let _ = event_tx.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, "Config watcher started");

        tokio::spawn(debounce_reloads(
            self.path,
            event_rx,
            self.update_tx,
            RELOAD_QUIET_PERIOD,
        ));
        Ok(watcher)
    }
}

/// Turn bursts of change events into single reloads.
///
/// Exits when the event source is dropped or nobody listens for updates.
async fn debounce_reloads(
    path: PathBuf,
    mut events: mpsc::UnboundedReceiver<()>,
    updates: mpsc::UnboundedSender<GatewayConfig>,
    quiet: Duration,
) {
    while events.recv().await.is_some() {
        while let Ok(Some(())) = time::timeout(quiet, events.recv()).await {}

        tracing::info!(path = ?path, "Config file change detected, reloading");
        match load_config(&path) {
            Ok(config) => {
                if updates.send(config).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
            }
        }
    }
}
