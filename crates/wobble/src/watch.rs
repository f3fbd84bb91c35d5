//! Polls `wobble.toml` and republishes the `[visualizer]` table when it changes.
//!
//! Types:
//!
//! - `ConfigWatcher` owns the polling thread and stops it on `shutdown` or drop.
//! - `FileFingerprint` is the (length, content hash) pair used to detect edits.
//!
//! Functions:
//!
//! - `ConfigWatcher::spawn` starts polling at the configured interval.
//! - `poll_once` runs a single change check; invalid files are logged and skipped.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};
use vizconfig::AppConfig;

use crate::controls::SettingsStore;

/// Identifies one version of the file's contents. Modification times are not
/// used; coarse mtime resolution hides same-length edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFingerprint {
    len: u64,
    digest: u64,
}

impl FileFingerprint {
    pub fn read(path: &Path) -> Option<Self> {
        let contents = fs::read(path).ok()?;
        Some(Self::of(&contents))
    }

    fn of(contents: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        contents.hash(&mut hasher);
        Self {
            len: contents.len() as u64,
            digest: hasher.finish(),
        }
    }
}

/// Outcome of one [`poll_once`] call.
#[derive(Debug, PartialEq)]
pub enum PollOutcome {
    Unchanged,
    Reloaded,
    Rejected,
    Missing,
}

/// Checks `path` against `last` and, when it changed, reloads it into `store`.
pub fn poll_once(
    path: &Path,
    last: &mut Option<FileFingerprint>,
    store: &SettingsStore,
) -> PollOutcome {
    let Some(current) = FileFingerprint::read(path) else {
        if last.take().is_some() {
            warn!(path = %path.display(), "settings file disappeared; keeping current settings");
        }
        return PollOutcome::Missing;
    };
    if *last == Some(current) {
        return PollOutcome::Unchanged;
    }
    *last = Some(current);

    match AppConfig::load(path) {
        Ok(config) => {
            store.replace(config.visualizer);
            info!(path = %path.display(), "reloaded visualizer settings");
            PollOutcome::Reloaded
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "ignoring invalid settings file; previous settings stay in effect"
            );
            PollOutcome::Rejected
        }
    }
}

pub struct ConfigWatcher {
    shutdown_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl ConfigWatcher {
    pub fn spawn(path: PathBuf, interval: Duration, store: SettingsStore) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        // The file was just loaded at startup; only later edits count.
        let mut last = FileFingerprint::read(&path);
        let handle = thread::Builder::new()
            .name("wobble-config-watch".into())
            .spawn(move || {
                debug!(path = %path.display(), ?interval, "watching settings file");
                loop {
                    match shutdown_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            poll_once(&path, &mut last, &store);
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("settings watcher stopped");
            })
            .context("failed to spawn settings watcher thread")?;

        Ok(Self {
            shutdown_tx,
            handle: Some(handle),
        })
    }

    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.shutdown_tx.try_send(());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("settings watcher thread panicked");
            }
        }
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
