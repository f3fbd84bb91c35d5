//! Whole-record settings publication between threads.
//!
//! Producers (file watcher, keyboard glue) send complete
//! [`VisualizerSettings`] values. The render loop drains the channel once per
//! tick and keeps only the newest record, so one frame never mixes fields from
//! two updates.

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::debug;
use vizconfig::VisualizerSettings;

#[derive(Debug, Clone)]
pub struct SettingsPublisher {
    tx: Sender<VisualizerSettings>,
}

impl SettingsPublisher {
    /// Returns `false` once the receiver has been dropped.
    pub fn publish(&self, settings: VisualizerSettings) -> bool {
        self.tx.send(settings).is_ok()
    }
}

#[derive(Debug)]
pub struct SettingsReceiver {
    rx: Receiver<VisualizerSettings>,
    current: VisualizerSettings,
}

impl SettingsReceiver {
    /// Applies every pending record and returns the newest.
    pub fn latest(&mut self) -> VisualizerSettings {
        let mut pending = 0usize;
        for settings in self.rx.try_iter() {
            self.current = settings;
            pending += 1;
        }
        if pending > 1 {
            debug!(pending, "collapsed queued settings updates");
        }
        self.current
    }

    /// Snapshot used for the most recent tick, without draining.
    pub fn current(&self) -> VisualizerSettings {
        self.current
    }
}

pub fn settings_channel(initial: VisualizerSettings) -> (SettingsPublisher, SettingsReceiver) {
    let (tx, rx) = unbounded();
    (
        SettingsPublisher { tx },
        SettingsReceiver {
            rx,
            current: initial,
        },
    )
}
