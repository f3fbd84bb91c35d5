//! Keyboard shortcuts and the shared settings record they edit.
//!
//! Types:
//!
//! - `SettingsStore` holds the authoritative `VisualizerSettings` and publishes
//!   every change to the renderer.
//! - `KeyboardControls` maps key presses to settings edits or window actions.
//!
//! Functions:
//!
//! - `apply_key` is the pure key to edit mapping used by `KeyboardControls`.

use std::sync::{Arc, Mutex, MutexGuard};

use renderer::{
    InputHandler, Key, ModifiersState, NamedKey, SettingsPublisher, VisualizerSettings,
    WindowAction,
};
use tracing::info;

pub const DISTORTION_STEP: f32 = 0.05;
pub const MOTION_STEP: f32 = 0.05;
pub const GRAIN_PRESETS: [f32; 4] = [0.0, 0.1, 0.25, 0.5];
pub const ABERRATION_PRESETS: [f32; 5] = [0.0, 0.005, 0.01, 0.025, 0.05];

/// Shared settings written by both the file watcher and keyboard controls.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    current: Arc<Mutex<VisualizerSettings>>,
    publisher: SettingsPublisher,
}

impl SettingsStore {
    pub fn new(initial: VisualizerSettings, publisher: SettingsPublisher) -> Self {
        Self {
            current: Arc::new(Mutex::new(initial)),
            publisher,
        }
    }

    pub fn get(&self) -> VisualizerSettings {
        *self.lock()
    }

    /// Replaces the whole record, e.g. after the settings file changed.
    pub fn replace(&self, settings: VisualizerSettings) {
        let mut guard = self.lock();
        *guard = settings.clamped();
        self.publisher.publish(*guard);
    }

    /// Applies `edit` and publishes the result; returns the new record.
    pub fn update<F>(&self, edit: F) -> VisualizerSettings
    where
        F: FnOnce(&mut VisualizerSettings),
    {
        let mut guard = self.lock();
        edit(&mut guard);
        *guard = guard.clamped();
        self.publisher.publish(*guard);
        *guard
    }

    fn lock(&self) -> MutexGuard<'_, VisualizerSettings> {
        // A panic while holding the lock cannot leave a half-written Copy record.
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Outcome of a single key press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyCommand {
    Edit(Edit),
    Action(WindowAction),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edit {
    TogglePause,
    Distortion(f32),
    Motion(f32),
    CycleGrain,
    CycleAberration,
}

pub fn apply_key(key: &Key, modifiers: ModifiersState) -> Option<KeyCommand> {
    match key {
        Key::Named(NamedKey::Escape) => Some(KeyCommand::Action(WindowAction::Quit)),
        Key::Named(NamedKey::Space) => Some(KeyCommand::Edit(Edit::TogglePause)),
        Key::Named(NamedKey::ArrowUp) => Some(KeyCommand::Edit(Edit::Distortion(DISTORTION_STEP))),
        Key::Named(NamedKey::ArrowDown) => {
            Some(KeyCommand::Edit(Edit::Distortion(-DISTORTION_STEP)))
        }
        Key::Named(NamedKey::ArrowRight) => Some(KeyCommand::Edit(Edit::Motion(MOTION_STEP))),
        Key::Named(NamedKey::ArrowLeft) => Some(KeyCommand::Edit(Edit::Motion(-MOTION_STEP))),
        Key::Character(text) => match text.to_lowercase().as_str() {
            " " => Some(KeyCommand::Edit(Edit::TogglePause)),
            "s" if modifiers.control_key() => Some(KeyCommand::Action(WindowAction::Export)),
            "e" => Some(KeyCommand::Action(WindowAction::Export)),
            "g" => Some(KeyCommand::Edit(Edit::CycleGrain)),
            "c" => Some(KeyCommand::Edit(Edit::CycleAberration)),
            _ => None,
        },
        _ => None,
    }
}

/// First preset strictly above `current`, wrapping to the first.
fn next_preset(presets: &[f32], current: f32) -> f32 {
    const EPSILON: f32 = 1e-6;
    presets
        .iter()
        .copied()
        .find(|preset| *preset > current + EPSILON)
        .or_else(|| presets.first().copied())
        .unwrap_or(current)
}

/// Applies an edit to `settings`. `paused_motion` remembers the speed to
/// restore after a pause.
pub fn apply_edit(settings: &mut VisualizerSettings, paused_motion: &mut Option<f32>, edit: Edit) {
    match edit {
        Edit::TogglePause => {
            if settings.motion > 0.0 {
                *paused_motion = Some(settings.motion);
                settings.motion = 0.0;
            } else {
                settings.motion = paused_motion
                    .take()
                    .unwrap_or(VisualizerSettings::default().motion);
            }
        }
        Edit::Distortion(step) => settings.distortion += step,
        Edit::Motion(step) => {
            settings.motion += step;
            *paused_motion = None;
        }
        Edit::CycleGrain => settings.grain = next_preset(&GRAIN_PRESETS, settings.grain),
        Edit::CycleAberration => {
            settings.chromatic_aberration =
                next_preset(&ABERRATION_PRESETS, settings.chromatic_aberration)
        }
    }
}

pub struct KeyboardControls {
    store: SettingsStore,
    paused_motion: Option<f32>,
}

impl KeyboardControls {
    pub fn new(store: SettingsStore) -> Self {
        Self {
            store,
            paused_motion: None,
        }
    }
}

impl InputHandler for KeyboardControls {
    fn handle_key(&mut self, key: &Key, modifiers: ModifiersState) -> Option<WindowAction> {
        match apply_key(key, modifiers)? {
            KeyCommand::Action(action) => Some(action),
            KeyCommand::Edit(edit) => {
                let paused_motion = &mut self.paused_motion;
                let settings = self
                    .store
                    .update(|settings| apply_edit(settings, paused_motion, edit));
                info!(
                    ?edit,
                    motion = settings.motion,
                    distortion = settings.distortion,
                    grain = settings.grain,
                    chromatic_aberration = settings.chromatic_aberration,
                    "settings adjusted"
                );
                None
            }
        }
    }
}
