//! Wires directory discovery, `wobble.toml` loading, the settings watcher and
//! keyboard controls into a single renderer launch.
//!
//! Types:
//!
//! - None; this module ties together other crates at runtime.
//!
//! Functions:
//!
//! - `run` drives the main execution path.
//! - `initialise_tracing` configures logging.
//! - `renderer_config` translates the loaded `AppConfig` into `RendererConfig`.

use std::path::Path;

use anyhow::{Context, Result};
use renderer::{settings_channel, Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;
use vizconfig::AppConfig;

use crate::controls::{KeyboardControls, SettingsStore};
use crate::paths::AppPaths;
use crate::watch::ConfigWatcher;

pub fn run() -> Result<()> {
    let paths = AppPaths::discover()?;
    let config_file = paths.config_file();
    let config = AppConfig::load_or_create(&config_file)
        .with_context(|| format!("failed to load {}", config_file.display()))?;
    tracing::debug!(
        config = %config_file.display(),
        export = %paths.default_export_dir().display(),
        "resolved wobble paths"
    );

    let initial = config.visualizer.clamped();
    let (publisher, receiver) = settings_channel(initial);
    let store = SettingsStore::new(initial, publisher);

    let watcher = if config.watch.enabled {
        Some(ConfigWatcher::spawn(
            config_file.clone(),
            config.watch.poll_interval,
            store.clone(),
        )?)
    } else {
        tracing::debug!("settings hot reload disabled");
        None
    };

    let renderer_config = renderer_config(&config, paths.default_export_dir());
    tracing::info!(
        width = renderer_config.surface_size.0,
        height = renderer_config.surface_size.1,
        render_scale = renderer_config.render_scale,
        "launching wobble"
    );

    let result = Renderer::new(renderer_config).run(receiver, Box::new(KeyboardControls::new(store)));
    if let Some(watcher) = watcher {
        watcher.shutdown();
    }
    result
}

pub fn initialise_tracing() {
    let default_filter =
        "warn,wobble=info,renderer=info,naga=error,wgpu=error,wgpu_core=error,wgpu_hal=error,winit=error";
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn renderer_config(config: &AppConfig, default_export_dir: &Path) -> RendererConfig {
    RendererConfig {
        surface_size: (config.window.width, config.window.height),
        render_scale: config.window.render_scale,
        target_fps: config.window.target_fps,
        vsync: config.window.vsync,
        export_dir: config
            .export
            .directory
            .clone()
            .unwrap_or_else(|| default_export_dir.to_path_buf()),
        ..RendererConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vizconfig::DEFAULT_CONFIG_TOML;

    #[test]
    fn defaults_fall_back_to_discovered_export_dir() {
        let config = AppConfig::from_toml_str(DEFAULT_CONFIG_TOML).unwrap();
        let built = renderer_config(&config, Path::new("/tmp/pictures"));
        assert_eq!(built.surface_size, (config.window.width, config.window.height));
        assert_eq!(built.export_dir, PathBuf::from("/tmp/pictures"));
        assert_eq!(built.grain_seed, None);
    }

    #[test]
    fn configured_export_dir_wins() {
        let mut config = AppConfig::from_toml_str(DEFAULT_CONFIG_TOML).unwrap();
        config.export.directory = Some(PathBuf::from("/srv/frames"));
        config.window.target_fps = Some(30.0);
        let built = renderer_config(&config, Path::new("/tmp/pictures"));
        assert_eq!(built.export_dir, PathBuf::from("/srv/frames"));
        assert_eq!(built.target_fps, Some(30.0));
    }
}
