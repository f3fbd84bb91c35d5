//! TOML configuration for the wobble visualizer.
//!
//! A single `wobble.toml` carries the window/runtime options, the export
//! destination, the hot-reload poll interval, and the `[visualizer]` table with
//! the live [`VisualizerSettings`] record.

mod color;
mod settings;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

pub use color::Color;
pub use settings::{
    VisualizerSettings, CHROMATIC_ABERRATION_RANGE, DISTORTION_RANGE, GRAIN_RANGE, MOTION_RANGE,
};

pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to access configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    pub version: u32,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub visualizer: VisualizerSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    /// Fraction of the window size the surface is rasterized at (0.25-1.0).
    pub render_scale: f32,
    pub target_fps: Option<f32>,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            render_scale: 0.5,
            target_fps: None,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory receiving exported frames; `None` lets the application pick.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    pub enabled: bool,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub poll_interval: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval: default_poll_interval(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            window: WindowConfig::default(),
            export: ExportConfig::default(),
            watch: WatchConfig::default(),
            visualizer: VisualizerSettings::default(),
        }
    }
}

/// Template written on first run. Parses to [`AppConfig::default`].
pub const DEFAULT_CONFIG_TOML: &str = r##"version = 1

[window]
width = 1280
height = 800
# Fraction of the window the surface is rasterized at before upscaling.
render_scale = 0.5
vsync = true

[export]
# directory = "/home/me/Pictures"

[watch]
enabled = true
poll_interval = "500ms"

[visualizer]
color_a = "#ff0070"
color_b = "#007bff"
motion = 0.2
distortion = 0.4
grain = 0.1
chromatic_aberration = 0.005
"##;

fn default_poll_interval() -> Duration {
    Duration::from_millis(500)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl AppConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: AppConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads `path`, writing [`DEFAULT_CONFIG_TOML`] there first when it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
            fs::write(path, DEFAULT_CONFIG_TOML).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Self::load(path)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CONFIG_VERSION}",
                self.version
            )));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }

        if !(0.25..=1.0).contains(&self.window.render_scale) {
            return Err(ConfigError::Invalid(format!(
                "window.render_scale must be within 0.25-1.0, got {}",
                self.window.render_scale
            )));
        }

        if let Some(fps) = self.window.target_fps {
            if fps <= 0.0 {
                return Err(ConfigError::Invalid("window.target_fps must be > 0".into()));
            }
        }

        if self.watch.enabled && self.watch.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "watch.poll_interval must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_matches_defaults() {
        let parsed = AppConfig::from_toml_str(DEFAULT_CONFIG_TOML).expect("parse template");
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn missing_tables_fall_back_to_defaults() {
        let config = AppConfig::from_toml_str("version = 1\n").unwrap();
        assert_eq!(config.window, WindowConfig::default());
        assert_eq!(config.visualizer, VisualizerSettings::default());
    }

    #[test]
    fn partial_visualizer_table_keeps_other_defaults() {
        let config = AppConfig::from_toml_str(
            r##"
version = 1

[visualizer]
color_a = "#ff0000"
motion = 0
"##,
        )
        .unwrap();
        assert_eq!(config.visualizer.color_a.to_hex(), "#ff0000");
        assert_eq!(config.visualizer.motion, 0.0);
        assert_eq!(config.visualizer.distortion, 0.4);
    }

    #[test]
    fn rejects_bad_color() {
        let err = AppConfig::from_toml_str(
            r##"
version = 1

[visualizer]
color_b = "#zzzzzz"
"##,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_unknown_version() {
        let err = AppConfig::from_toml_str("version = 7\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_render_scale_out_of_range() {
        let err = AppConfig::from_toml_str(
            r#"
version = 1

[window]
render_scale = 2.0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn poll_interval_accepts_numbers_and_strings() {
        let numeric = AppConfig::from_toml_str("version = 1\n[watch]\npoll_interval = 2\n").unwrap();
        assert_eq!(numeric.watch.poll_interval, Duration::from_secs(2));

        let human =
            AppConfig::from_toml_str("version = 1\n[watch]\npoll_interval = \"250ms\"\n").unwrap();
        assert_eq!(human.watch.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut config = AppConfig::default();
        config.visualizer.grain = 0.25;
        config.export.directory = Some(PathBuf::from("/tmp/frames"));
        let text = config.to_toml_string().unwrap();
        let reparsed = AppConfig::from_toml_str(&text).unwrap();
        assert_eq!(reparsed, config);
    }
}
