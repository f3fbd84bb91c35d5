//! Resolves where wobble keeps its configuration and where exported frames go.
//!
//! Types:
//!
//! - `AppPaths` captures the resolved config directory and default export directory.
//!
//! Functions:
//!
//! - `AppPaths::discover` applies the `WOBBLE_CONFIG_DIR` override, otherwise
//!   uses the platform config directory, and creates it when missing.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories_next::{ProjectDirs, UserDirs};

pub const ENV_CONFIG_DIR: &str = "WOBBLE_CONFIG_DIR";
pub const CONFIG_FILE_NAME: &str = "wobble.toml";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "wobble";
const APPLICATION: &str = "wobble";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
    export_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Result<Self> {
        let config_dir = match env_override(ENV_CONFIG_DIR) {
            Some(dir) => dir,
            None => ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
                .ok_or_else(|| anyhow!("failed to determine user directories"))?
                .config_dir()
                .to_path_buf(),
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).with_context(|| {
                format!(
                    "failed to create wobble config directory at {}",
                    config_dir.display()
                )
            })?;
        }

        Ok(Self {
            config_dir,
            export_dir: default_export_dir(),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Used when `[export] directory` is not set.
    pub fn default_export_dir(&self) -> &Path {
        &self.export_dir
    }
}

fn env_override(name: &str) -> Option<PathBuf> {
    match env::var_os(name) {
        Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

/// The user's picture directory, else the current directory.
fn default_export_dir() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.picture_dir().map(Path::to_path_buf))
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn env_lock() -> &'static Mutex<()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    struct EnvGuard {
        key: &'static str,
        previous: Option<OsString>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &Path) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, value);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = self.previous.take() {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    #[test]
    fn env_override_takes_precedence_and_is_created() {
        let _guard = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let config_dir = root.path().join("nested/config");
        let _env = EnvGuard::set(ENV_CONFIG_DIR, &config_dir);

        let paths = AppPaths::discover().unwrap();
        assert_eq!(paths.config_dir(), config_dir.as_path());
        assert!(config_dir.is_dir());
        assert_eq!(paths.config_file(), config_dir.join("wobble.toml"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let _guard = env_lock().lock().unwrap();
        let _env = EnvGuard::set(ENV_CONFIG_DIR, Path::new(""));
        assert!(env_override(ENV_CONFIG_DIR).is_none());
    }

    #[test]
    fn export_dir_is_never_empty() {
        assert!(!default_export_dir().as_os_str().is_empty());
    }
}
