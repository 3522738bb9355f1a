//! Persistent storage for settings.
//!
//! Settings live in a TOML file, by default `~/.config/proxlock/config.toml`.
//! Reads are layered with `PROXLOCK_*` environment overrides; [`SettingsStore::load_file`]
//! skips them for callers that write settings back.

use std::path::{Path, PathBuf};

use ::config::{Environment, File, FileFormat, Map};
use tracing::{debug, info};

use crate::config::{ConfigError, ConfigResult, Settings};

/// Environment variable that overrides the settings file location.
pub const CONFIG_PATH_ENV: &str = "PROXLOCK_CONFIG";

/// Prefix for per-key environment overrides, e.g. `PROXLOCK_POLL_INTERVAL_SECS`.
pub const ENV_PREFIX: &str = "PROXLOCK";

/// Storage backend for the settings file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    env: Option<Map<String, String>>,
}

impl SettingsStore {
    /// Create a store backed by the given file, reading overrides from the
    /// process environment.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env: None,
        }
    }

    /// Read overrides from `vars` instead of the process environment.
    ///
    /// Keys use the same `PROXLOCK_<KEY>` form as real environment variables.
    #[must_use]
    pub fn with_env_overrides<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Store at the default location.
    ///
    /// Uses `$PROXLOCK_CONFIG` when set, otherwise the platform config
    /// directory (`$XDG_CONFIG_HOME/proxlock/config.toml` on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] if no home directory can be found.
    pub fn locate() -> ConfigResult<Self> {
        Ok(Self::new(default_config_path()?))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, writing desktop-appropriate defaults first if the file
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, read, or parsed.
    pub fn load_or_init(&self) -> ConfigResult<Settings> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "Creating default configuration");
            self.save(&Settings::from_environment_desktop())?;
        }
        self.load()
    }

    /// Load settings from the file, applying `PROXLOCK_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file is missing or malformed.
    pub fn load(&self) -> ConfigResult<Settings> {
        let env = Environment::with_prefix(ENV_PREFIX).source(self.env.clone());
        self.read(Some(env))
    }

    /// Load settings from the file alone, ignoring environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file is missing or malformed.
    pub fn load_file(&self) -> ConfigResult<Settings> {
        self.read(None)
    }

    fn read(&self, env: Option<Environment>) -> ConfigResult<Settings> {
        let mut builder = ::config::Config::builder()
            .add_source(File::from(self.path.as_path()).format(FileFormat::Toml));
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        let settings = builder
            .build()
            .and_then(::config::Config::try_deserialize::<Settings>)
            .map_err(|source| ConfigError::ReadError {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), ?settings, "Loaded configuration");
        Ok(settings)
    }

    /// Write settings to the file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, settings: &Settings) -> ConfigResult<()> {
        let write_error = |source| ConfigError::WriteError {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let content = toml::to_string_pretty(settings)?;
        std::fs::write(&self.path, content).map_err(write_error)?;
        Ok(())
    }
}

/// Default settings file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] if no platform config directory exists.
pub fn default_config_path() -> ConfigResult<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let dirs = directories::ProjectDirs::from("", "", "proxlock").ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store that sees no environment overrides.
    fn isolated(path: impl Into<PathBuf>) -> SettingsStore {
        SettingsStore::new(path).with_env_overrides(Vec::<(String, String)>::new())
    }

    #[test]
    fn test_load_or_init_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = isolated(dir.path().join("nested").join("config.toml"));

        let settings = store.load_or_init().unwrap();

        assert!(store.path().exists());
        assert!(settings.target_address.is_empty());
        assert_eq!(settings.discover_secs, 25);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = isolated(dir.path().join("config.toml"));

        let settings = Settings {
            target_address: "AA:BB:CC:DD:EE:FF".to_string(),
            lock_command: "swaylock".to_string(),
            unlock_command: "pkill -USR1 swaylock".to_string(),
            poll_interval_secs: 3,
            discover_secs: 8,
        };
        store.save(&settings).unwrap();

        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "target_address = \"AA:BB:CC:DD:EE:FF\"\n").unwrap();

        let settings = isolated(&path).load().unwrap();
        assert_eq!(settings.target_address, "AA:BB:CC:DD:EE:FF");
        assert_eq!(settings.poll_interval_secs, 5);
    }

    #[test]
    fn test_malformed_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "poll_interval_secs = \"soon\"\n").unwrap();

        let err = isolated(&path).load().unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_env_override_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "poll_interval_secs = 3\nlock_command = \"swaylock\"\n").unwrap();

        let store = SettingsStore::new(&path).with_env_overrides([
            ("PROXLOCK_POLL_INTERVAL_SECS", "10"),
            ("UNRELATED_LOCK_COMMAND", "ignored"),
        ]);
        let settings = store.load().unwrap();

        assert_eq!(settings.poll_interval_secs, 10);
        assert_eq!(settings.lock_command, "swaylock");
    }

    #[test]
    fn test_load_file_ignores_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "poll_interval_secs = 3\n").unwrap();

        let store =
            SettingsStore::new(&path).with_env_overrides([("PROXLOCK_POLL_INTERVAL_SECS", "10")]);

        assert_eq!(store.load_file().unwrap().poll_interval_secs, 3);
        assert_eq!(store.load().unwrap().poll_interval_secs, 10);
    }

    #[test]
    fn test_malformed_env_override_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("config.toml"))
            .with_env_overrides([("PROXLOCK_DISCOVER_SECS", "soon")]);
        store.save(&Settings::default()).unwrap();

        assert!(matches!(store.load(), Err(ConfigError::ReadError { .. })));
    }
}
