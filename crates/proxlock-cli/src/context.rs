//! Settings context shared by the subcommands.

use std::path::PathBuf;

use proxlock_core::{Settings, SettingsStore};

/// Loaded settings together with the store they came from.
///
/// Keeps two views: the effective settings, with `PROXLOCK_*` overrides
/// applied, and the settings as saved in the file. Edits start from the saved
/// view so an override is never written back.
#[derive(Debug, Clone)]
pub struct AppContext {
    store: SettingsStore,
    settings: Settings,
    saved: Settings,
}

impl AppContext {
    /// Load settings from `path`, or from the default location when `None`.
    /// Creates the file with defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be located, created, or read.
    pub fn load(path: Option<PathBuf>) -> anyhow::Result<Self> {
        let store = match path {
            Some(path) => SettingsStore::new(path),
            None => SettingsStore::locate()?,
        };
        Self::open(store)
    }

    /// Load both views of the settings from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be created or read.
    pub fn open(store: SettingsStore) -> anyhow::Result<Self> {
        let settings = store.load_or_init()?;
        let saved = store.load_file()?;
        Ok(Self {
            store,
            settings,
            saved,
        })
    }

    /// Effective settings, including environment overrides.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Settings as stored in the file.
    pub const fn saved(&self) -> &Settings {
        &self.saved
    }

    /// Persist `saved` and refresh the effective settings from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be written or read back.
    pub fn update(&mut self, saved: Settings) -> anyhow::Result<()> {
        self.store.save(&saved)?;
        self.settings = self.store.load()?;
        self.saved = saved;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::assert_ok;

    use super::*;

    fn isolated(path: PathBuf) -> SettingsStore {
        SettingsStore::new(path).with_env_overrides(Vec::<(String, String)>::new())
    }

    #[test]
    fn test_load_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let ctx = AppContext::open(isolated(path.clone())).unwrap();

        assert!(path.exists());
        assert!(ctx.settings().target_address.is_empty());
    }

    #[test]
    fn test_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut ctx = AppContext::open(isolated(path.clone())).unwrap();

        let settings = Settings {
            target_address: "AA:BB:CC:DD:EE:FF".to_string(),
            ..ctx.saved().clone()
        };
        assert_ok!(ctx.update(settings));

        let reloaded = AppContext::open(isolated(path)).unwrap();
        assert_eq!(reloaded.settings().target_address, "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_env_override_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let store = SettingsStore::new(&path)
            .with_env_overrides([("PROXLOCK_POLL_INTERVAL_SECS", "42")]);
        let mut ctx = AppContext::open(store).unwrap();

        assert_eq!(ctx.settings().poll_interval_secs, 42);
        assert_eq!(ctx.saved().poll_interval_secs, 5);

        let settings = Settings {
            target_address: "AA:BB:CC:DD:EE:FF".to_string(),
            ..ctx.saved().clone()
        };
        ctx.update(settings).unwrap();

        assert_eq!(ctx.settings().poll_interval_secs, 42);
        assert_eq!(ctx.settings().target_address, "AA:BB:CC:DD:EE:FF");

        let on_disk = isolated(path).load().unwrap();
        assert_eq!(on_disk.poll_interval_secs, 5);
        assert_eq!(on_disk.target_address, "AA:BB:CC:DD:EE:FF");
    }
}
