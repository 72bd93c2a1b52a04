//! Settings repository contracts and implementations.
//!
//! Unlike the workspace, defaults fabricated on load are not written back;
//! the file appears with the first settings change.

use crate::model::settings::Settings;
use crate::repo::json_file::{read_json, write_json_atomic, RepoError, RepoResult};
use log::{error, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Persistence boundary for user settings.
pub trait SettingsRepository: Send + Sync {
    /// Loads settings, default-filling anything missing or unreadable.
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> RepoResult<()>;
}

/// Settings stored as one JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSettingsRepository {
    path: PathBuf,
}

impl JsonFileSettingsRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsRepository for JsonFileSettingsRepository {
    fn load(&self) -> Settings {
        match read_json::<Settings>(&self.path) {
            Ok(settings) => settings,
            Err(failure) => {
                if failure.code() != "missing" {
                    warn!(
                        "event=settings_load module=repo status=degraded reason={} error={}",
                        failure.code(),
                        failure
                    );
                }
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> RepoResult<()> {
        write_json_atomic(&self.path, settings).inspect_err(|err| {
            error!("event=settings_save module=repo status=error error={}", err);
        })
    }
}

/// In-memory settings repository for tests.
#[derive(Debug, Default)]
pub struct MemorySettingsRepository {
    stored: Mutex<Option<Settings>>,
    fail_saves: AtomicBool,
}

impl MemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(settings: Settings) -> Self {
        Self {
            stored: Mutex::new(Some(settings)),
            ..Self::default()
        }
    }

    /// Returns the last saved settings.
    pub fn stored(&self) -> Option<Settings> {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl SettingsRepository for MemorySettingsRepository {
    fn load(&self) -> Settings {
        self.stored().unwrap_or_default()
    }

    fn save(&self, settings: &Settings) -> RepoResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(RepoError::Unavailable(
                "memory repository is in failing mode".to_string(),
            ));
        }
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(settings.clone());
        Ok(())
    }
}

impl<R: SettingsRepository + ?Sized> SettingsRepository for std::sync::Arc<R> {
    fn load(&self) -> Settings {
        (**self).load()
    }

    fn save(&self, settings: &Settings) -> RepoResult<()> {
        (**self).save(settings)
    }
}
