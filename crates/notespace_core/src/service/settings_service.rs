//! Settings use-case service.
//!
//! # Invariants
//! - In-memory settings change only after the save succeeded.
//! - A blank model selection is ignored.

use crate::model::settings::{Settings, Theme, AVAILABLE_MODELS};
use crate::repo::json_file::RepoResult;
use crate::repo::settings_repo::SettingsRepository;
use log::info;
use std::sync::{PoisonError, RwLock};

/// Settings service facade.
pub struct SettingsService<R: SettingsRepository> {
    repo: R,
    current: RwLock<Settings>,
}

impl<R: SettingsRepository> SettingsService<R> {
    pub fn new(repo: R) -> Self {
        let current = repo.load();
        Self {
            repo,
            current: RwLock::new(current),
        }
    }

    /// Returns a copy of the current settings.
    pub fn settings(&self) -> Settings {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn theme(&self) -> Theme {
        self.settings().theme
    }

    /// Models offered for selection.
    pub fn available_models(&self) -> &'static [&'static str] {
        AVAILABLE_MODELS
    }

    /// Selects the default assistant model.
    ///
    /// Returns `Ok(false)` without saving when `model` is blank.
    pub fn set_model(&self, model: &str) -> RepoResult<bool> {
        let model = model.trim();
        if model.is_empty() {
            return Ok(false);
        }
        self.update(|settings| settings.model = model.to_string())?;
        info!("event=settings_update module=service status=ok field=model");
        Ok(true)
    }

    /// Flips between light and dark theme and returns the new theme.
    pub fn toggle_theme(&self) -> RepoResult<Theme> {
        let updated = self.update(|settings| settings.theme = settings.theme.toggled())?;
        info!(
            "event=settings_update module=service status=ok field=theme theme={}",
            updated.theme
        );
        Ok(updated.theme)
    }

    fn update(&self, change: impl FnOnce(&mut Settings)) -> RepoResult<Settings> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = current.clone();
        change(&mut next);
        self.repo.save(&next)?;
        *current = next.clone();
        Ok(next)
    }
}
