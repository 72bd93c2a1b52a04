//! Workspace repository contracts and implementations.
//!
//! # Responsibility
//! - Load the whole workspace at startup and save it after every mutation.
//! - Fail open on load: absent, corrupt or structurally invalid data is
//!   replaced by a fresh default workspace, which is persisted right away.
//!
//! # Invariants
//! - `load` never returns an error.
//! - A loaded workspace has no dangling children and no cycles.
//! - An existing document is never overwritten by a fabricated default. It
//!   is set aside first; if that fails, the repository refuses every save
//!   until it is reopened.

use crate::model::workspace::Workspace;
use crate::repo::json_file::{
    read_json, set_aside, write_json_atomic, ReadFailure, RepoError, RepoResult,
};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Persistence boundary for the whole workspace.
pub trait WorkspaceRepository: Send + Sync {
    /// Loads the persisted workspace or fabricates and persists a default.
    fn load(&self) -> Workspace;
    /// Replaces the persisted workspace with `workspace`.
    fn save(&self, workspace: &Workspace) -> RepoResult<()>;
}

/// Workspace stored as one JSON document on disk.
#[derive(Debug)]
pub struct JsonFileWorkspaceRepository {
    path: PathBuf,
    read_only: AtomicBool,
}

impl JsonFileWorkspaceRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_only: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when a document that could not be loaded is still in place and
    /// saves are refused to protect it.
    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst)
    }

    fn fabricate_default(&self, reason: &str) -> Workspace {
        let workspace = Workspace::with_default_root();
        match self.save(&workspace) {
            Ok(()) => info!(
                "event=workspace_load module=repo status=fallback reason={} path={}",
                reason,
                self.path.display()
            ),
            Err(err) => error!(
                "event=workspace_load module=repo status=error reason={} error_code=default_save_failed error={}",
                reason, err
            ),
        }
        workspace
    }

    /// Moves a rejected document out of the way before the default is
    /// written. When it cannot be moved, the default stays in memory only.
    fn replace_rejected(&self, reason: &str) -> Workspace {
        match set_aside(&self.path) {
            Ok(moved) => {
                warn!(
                    "event=workspace_set_aside module=repo status=ok reason={} moved_to={}",
                    reason,
                    moved.display()
                );
                self.fabricate_default(reason)
            }
            Err(err) => {
                self.read_only.store(true, Ordering::SeqCst);
                error!(
                    "event=workspace_set_aside module=repo status=error reason={} error_code=read_only error={}",
                    reason, err
                );
                Workspace::with_default_root()
            }
        }
    }
}

impl WorkspaceRepository for JsonFileWorkspaceRepository {
    fn load(&self) -> Workspace {
        let started_at = Instant::now();
        let workspace = match read_json::<Workspace>(&self.path) {
            Ok(workspace) => workspace,
            Err(ReadFailure::Missing) => return self.fabricate_default("missing"),
            Err(failure) => {
                warn!(
                    "event=workspace_load module=repo status=degraded reason={} error={}",
                    failure.code(),
                    failure
                );
                return self.replace_rejected(failure.code());
            }
        };

        if let Err(defect) = workspace.check_integrity() {
            warn!(
                "event=workspace_load module=repo status=degraded reason=invalid_structure error={}",
                defect
            );
            return self.replace_rejected("invalid_structure");
        }

        self.read_only.store(false, Ordering::SeqCst);
        info!(
            "event=workspace_load module=repo status=ok pages={} duration_ms={}",
            workspace.len(),
            started_at.elapsed().as_millis()
        );
        workspace
    }

    fn save(&self, workspace: &Workspace) -> RepoResult<()> {
        if self.is_read_only() {
            warn!(
                "event=workspace_save module=repo status=rejected reason=read_only path={}",
                self.path.display()
            );
            return Err(RepoError::Unavailable(format!(
                "`{}` could not be read and is left untouched",
                self.path.display()
            )));
        }
        let started_at = Instant::now();
        match write_json_atomic(&self.path, workspace) {
            Ok(()) => {
                info!(
                    "event=workspace_save module=repo status=ok pages={} duration_ms={}",
                    workspace.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=workspace_save module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// In-memory workspace repository.
///
/// Counts saves and can be switched into a failing mode, which makes it the
/// repository of choice for service-level tests.
#[derive(Debug, Default)]
pub struct MemoryWorkspaceRepository {
    stored: Mutex<Option<Workspace>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryWorkspaceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository whose next `load` returns `workspace`.
    pub fn seeded(workspace: Workspace) -> Self {
        Self {
            stored: Mutex::new(Some(workspace)),
            ..Self::default()
        }
    }

    /// Returns the last saved workspace.
    pub fn stored(&self) -> Option<Workspace> {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Makes every following save fail when `fail` is true.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl WorkspaceRepository for MemoryWorkspaceRepository {
    fn load(&self) -> Workspace {
        let mut stored = self.stored.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(workspace) = stored.as_ref() {
            if workspace.check_integrity().is_ok() {
                return workspace.clone();
            }
        }
        let workspace = Workspace::with_default_root();
        *stored = Some(workspace.clone());
        workspace
    }

    fn save(&self, workspace: &Workspace) -> RepoResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(RepoError::Unavailable(
                "memory repository is in failing mode".to_string(),
            ));
        }
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(workspace.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl<R: WorkspaceRepository + ?Sized> WorkspaceRepository for std::sync::Arc<R> {
    fn load(&self) -> Workspace {
        (**self).load()
    }

    fn save(&self, workspace: &Workspace) -> RepoResult<()> {
        (**self).save(workspace)
    }
}
