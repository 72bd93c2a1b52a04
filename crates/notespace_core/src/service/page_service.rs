//! Page tree use-case service.
//!
//! # Responsibility
//! - Own the single in-memory workspace loaded at construction.
//! - Serialize every mutation and persist the whole workspace after it.
//! - Serve reads from a consistent view of the workspace.
//!
//! # Invariants
//! - Mutations hold the write lock until their save has returned, so no
//!   reader observes a half-applied change.
//! - Unknown ids on update/delete and unknown parents on create are silent;
//!   adding a row to an unknown page is an error.
//! - A failed save leaves the in-memory workspace ahead of disk; the error
//!   is returned to the caller.

use crate::model::page::{Page, PageId};
use crate::model::table::{compact_row, table_columns, Row, RowInput};
use crate::model::workspace::{PageNode, Workspace};
use crate::repo::json_file::RepoError;
use crate::repo::workspace_repo::WorkspaceRepository;
use crate::search::text::{search_pages, SearchHit};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

/// Errors from page service operations.
#[derive(Debug)]
pub enum PageServiceError {
    /// Target page does not exist.
    PageNotFound(PageId),
    /// Persisting the workspace failed.
    Repo(RepoError),
}

impl Display for PageServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PageNotFound(id) => write!(f, "page not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PageServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::PageNotFound(_) => None,
        }
    }
}

impl From<RepoError> for PageServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Page tree service facade.
pub struct PageService<R: WorkspaceRepository> {
    repo: R,
    workspace: RwLock<Workspace>,
}

impl<R: WorkspaceRepository> PageService<R> {
    /// Loads the workspace through `repo` and takes ownership of both.
    pub fn new(repo: R) -> Self {
        let workspace = repo.load();
        Self {
            repo,
            workspace: RwLock::new(workspace),
        }
    }

    /// Creates one page, nested under `parent` when that page exists.
    pub fn add_page(
        &self,
        title: &str,
        parent: Option<&PageId>,
    ) -> Result<PageId, PageServiceError> {
        let started_at = Instant::now();
        let mut workspace = self.write();
        let id = workspace.add_page(title, parent);
        let linked = parent.is_some_and(|parent_id| {
            workspace
                .get(parent_id)
                .is_some_and(|page| page.has_child(&id))
        });
        self.persist(&workspace, "page_create")?;
        info!(
            "event=page_create module=service status=ok page_id={} linked={} duration_ms={}",
            id,
            linked,
            started_at.elapsed().as_millis()
        );
        Ok(id)
    }

    /// Replaces title and content of one page.
    ///
    /// Returns `Ok(false)` without saving when `id` is unknown.
    pub fn update_page(
        &self,
        id: &PageId,
        title: &str,
        content: &str,
    ) -> Result<bool, PageServiceError> {
        let mut workspace = self.write();
        if !workspace.update_page(id, title, content) {
            info!("event=page_update module=service status=skipped reason=unknown_page page_id={id}");
            return Ok(false);
        }
        self.persist(&workspace, "page_update")?;
        info!("event=page_update module=service status=ok page_id={id}");
        Ok(true)
    }

    /// Deletes one page and its descendants, then saves once.
    ///
    /// Returns removed ids, descendants first; empty without saving when
    /// `id` is unknown.
    pub fn delete_page(&self, id: &PageId) -> Result<Vec<PageId>, PageServiceError> {
        let mut workspace = self.write();
        let removed = workspace.delete_page(id);
        if removed.is_empty() {
            info!("event=page_delete module=service status=skipped reason=unknown_page page_id={id}");
            return Ok(removed);
        }
        self.persist(&workspace, "page_delete")?;
        info!(
            "event=page_delete module=service status=ok page_id={} removed={}",
            id,
            removed.len()
        );
        Ok(removed)
    }

    /// Appends one row to a page table, dropping empty values.
    pub fn add_row(&self, id: &PageId, row: Row) -> Result<(), PageServiceError> {
        self.append_row(id, compact_row(row))
    }

    /// Appends the row described by a table form submission.
    pub fn submit_row(&self, id: &PageId, input: RowInput) -> Result<(), PageServiceError> {
        self.append_row(id, input.into_row())
    }

    /// Builds the sidebar forest from the current workspace.
    pub fn build_forest(&self) -> Vec<PageNode> {
        self.read().build_forest()
    }

    /// Raw case-insensitive substring search; the empty query matches all.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        search_pages(&self.read(), query)
    }

    /// Returns a copy of one page.
    pub fn get_page(&self, id: &PageId) -> Option<Page> {
        self.read().get(id).cloned()
    }

    /// Returns the rows of one page, or `None` when the page is unknown.
    pub fn rows(&self, id: &PageId) -> Option<Vec<Row>> {
        self.read().get(id).map(|page| page.rows.clone())
    }

    /// Returns the union of a page's row columns in first-seen order.
    pub fn table_columns(&self, id: &PageId) -> Option<Vec<String>> {
        self.read().get(id).map(|page| table_columns(&page.rows))
    }

    /// Returns page ids in workspace order.
    pub fn page_ids(&self) -> Vec<PageId> {
        self.read().ids()
    }

    /// Returns a copy of the whole workspace.
    pub fn snapshot(&self) -> Workspace {
        self.read().clone()
    }

    /// Number of pages in the workspace.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn append_row(&self, id: &PageId, row: Row) -> Result<(), PageServiceError> {
        let mut workspace = self.write();
        if !workspace.add_row(id, row) {
            warn!("event=row_add module=service status=error error_code=unknown_page page_id={id}");
            return Err(PageServiceError::PageNotFound(id.clone()));
        }
        self.persist(&workspace, "row_add")?;
        info!("event=row_add module=service status=ok page_id={id}");
        Ok(())
    }

    fn persist(&self, workspace: &Workspace, event: &str) -> Result<(), PageServiceError> {
        self.repo.save(workspace).map_err(|err| {
            error!(
                "event={} module=service status=error error_code=save_failed error={}",
                event, err
            );
            PageServiceError::Repo(err)
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Workspace> {
        self.workspace.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Workspace> {
        self.workspace.write().unwrap_or_else(PoisonError::into_inner)
    }
}
