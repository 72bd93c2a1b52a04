//! Workspace map and page-tree operations.
//!
//! # Responsibility
//! - Hold every page keyed by id, in insertion order.
//! - Provide create/update/delete/row operations that keep tree invariants.
//! - Derive the sidebar forest from `children` links.
//!
//! # Invariants
//! - No id in any `children` vector is missing from the map after a
//!   mutation completes.
//! - Deletion is post-order: descendants leave the map before their parent.
//! - Tree walks are iterative and never expand a page already on the
//!   current path, so malformed cyclic data cannot hang them.

use crate::model::page::{normalize_title, Page, PageId};
use crate::model::table::Row;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Title of the page fabricated for a fresh workspace.
pub const DEFAULT_ROOT_TITLE: &str = "Home";
/// Content of the page fabricated for a fresh workspace.
pub const DEFAULT_ROOT_CONTENT: &str = "Welcome to your Notion‑style workspace!";

/// Structural defects detected in loaded workspace data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceIntegrityError {
    /// `parent` lists a child id that is not a workspace key.
    DanglingChild { parent: PageId, child: PageId },
    /// `page` is reachable from itself through `children` links.
    Cycle(PageId),
}

impl Display for WorkspaceIntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingChild { parent, child } => {
                write!(f, "page {parent} lists missing child {child}")
            }
            Self::Cycle(id) => write!(f, "page {id} is its own descendant"),
        }
    }
}

impl Error for WorkspaceIntegrityError {}

/// Sidebar tree node derived from the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageNode {
    pub id: PageId,
    pub title: String,
    pub children: Vec<PageNode>,
}

/// Whole persisted state: page id to page, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workspace {
    pages: IndexMap<PageId, Page>,
}

impl Workspace {
    /// Creates an empty workspace with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the workspace used when nothing usable is persisted: one
    /// root page with a welcome note.
    pub fn with_default_root() -> Self {
        let mut root = Page::new(DEFAULT_ROOT_TITLE);
        root.content = DEFAULT_ROOT_CONTENT.to_string();
        let mut workspace = Self::new();
        workspace.pages.insert(PageId::generate(), root);
        workspace
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn contains(&self, id: &PageId) -> bool {
        self.pages.contains_key(id)
    }

    pub fn get(&self, id: &PageId) -> Option<&Page> {
        self.pages.get(id)
    }

    /// Iterates pages in workspace order.
    pub fn iter(&self) -> impl Iterator<Item = (&PageId, &Page)> {
        self.pages.iter()
    }

    /// Returns all page ids in workspace order.
    pub fn ids(&self) -> Vec<PageId> {
        self.pages.keys().cloned().collect()
    }

    /// Inserts a page under a caller-chosen id, replacing any previous
    /// record with that id.
    ///
    /// Used by import paths and tests that need exact fixtures; it does not
    /// touch any `children` list.
    pub fn insert(&mut self, id: PageId, page: Page) {
        self.pages.insert(id, page);
    }

    /// Creates one page and links it under `parent` when that page exists.
    ///
    /// An unknown parent is ignored and the page becomes a root.
    pub fn add_page(&mut self, title: &str, parent: Option<&PageId>) -> PageId {
        let id = self.fresh_id();
        self.pages.insert(id.clone(), Page::new(title));
        if let Some(parent) = parent.and_then(|parent_id| self.pages.get_mut(parent_id)) {
            parent.children.push(id.clone());
        }
        id
    }

    /// Replaces title and content of one page.
    ///
    /// Returns `false` and changes nothing when `id` is unknown.
    pub fn update_page(&mut self, id: &PageId, title: &str, content: &str) -> bool {
        let Some(page) = self.pages.get_mut(id) else {
            return false;
        };
        page.title = normalize_title(title);
        page.content = content.to_string();
        true
    }

    /// Deletes one page with all of its descendants.
    ///
    /// Returns removed ids in removal order (descendants first, `id` last);
    /// empty when `id` is unknown.
    pub fn delete_page(&mut self, id: &PageId) -> Vec<PageId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let removal_order = self.post_order(id);
        for removed in &removal_order {
            self.detach(removed);
        }
        removal_order
    }

    /// Appends one row to a page table.
    ///
    /// Returns `false` when `id` is unknown.
    pub fn add_row(&mut self, id: &PageId, row: Row) -> bool {
        match self.pages.get_mut(id) {
            Some(page) => {
                page.rows.push(row);
                true
            }
            None => false,
        }
    }

    /// Returns ids not listed in any page's children, in workspace order.
    pub fn root_ids(&self) -> Vec<PageId> {
        let listed: HashSet<&PageId> = self
            .pages
            .values()
            .flat_map(|page| page.children.iter())
            .collect();
        self.pages
            .keys()
            .filter(|id| !listed.contains(id))
            .cloned()
            .collect()
    }

    /// Builds the forest of root trees, walking children in stored order.
    ///
    /// Recomputed on every call. Child ids that are not workspace keys are
    /// skipped.
    pub fn build_forest(&self) -> Vec<PageNode> {
        self.root_ids()
            .iter()
            .filter_map(|root| self.build_tree(root))
            .collect()
    }

    /// Checks that every child id exists and no page is its own descendant.
    pub fn check_integrity(&self) -> Result<(), WorkspaceIntegrityError> {
        for (parent, page) in &self.pages {
            if let Some(child) = page.children.iter().find(|child| !self.contains(child)) {
                return Err(WorkspaceIntegrityError::DanglingChild {
                    parent: parent.clone(),
                    child: child.clone(),
                });
            }
        }

        let mut marks: HashMap<&PageId, WalkMark> = HashMap::new();
        for start in self.pages.keys() {
            if marks.contains_key(start) {
                continue;
            }
            marks.insert(start, WalkMark::OnPath);
            let mut stack = vec![(start, 0usize)];
            while let Some(frame) = stack.last_mut() {
                let (current, cursor) = *frame;
                match self.child_at(current, cursor) {
                    Some(child) => {
                        frame.1 += 1;
                        match marks.get(child) {
                            Some(WalkMark::OnPath) => {
                                return Err(WorkspaceIntegrityError::Cycle(child.clone()));
                            }
                            Some(WalkMark::Done) => {}
                            None => {
                                marks.insert(child, WalkMark::OnPath);
                                stack.push((child, 0));
                            }
                        }
                    }
                    None => {
                        marks.insert(current, WalkMark::Done);
                        stack.pop();
                    }
                }
            }
        }
        Ok(())
    }

    fn fresh_id(&self) -> PageId {
        loop {
            let id = PageId::generate();
            if !self.pages.contains_key(&id) {
                return id;
            }
        }
    }

    fn child_at(&self, id: &PageId, index: usize) -> Option<&PageId> {
        self.pages
            .get(id)
            .and_then(|page| page.children.get(index))
    }

    /// Lists `start` and every existing descendant, children before parents.
    fn post_order(&self, start: &PageId) -> Vec<PageId> {
        let mut order = Vec::new();
        let mut seen = HashSet::from([start]);
        let mut stack = vec![(start, 0usize)];
        while let Some(frame) = stack.last_mut() {
            let (current, cursor) = *frame;
            match self.child_at(current, cursor) {
                Some(child) => {
                    frame.1 += 1;
                    if self.contains(child) && seen.insert(child) {
                        stack.push((child, 0));
                    }
                }
                None => {
                    stack.pop();
                    order.push(current.clone());
                }
            }
        }
        order
    }

    /// Scrubs `id` from every children list, then removes the page.
    fn detach(&mut self, id: &PageId) {
        for page in self.pages.values_mut() {
            page.children.retain(|child| child != id);
        }
        self.pages.shift_remove(id);
    }

    fn build_tree(&self, root: &PageId) -> Option<PageNode> {
        struct Frame<'a> {
            id: &'a PageId,
            cursor: usize,
            children: Vec<PageNode>,
        }

        let mut on_path = HashSet::from([root]);
        let mut stack = vec![Frame {
            id: root,
            cursor: 0,
            children: Vec::new(),
        }];
        while let Some(frame) = stack.last_mut() {
            if let Some(child) = self.child_at(frame.id, frame.cursor) {
                frame.cursor += 1;
                if self.contains(child) && on_path.insert(child) {
                    stack.push(Frame {
                        id: child,
                        cursor: 0,
                        children: Vec::new(),
                    });
                }
                continue;
            }

            let finished = stack.pop()?;
            on_path.remove(finished.id);
            let node = PageNode {
                id: finished.id.clone(),
                title: self.get(finished.id)?.title.clone(),
                children: finished.children,
            };
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => return Some(node),
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkMark {
    OnPath,
    Done,
}

#[cfg(test)]
mod tests {
    use super::{Workspace, WorkspaceIntegrityError, DEFAULT_ROOT_TITLE};
    use crate::model::page::{Page, PageId};

    #[test]
    fn default_workspace_has_single_home_root() {
        let workspace = Workspace::with_default_root();
        let roots = workspace.root_ids();
        assert_eq!(roots.len(), 1);
        assert_eq!(workspace.get(&roots[0]).unwrap().title, DEFAULT_ROOT_TITLE);
    }

    #[test]
    fn integrity_rejects_self_parenting() {
        let mut workspace = Workspace::new();
        let id = PageId::from("loop");
        let mut page = Page::new("Loop");
        page.children.push(id.clone());
        workspace.insert(id.clone(), page);
        assert_eq!(
            workspace.check_integrity(),
            Err(WorkspaceIntegrityError::Cycle(id))
        );
    }

    #[test]
    fn integrity_accepts_shared_child() {
        let mut workspace = Workspace::new();
        let a = workspace.add_page("A", None);
        let b = workspace.add_page("B", None);
        let shared = workspace.add_page("Shared", Some(&a));
        let mut page_b = workspace.get(&b).unwrap().clone();
        page_b.children.push(shared);
        workspace.insert(b, page_b);
        assert!(workspace.check_integrity().is_ok());
    }

    #[test]
    fn forest_walk_stops_at_cycles() {
        let mut workspace = Workspace::new();
        let root = workspace.add_page("Root", None);
        let child = workspace.add_page("Child", Some(&root));
        let mut looped = workspace.get(&child).unwrap().clone();
        looped.children.push(root.clone());
        workspace.insert(child, looped);

        // Every page is now listed somewhere, so there are no roots at all.
        assert!(workspace.build_forest().is_empty());
        assert_eq!(workspace.delete_page(&root).len(), 2);
        assert!(workspace.is_empty());
    }
}
