//! Case-insensitive substring search over page titles and content.
//!
//! # Invariants
//! - Results follow workspace order.
//! - The empty query matches every page; callers that want "no results for
//!   an empty box" must check before calling.

use crate::model::page::{Page, PageId};
use crate::model::workspace::Workspace;
use serde::Serialize;

/// Single search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: PageId,
    pub title: String,
}

/// Returns every page whose title or content contains `query`, ignoring case.
pub fn search_pages(workspace: &Workspace, query: &str) -> Vec<SearchHit> {
    let needle = query.to_lowercase();
    workspace
        .iter()
        .filter(|(_, page)| page_matches(page, needle.as_str()))
        .map(|(id, page)| SearchHit {
            id: id.clone(),
            title: page.title.clone(),
        })
        .collect()
}

/// Matches an already-lowercased needle against one page.
fn page_matches(page: &Page, lowered_needle: &str) -> bool {
    page.title.to_lowercase().contains(lowered_needle)
        || page.content.to_lowercase().contains(lowered_needle)
}
