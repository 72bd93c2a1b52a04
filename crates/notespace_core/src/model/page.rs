//! Page domain model.
//!
//! # Responsibility
//! - Define the single persisted record of the workspace.
//! - Own the title normalization rule shared by create and update.
//!
//! # Invariants
//! - `title` is never blank; blank input becomes [`DEFAULT_PAGE_TITLE`].
//! - `children` keeps insertion order, which is also display order.
//! - The page id is the workspace key and is not stored inside the record.

use crate::model::table::Row;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for one page.
///
/// Opaque: any string read from storage is kept byte for byte. New ids are
/// random UUIDs in their hyphenated lowercase form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Creates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for PageId {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(value))
    }
}

/// Placeholder title used when the caller supplies a blank one.
pub const DEFAULT_PAGE_TITLE: &str = "Untitled";

/// Canonical persisted page record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// User-facing title, never blank.
    pub title: String,
    /// Raw text in the content markup dialect, stored verbatim.
    #[serde(default)]
    pub content: String,
    /// Ordered child page ids.
    #[serde(default)]
    pub children: Vec<PageId>,
    /// Schemaless table rows. Serialized as `database` to match the
    /// persisted workspace layout.
    #[serde(default, rename = "database")]
    pub rows: Vec<Row>,
}

impl Page {
    /// Creates an empty page with a normalized title.
    pub fn new(title: &str) -> Self {
        Self {
            title: normalize_title(title),
            content: String::new(),
            children: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Returns whether `child` is listed among this page's children.
    pub fn has_child(&self, child: &PageId) -> bool {
        self.children.contains(child)
    }
}

/// Trims a title and falls back to [`DEFAULT_PAGE_TITLE`] when blank.
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_PAGE_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_title, Page, PageId, DEFAULT_PAGE_TITLE};

    #[test]
    fn blank_title_falls_back_to_placeholder() {
        assert_eq!(normalize_title("   \t"), DEFAULT_PAGE_TITLE);
        assert_eq!(normalize_title(""), DEFAULT_PAGE_TITLE);
    }

    #[test]
    fn title_is_trimmed() {
        assert_eq!(normalize_title("  Notes "), "Notes");
    }

    #[test]
    fn missing_optional_fields_deserialize_as_empty() {
        let page: Page = serde_json::from_str(r#"{"title":"Bare"}"#).unwrap();
        assert_eq!(page, Page::new("Bare"));
    }

    #[test]
    fn rows_serialize_under_database_key() {
        let value = serde_json::to_value(Page::new("Tasks")).unwrap();
        assert!(value.get("database").is_some());
        assert!(value.get("rows").is_none());
    }

    #[test]
    fn ids_keep_their_stored_spelling() {
        let raw = r#"["root","6F9619FF-8B86-D011-B42D-00C04FC964FF","{braced}"]"#;
        let ids: Vec<PageId> = serde_json::from_str(raw).unwrap();
        assert_eq!(ids[0].as_str(), "root");
        assert_eq!(serde_json::to_string(&ids).unwrap(), raw);
    }

    #[test]
    fn generated_ids_are_distinct_uuids() {
        let first = PageId::generate();
        let second = PageId::generate();
        assert_ne!(first, second);
        assert!(uuid::Uuid::parse_str(first.as_str()).is_ok());
    }
}
