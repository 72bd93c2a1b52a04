//! JSON file helpers shared by file-backed repositories.
//!
//! # Invariants
//! - Writes go to a sibling temp file which is synced and then renamed over
//!   the target, so readers see either the old or the new document.
//! - A failed write removes its temp file.
//! - A document set aside is renamed, never copied or truncated.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for save paths.
#[derive(Debug)]
pub enum RepoError {
    /// File system failure while writing `path`.
    Io { path: PathBuf, source: io::Error },
    /// Value could not be encoded.
    Serialize(serde_json::Error),
    /// Backend refused the write (used by in-memory repositories).
    Unavailable(String),
}

impl RepoError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to write `{}`: {source}", path.display()),
            Self::Serialize(err) => write!(f, "failed to encode document: {err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Why a JSON document could not be read.
#[derive(Debug)]
pub(crate) enum ReadFailure {
    Missing,
    Unreadable(io::Error),
    Corrupt(serde_json::Error),
}

impl ReadFailure {
    /// Short reason code used in log events.
    pub(crate) fn code(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Unreadable(_) => "unreadable",
            Self::Corrupt(_) => "corrupt",
        }
    }
}

impl Display for ReadFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "file does not exist"),
            Self::Unreadable(err) => write!(f, "{err}"),
            Self::Corrupt(err) => write!(f, "{err}"),
        }
    }
}

/// Reads and decodes one JSON document.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ReadFailure> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(ReadFailure::Missing),
        Err(err) => return Err(ReadFailure::Unreadable(err)),
    };
    serde_json::from_slice(&bytes).map_err(ReadFailure::Corrupt)
}

/// Encodes `value` as pretty JSON and atomically replaces `path`.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> RepoResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');

    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| RepoError::io(parent, err))?;
    }

    let temp_path = temp_sibling(path);
    let written = (|| -> io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(RepoError::io(path, err));
    }
    Ok(())
}

/// Renames `path` to a timestamped `.broken-<millis>` sibling so a fresh
/// document can take its place. Returns the new location.
pub(crate) fn set_aside(path: &Path) -> io::Result<PathBuf> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let target = path.with_file_name(format!("{}.broken-{stamp}", file_name(path)));
    fs::rename(path, &target)?;
    Ok(target)
}

fn temp_sibling(path: &Path) -> PathBuf {
    path.with_file_name(format!(".{}.tmp", file_name(path)))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

#[cfg(test)]
mod tests {
    use super::{read_json, set_aside, temp_sibling, write_json_atomic, ReadFailure};
    use std::path::Path;

    #[test]
    fn temp_file_is_hidden_sibling() {
        assert_eq!(
            temp_sibling(Path::new("/data/pages.json")),
            Path::new("/data/.pages.json.tmp")
        );
    }

    #[test]
    fn write_then_read_returns_same_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        write_json_atomic(&path, &vec!["a", "b"]).unwrap();

        let loaded: Vec<String> = read_json(&path).unwrap();
        assert_eq!(loaded, ["a", "b"]);
        assert!(!temp_sibling(&path).exists());
    }

    #[test]
    fn read_reports_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        assert!(matches!(
            read_json::<Vec<String>>(&path),
            Err(ReadFailure::Missing)
        ));

        std::fs::write(&path, "{not json").unwrap();
        let failure = read_json::<Vec<String>>(&path).unwrap_err();
        assert_eq!(failure.code(), "corrupt");
    }

    #[test]
    fn set_aside_moves_document_with_its_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.json");
        std::fs::write(&path, "{half a doc").unwrap();

        let moved = set_aside(&path).unwrap();

        assert!(!path.exists());
        assert_eq!(moved.parent(), Some(dir.path()));
        let name = moved.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("pages.json.broken-"), "{name}");
        assert_eq!(std::fs::read_to_string(&moved).unwrap(), "{half a doc");
    }
}
