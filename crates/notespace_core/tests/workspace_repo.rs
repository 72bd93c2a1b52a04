use notespace_core::model::workspace::{DEFAULT_ROOT_CONTENT, DEFAULT_ROOT_TITLE};
use notespace_core::repo::workspace_repo::{
    JsonFileWorkspaceRepository, MemoryWorkspaceRepository, WorkspaceRepository,
};
use notespace_core::{PageId, RepoError, Workspace};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

fn assert_default_workspace(workspace: &Workspace) {
    assert_eq!(workspace.len(), 1);
    let (_, root) = workspace.iter().next().unwrap();
    assert_eq!(root.title, DEFAULT_ROOT_TITLE);
    assert_eq!(root.content, DEFAULT_ROOT_CONTENT);
    assert!(root.children.is_empty());
}

fn persisted(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Documents moved out of the way by a failed load, oldest first.
fn set_aside_documents(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("pages.json.broken-")
        })
        .collect();
    found.sort();
    found
}

#[test]
fn missing_file_fabricates_and_persists_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("pages.json");
    let repo = JsonFileWorkspaceRepository::new(&path);

    let workspace = repo.load();

    assert_default_workspace(&workspace);
    assert!(path.exists());
    let on_disk = persisted(&path);
    let object = on_disk.as_object().unwrap();
    assert_eq!(object.len(), 1);
    let root = object.values().next().unwrap();
    assert_eq!(root["title"], "Home");
    assert_eq!(root["database"], json!([]));
}

#[test]
fn opaque_ids_survive_load_and_save_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.json");
    fs::write(
        &path,
        r#"{"root":{"title":"Home","content":"my notes","children":["n"],"database":[]},"n":{"title":"Child","content":"","children":[],"database":[{"Status":"Done"}]}}"#,
    )
    .unwrap();
    let repo = JsonFileWorkspaceRepository::new(&path);

    let workspace = repo.load();

    let root = PageId::from("root");
    let child = PageId::from("n");
    assert_eq!(workspace.ids(), vec![root.clone(), child.clone()]);
    assert_eq!(workspace.get(&root).unwrap().content, "my notes");
    assert_eq!(workspace.get(&root).unwrap().children, vec![child.clone()]);
    assert_eq!(workspace.get(&child).unwrap().rows.len(), 1);
    assert!(set_aside_documents(dir.path()).is_empty());

    repo.save(&workspace).unwrap();
    let first = fs::read(&path).unwrap();
    repo.save(&repo.load()).unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(persisted(&path)["root"]["children"], json!(["n"]));
}

#[test]
fn uppercase_ids_keep_their_spelling() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.json");
    let key = "6F9619FF-8B86-D011-B42D-00C04FC964FF";
    fs::write(&path, json!({ key: { "title": "Upper" } }).to_string()).unwrap();
    let repo = JsonFileWorkspaceRepository::new(&path);

    let workspace = repo.load();
    repo.save(&workspace).unwrap();

    assert!(workspace.contains(&PageId::from(key)));
    assert_eq!(persisted(&path)[key]["title"], "Upper");
}

#[test]
fn corrupt_file_is_set_aside_and_replaced_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.json");
    fs::write(&path, "{ this is not json").unwrap();

    let workspace = JsonFileWorkspaceRepository::new(&path).load();

    assert_default_workspace(&workspace);
    assert!(persisted(&path).is_object());
    let moved = set_aside_documents(dir.path());
    assert_eq!(moved.len(), 1);
    assert_eq!(fs::read_to_string(&moved[0]).unwrap(), "{ this is not json");
}

#[test]
fn unreadable_document_is_moved_aside_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.json");
    fs::create_dir(&path).unwrap();
    fs::write(path.join("inside.txt"), "keep me").unwrap();
    let repo = JsonFileWorkspaceRepository::new(&path);

    let workspace = repo.load();

    assert_default_workspace(&workspace);
    assert!(!repo.is_read_only());
    assert!(path.is_file());
    let moved = set_aside_documents(dir.path());
    assert_eq!(moved.len(), 1);
    assert_eq!(
        fs::read_to_string(moved[0].join("inside.txt")).unwrap(),
        "keep me"
    );
}

#[test]
fn dangling_child_fails_load_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.json");
    let original = json!({ "parent": { "title": "P", "children": ["ghost"] } }).to_string();
    fs::write(&path, &original).unwrap();

    let workspace = JsonFileWorkspaceRepository::new(&path).load();

    assert_default_workspace(&workspace);
    assert!(!workspace.contains(&PageId::from("parent")));
    let moved = set_aside_documents(dir.path());
    assert_eq!(moved.len(), 1);
    assert_eq!(fs::read_to_string(&moved[0]).unwrap(), original);
}

#[test]
fn cycle_fails_load_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.json");
    fs::write(
        &path,
        json!({
            "a": { "title": "A", "children": ["b"] },
            "b": { "title": "B", "children": ["a"] },
        })
        .to_string(),
    )
    .unwrap();

    let workspace = JsonFileWorkspaceRepository::new(&path).load();

    assert_default_workspace(&workspace);
    assert_eq!(set_aside_documents(dir.path()).len(), 1);
}

#[test]
fn shared_child_and_missing_fields_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.json");
    fs::write(
        &path,
        json!({
            "left": { "title": "Left", "children": ["shared"] },
            "right": { "title": "Right", "children": ["shared"] },
            "shared": { "title": "Shared" },
        })
        .to_string(),
    )
    .unwrap();

    let workspace = JsonFileWorkspaceRepository::new(&path).load();

    let ids: Vec<String> = workspace.ids().iter().map(|id| id.to_string()).collect();
    assert_eq!(ids, ["left", "right", "shared"]);
    let page = workspace.get(&PageId::from("shared")).unwrap();
    assert!(page.content.is_empty());
    assert!(page.rows.is_empty());
}

#[test]
fn save_load_save_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.json");
    let repo = JsonFileWorkspaceRepository::new(&path);

    let mut workspace = repo.load();
    let root = workspace.ids()[0].clone();
    let child = workspace.add_page("Café ☕", Some(&root));
    workspace.update_page(&child, "Café ☕", "- [x] grind beans");
    workspace.add_page("Second root", None);
    repo.save(&workspace).unwrap();
    let first = fs::read(&path).unwrap();

    let reloaded = repo.load();
    assert_eq!(reloaded, workspace);
    repo.save(&reloaded).unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second);
    assert!(String::from_utf8(first).unwrap().contains("Café ☕"));
}

#[test]
fn failed_save_reports_error_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.json");
    fs::create_dir(&path).unwrap();
    let repo = JsonFileWorkspaceRepository::new(&path);

    let err = repo.save(&Workspace::with_default_root()).unwrap_err();

    assert!(matches!(err, RepoError::Io { .. }));
    assert!(!dir.path().join(".pages.json.tmp").exists());
    assert!(path.is_dir());
}

#[test]
fn memory_repository_counts_saves_and_can_fail() {
    let repo = MemoryWorkspaceRepository::new();
    let workspace = repo.load();
    assert_default_workspace(&workspace);
    assert_eq!(repo.save_count(), 0);

    repo.save(&workspace).unwrap();
    assert_eq!(repo.save_count(), 1);

    repo.set_fail_saves(true);
    assert!(repo.save(&workspace).is_err());
    assert_eq!(repo.save_count(), 1);
    assert_eq!(repo.stored(), Some(workspace));
}
