use async_trait::async_trait;
use notespace_core::repo::settings_repo::MemorySettingsRepository;
use notespace_core::repo::workspace_repo::MemoryWorkspaceRepository;
use notespace_core::{
    App, AppError, IdentityError, IdentityProvider, IdentityResult, PageId, RowInput, Theme,
    TokenPair,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

type TestApp = App<Arc<MemoryWorkspaceRepository>, MemorySettingsRepository>;

/// Accepts one password and counts calls.
#[derive(Default)]
struct FakeIdentity {
    calls: AtomicUsize,
}

const GOOD_PASSWORD: &str = "correct horse";

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_up(&self, _email: &str, _password: &str) -> IdentityResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_in(&self, _email: &str, password: &str) -> IdentityResult<TokenPair> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if password == GOOD_PASSWORD {
            Ok(TokenPair {
                access_token: "access".to_string(),
                refresh_token: "refresh".to_string(),
            })
        } else {
            Err(IdentityError::Rejected {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })
        }
    }
}

fn setup() -> (Arc<MemoryWorkspaceRepository>, Arc<FakeIdentity>, TestApp) {
    let repo = Arc::new(MemoryWorkspaceRepository::new());
    let identity = Arc::new(FakeIdentity::default());
    let app = App::new(
        Arc::clone(&repo),
        MemorySettingsRepository::new(),
        identity.clone(),
    );
    (repo, identity, app)
}

#[test]
fn reads_need_no_session() {
    let (_, _, app) = setup();

    let forest = app.forest();
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].title, "Home");

    let rendered = app.render_page(&forest[0].id).unwrap();
    assert_eq!(rendered.html, "<p>Welcome to your Notion‑style workspace!</p>");
    assert_eq!(app.current_user(None), None);
    assert!(app.render_page(&PageId::generate()).is_none());
}

#[test]
fn mutations_without_session_are_rejected() {
    let (repo, _, app) = setup();
    let root = app.forest()[0].id.clone();
    let stranger = Uuid::new_v4();

    assert!(matches!(
        app.create_page(stranger, "Nope", Some(&root)),
        Err(AppError::Unauthorized)
    ));
    assert!(matches!(
        app.delete_page(stranger, &root),
        Err(AppError::Unauthorized)
    ));
    assert!(matches!(
        app.add_row(stranger, &root, RowInput::new().field("a", "b")),
        Err(AppError::Unauthorized)
    ));
    assert!(matches!(
        app.ask_assistant(stranger, None, "hi"),
        Err(AppError::Unauthorized)
    ));
    assert_eq!(repo.save_count(), 0);

    assert_eq!(app.toggle_theme().unwrap(), Theme::Dark);
}

#[test]
fn local_session_is_refused_unless_enabled() {
    let (repo, _, app) = setup();

    assert!(matches!(
        app.local_session("owner"),
        Err(AppError::Unauthorized)
    ));
    assert!(app.create_page(Uuid::new_v4(), "Nope", None).is_err());
    assert_eq!(repo.save_count(), 0);

    let app = app.with_local_owner(true);
    assert!(app.local_session("owner").is_ok());
}

#[test]
fn local_session_can_mutate() {
    let (repo, _, app) = setup();
    let app = app.with_local_owner(true);
    let session = app.local_session("owner").unwrap();
    let root = app.forest()[0].id.clone();

    let notes = app.create_page(session, "Notes", Some(&root)).unwrap();
    assert!(app
        .update_page(session, &notes, "Notes", "- [x] done")
        .unwrap());
    app.add_row(
        session,
        &notes,
        RowInput::new().field("Status", "Done").new_column("Owner", "Dana"),
    )
    .unwrap();

    assert_eq!(app.current_user(Some(session)).as_deref(), Some("owner"));
    assert_eq!(
        app.table_columns(&notes).unwrap(),
        vec!["Status".to_string(), "Owner".to_string()]
    );
    assert_eq!(app.delete_page(session, &root).unwrap(), vec![notes, root]);
    assert_eq!(repo.save_count(), 4);
}

#[test]
fn blank_search_finds_nothing() {
    let (_, _, app) = setup();

    assert!(app.search("").is_empty());
    assert!(app.search("   ").is_empty());
    assert_eq!(app.search("WELCOME").len(), 1);
}

#[test]
fn assistant_uses_model_setting_and_keeps_history() {
    let (_, _, app) = setup();
    let app = app.with_local_owner(true);
    let session = app.local_session("owner").unwrap();

    assert_eq!(
        app.ask_assistant(session, None, "hello").unwrap(),
        "[Model: Gemini] You said: hello"
    );
    app.set_model(session, "Claude").unwrap();
    assert_eq!(
        app.ask_assistant(session, Some(""), "again").unwrap(),
        "[Model: Claude] You said: again"
    );
    assert_eq!(
        app.ask_assistant(session, Some("GPT-4"), "x").unwrap(),
        "[Model: GPT-4] You said: x"
    );
    assert_eq!(app.chat_history(session).unwrap().len(), 6);
}

#[tokio::test]
async fn sign_up_validates_before_calling_provider() {
    let (_, identity, app) = setup();

    let missing = app.sign_up("", "pw", "pw").await.unwrap_err();
    assert_eq!(missing.to_string(), "Email and password are required.");

    let mismatch = app.sign_up("dana@example.com", "pw", "other").await.unwrap_err();
    assert!(matches!(&mismatch, AppError::Validation(_)));
    assert_eq!(mismatch.to_string(), "Passwords do not match.");
    assert_eq!(identity.calls.load(Ordering::SeqCst), 0);

    app.sign_up("dana@example.com", "pw", "pw").await.unwrap();
    assert_eq!(identity.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn sign_in_creates_session_and_sign_out_removes_it() {
    let (_, _, app) = setup();

    let err = app.sign_in("dana@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, AppError::Identity(IdentityError::Rejected { .. })));
    assert_eq!(err.to_string(), "Invalid login credentials");

    let session = app
        .sign_in("dana@example.com", GOOD_PASSWORD)
        .await
        .unwrap();
    assert_eq!(
        app.current_user(Some(session)).as_deref(),
        Some("dana@example.com")
    );
    assert_eq!(app.session_from_cookie(&session.to_string()), Some(session));
    app.create_page(session, "Mine", None).unwrap();

    app.sign_out(session);
    app.sign_out(session);
    assert_eq!(app.current_user(Some(session)), None);
    assert!(matches!(
        app.create_page(session, "Late", None),
        Err(AppError::Unauthorized)
    ));
}
