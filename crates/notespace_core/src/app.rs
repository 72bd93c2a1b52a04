//! Application facade over pages, settings, sessions and the assistant.
//!
//! # Responsibility
//! - Own every service for one running instance; callers pass `&App`.
//! - Gate mutations behind a live session while leaving reads open.
//! - Apply front-end policies the services leave open (blank search,
//!   sign-up form validation).
//!
//! # Invariants
//! - No domain state lives outside an `App` value.
//! - Identity calls never run while a workspace lock is held.

use crate::assistant::chat::{ChatHistory, ChatMessage};
use crate::auth::identity::{HostedIdentityClient, IdentityError, IdentityProvider};
use crate::auth::session::{Session, SessionId, SessionStore};
use crate::config::AppConfig;
use crate::model::page::{Page, PageId};
use crate::model::settings::{Settings, Theme};
use crate::model::table::{Row, RowInput};
use crate::model::workspace::PageNode;
use crate::render::content::render_content;
use crate::repo::json_file::RepoError;
use crate::repo::settings_repo::{JsonFileSettingsRepository, SettingsRepository};
use crate::repo::workspace_repo::{JsonFileWorkspaceRepository, WorkspaceRepository};
use crate::search::text::SearchHit;
use crate::service::page_service::{PageService, PageServiceError};
use crate::service::settings_service::SettingsService;
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

pub const MISSING_CREDENTIALS_MESSAGE: &str = "Email and password are required.";
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Passwords do not match.";

/// Errors surfaced by the facade.
#[derive(Debug)]
pub enum AppError {
    /// The operation needs a live session.
    Unauthorized,
    /// Form input was rejected before reaching any service.
    Validation(String),
    Identity(IdentityError),
    Pages(PageServiceError),
    Settings(RepoError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "sign in required"),
            Self::Validation(message) => write!(f, "{message}"),
            Self::Identity(err) => write!(f, "{err}"),
            Self::Pages(err) => write!(f, "{err}"),
            Self::Settings(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Identity(err) => Some(err),
            Self::Pages(err) => Some(err),
            Self::Settings(err) => Some(err),
            Self::Unauthorized | Self::Validation(_) => None,
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}

impl From<PageServiceError> for AppError {
    fn from(value: PageServiceError) -> Self {
        Self::Pages(value)
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        Self::Settings(value)
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// A page with its content rendered to display markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPage {
    pub id: PageId,
    pub title: String,
    pub html: String,
}

/// App wired to the JSON file repositories.
pub type FileApp = App<JsonFileWorkspaceRepository, JsonFileSettingsRepository>;

/// One running workspace instance.
pub struct App<W: WorkspaceRepository, S: SettingsRepository> {
    pages: PageService<W>,
    settings: SettingsService<S>,
    sessions: SessionStore,
    identity: Arc<dyn IdentityProvider>,
    chat: Mutex<ChatHistory>,
    local_owner: bool,
}

impl FileApp {
    /// Opens the file-backed workspace and settings under `config.data_dir`.
    pub fn open(config: &AppConfig) -> AppResult<Self> {
        let identity = HostedIdentityClient::new(&config.identity)?;
        if !identity.is_configured() {
            warn!("event=app_open module=app status=degraded reason=identity_not_configured");
        }
        let app = Self::new(
            JsonFileWorkspaceRepository::new(config.workspace_path()),
            JsonFileSettingsRepository::new(config.settings_path()),
            Arc::new(identity),
        )
        .with_local_owner(config.local_owner);
        info!(
            "event=app_open module=app status=ok pages={} data_dir={}",
            app.pages.len(),
            config.data_dir.display()
        );
        Ok(app)
    }
}

impl<W: WorkspaceRepository, S: SettingsRepository> App<W, S> {
    /// Loads both repositories and takes ownership of them.
    pub fn new(workspace_repo: W, settings_repo: S, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            pages: PageService::new(workspace_repo),
            settings: SettingsService::new(settings_repo),
            sessions: SessionStore::new(),
            identity,
            chat: Mutex::new(ChatHistory::new()),
            local_owner: false,
        }
    }

    /// Allows [`App::local_session`]; off unless the operator opts in.
    pub fn with_local_owner(mut self, enabled: bool) -> Self {
        self.local_owner = enabled;
        self
    }

    // Reads.

    /// Sidebar forest in workspace order.
    pub fn forest(&self) -> Vec<PageNode> {
        self.pages.build_forest()
    }

    pub fn page(&self, id: &PageId) -> Option<Page> {
        self.pages.get_page(id)
    }

    /// Page with rendered content, or `None` when `id` is unknown.
    pub fn render_page(&self, id: &PageId) -> Option<RenderedPage> {
        self.pages.get_page(id).map(|page| RenderedPage {
            id: id.clone(),
            html: render_content(&page.content),
            title: page.title,
        })
    }

    /// Title/content search; a blank query finds nothing.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        self.pages.search(query)
    }

    pub fn rows(&self, id: &PageId) -> Option<Vec<Row>> {
        self.pages.rows(id)
    }

    /// Header columns for a page table.
    pub fn table_columns(&self, id: &PageId) -> Option<Vec<String>> {
        self.pages.table_columns(id)
    }

    pub fn settings(&self) -> Settings {
        self.settings.settings()
    }

    pub fn available_models(&self) -> &'static [&'static str] {
        self.settings.available_models()
    }

    /// Email of the session owner, if the session is live.
    pub fn current_user(&self, session: Option<SessionId>) -> Option<String> {
        session
            .and_then(|id| self.sessions.get(id))
            .map(|session| session.email)
    }

    /// Resolves a raw cookie value to a live session id.
    pub fn session_from_cookie(&self, cookie_value: &str) -> Option<SessionId> {
        let id = Uuid::parse_str(cookie_value.trim()).ok()?;
        self.sessions.get(id).map(|_| id)
    }

    // Mutations.

    pub fn create_page(
        &self,
        session: SessionId,
        title: &str,
        parent: Option<&PageId>,
    ) -> AppResult<PageId> {
        self.require_session(session)?;
        Ok(self.pages.add_page(title, parent)?)
    }

    pub fn update_page(
        &self,
        session: SessionId,
        id: &PageId,
        title: &str,
        content: &str,
    ) -> AppResult<bool> {
        self.require_session(session)?;
        Ok(self.pages.update_page(id, title, content)?)
    }

    /// Deletes a page with its subtree; returns the removed ids.
    pub fn delete_page(&self, session: SessionId, id: &PageId) -> AppResult<Vec<PageId>> {
        self.require_session(session)?;
        Ok(self.pages.delete_page(id)?)
    }

    /// Appends a table row from a form submission.
    pub fn add_row(&self, session: SessionId, id: &PageId, input: RowInput) -> AppResult<()> {
        self.require_session(session)?;
        Ok(self.pages.submit_row(id, input)?)
    }

    pub fn set_model(&self, session: SessionId, model: &str) -> AppResult<bool> {
        self.require_session(session)?;
        Ok(self.settings.set_model(model)?)
    }

    /// Flips the theme. Open to anonymous visitors.
    pub fn toggle_theme(&self) -> AppResult<Theme> {
        Ok(self.settings.toggle_theme()?)
    }

    /// Asks the assistant; a blank `model` uses the configured default.
    pub fn ask_assistant(
        &self,
        session: SessionId,
        model: Option<&str>,
        prompt: &str,
    ) -> AppResult<String> {
        self.require_session(session)?;
        let default_model = self.settings.settings().model;
        let answer = self
            .chat
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ask(model, &default_model, prompt);
        info!("event=assistant_reply module=app status=ok prompt_chars={}", prompt.chars().count());
        Ok(answer)
    }

    pub fn chat_history(&self, session: SessionId) -> AppResult<Vec<ChatMessage>> {
        self.require_session(session)?;
        Ok(self
            .chat
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .messages()
            .to_vec())
    }

    // Accounts.

    /// Validates the sign-up form and registers the account.
    pub async fn sign_up(&self, email: &str, password: &str, confirm: &str) -> AppResult<()> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(MISSING_CREDENTIALS_MESSAGE.to_string()));
        }
        if password != confirm {
            return Err(AppError::Validation(PASSWORD_MISMATCH_MESSAGE.to_string()));
        }
        self.identity.sign_up(email, password).await?;
        Ok(())
    }

    /// Exchanges credentials for a new session.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<SessionId> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(MISSING_CREDENTIALS_MESSAGE.to_string()));
        }
        let tokens = self.identity.sign_in(email, password).await?;
        let id = self.sessions.create(Session {
            email: email.to_string(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        });
        info!("event=session_create module=app status=ok sessions={}", self.sessions.len());
        Ok(id)
    }

    /// Ends a session. Unknown ids are ignored.
    pub fn sign_out(&self, session: SessionId) {
        if self.sessions.remove(session) {
            info!("event=session_remove module=app status=ok sessions={}", self.sessions.len());
        }
    }

    /// Opens a session for the local workspace owner without contacting
    /// the identity provider.
    ///
    /// Refused with [`AppError::Unauthorized`] unless enabled through
    /// [`App::with_local_owner`].
    pub fn local_session(&self, owner: &str) -> AppResult<SessionId> {
        if !self.local_owner {
            warn!("event=session_create module=app status=rejected reason=local_owner_disabled");
            return Err(AppError::Unauthorized);
        }
        let id = self.sessions.create(Session {
            email: owner.to_string(),
            access_token: String::new(),
            refresh_token: String::new(),
        });
        info!("event=session_create module=app status=ok kind=local_owner");
        Ok(id)
    }

    fn require_session(&self, session: SessionId) -> AppResult<Session> {
        self.sessions.get(session).ok_or_else(|| {
            warn!("event=session_check module=app status=rejected reason=unknown_session");
            AppError::Unauthorized
        })
    }
}
