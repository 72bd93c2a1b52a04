//! Core domain logic for Notespace.
//! This crate is the single source of truth for page tree invariants.

pub mod app;
pub mod assistant;
pub mod auth;
pub mod config;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod search;
pub mod service;

pub use app::{App, AppError, AppResult, FileApp, RenderedPage};
pub use auth::identity::{
    HostedIdentityClient, IdentityConfig, IdentityError, IdentityProvider, IdentityResult,
    TokenPair,
};
pub use auth::session::{Session, SessionId, SessionStore, SESSION_COOKIE_NAME};
pub use config::{AppConfig, ConfigError, LogLevel, LoggingConfig};
pub use logging::{init_logging, logging_status};
pub use model::page::{Page, PageId};
pub use model::settings::{Settings, Theme};
pub use model::table::{Row, RowInput};
pub use model::workspace::{PageNode, Workspace, WorkspaceIntegrityError};
pub use render::content::{escape_html, render_content};
pub use repo::{RepoError, RepoResult};
pub use search::text::{search_pages, SearchHit};
pub use service::page_service::{PageService, PageServiceError};
pub use service::settings_service::SettingsService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
