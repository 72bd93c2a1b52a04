//! Identity provider boundary.
//!
//! # Responsibility
//! - Define the async sign-up/sign-in contract used by the application.
//! - Provide the hosted-auth HTTP client implementation.
//!
//! # Invariants
//! - A missing endpoint URL or API key yields `NotConfigured` without any
//!   network call.
//! - Every request is bounded by the configured timeout; nothing retries.
//! - Credentials and tokens never reach the log.

use async_trait::async_trait;
use log::{info, warn};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

/// Default bound for one identity request.
pub const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);

const SIGN_UP_PATH: &str = "/auth/v1/signup";
const SIGN_IN_PATH: &str = "/auth/v1/token?grant_type=password";

pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity boundary failures. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// No endpoint URL or API key is configured.
    NotConfigured,
    /// Provider answered with an error status; `message` is its body.
    Rejected { status: u16, message: String },
    /// Network failure or timeout.
    Transport(String),
    /// Success status but the body could not be decoded.
    InvalidResponse(String),
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "Identity provider URL or key not configured."),
            Self::Rejected { status, message } if message.trim().is_empty() => {
                write!(f, "Identity provider rejected the request (status {status}).")
            }
            Self::Rejected { message, .. } => write!(f, "{message}"),
            Self::Transport(message) => write!(f, "{message}"),
            Self::InvalidResponse(message) => {
                write!(f, "Identity provider returned an invalid response: {message}")
            }
        }
    }
}

impl Error for IdentityError {}

/// Tokens issued on successful sign-in.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenPair { .. }")
    }
}

/// Async identity provider contract.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Registers a new account.
    async fn sign_up(&self, email: &str, password: &str) -> IdentityResult<()>;
    /// Exchanges credentials for tokens.
    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<TokenPair>;
}

/// Endpoint settings for [`HostedIdentityClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Project base URL, e.g. `https://project.supabase.co`.
    pub url: Option<String>,
    /// Project API key sent as the `apikey` header.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout: DEFAULT_IDENTITY_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
struct Endpoint {
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Password-grant client for a Supabase-style hosted auth service.
#[derive(Debug, Clone)]
pub struct HostedIdentityClient {
    http: reqwest::Client,
    endpoint: Option<Endpoint>,
    timeout: Duration,
}

impl HostedIdentityClient {
    /// Builds a client. Blank URL or key leave the client unconfigured.
    pub fn new(config: &IdentityConfig) -> IdentityResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| IdentityError::Transport(err.to_string()))?;

        let url = config
            .url
            .as_deref()
            .map(|value| value.trim().trim_end_matches('/'))
            .filter(|value| !value.is_empty());
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let endpoint = match (url, api_key) {
            (Some(base_url), Some(api_key)) => Some(Endpoint {
                base_url: base_url.to_string(),
                api_key: api_key.to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            http,
            endpoint,
            timeout: config.timeout,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn post_credentials(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> IdentityResult<reqwest::Response> {
        let endpoint = self.endpoint.as_ref().ok_or(IdentityError::NotConfigured)?;
        let response = self
            .http
            .post(format!("{}{}", endpoint.base_url, path))
            .header("apikey", endpoint.api_key.as_str())
            .json(&Credentials { email, password })
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let status = response.status();
        if status.as_u16() >= StatusCode::BAD_REQUEST.as_u16() {
            let message = response.text().await.unwrap_or_default();
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    fn transport_error(&self, err: reqwest::Error) -> IdentityError {
        if err.is_timeout() {
            IdentityError::Transport(format!(
                "Identity provider did not answer within {} ms.",
                self.timeout.as_millis()
            ))
        } else {
            IdentityError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentityClient {
    async fn sign_up(&self, email: &str, password: &str) -> IdentityResult<()> {
        let started_at = Instant::now();
        let outcome = self.post_credentials(SIGN_UP_PATH, email, password).await;
        log_outcome("identity_sign_up", &outcome, started_at);
        outcome.map(|_| ())
    }

    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<TokenPair> {
        let started_at = Instant::now();
        let outcome = match self.post_credentials(SIGN_IN_PATH, email, password).await {
            Ok(response) => response
                .json::<TokenPair>()
                .await
                .map_err(|err| IdentityError::InvalidResponse(err.to_string())),
            Err(err) => Err(err),
        };
        log_outcome("identity_sign_in", &outcome, started_at);
        outcome
    }
}

fn log_outcome<T>(event: &str, outcome: &IdentityResult<T>, started_at: Instant) {
    match outcome {
        Ok(_) => info!(
            "event={} module=auth status=ok duration_ms={}",
            event,
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event={} module=auth status=error error_code={} duration_ms={}",
            event,
            error_code(err),
            started_at.elapsed().as_millis()
        ),
    }
}

fn error_code(err: &IdentityError) -> &'static str {
    match err {
        IdentityError::NotConfigured => "not_configured",
        IdentityError::Rejected { .. } => "rejected",
        IdentityError::Transport(_) => "transport",
        IdentityError::InvalidResponse(_) => "invalid_response",
    }
}
