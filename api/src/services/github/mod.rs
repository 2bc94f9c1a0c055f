//! GitHub-facing service layer.
//!
//! All remote calls go through [`GithubClient`], whose API and OAuth base
//! URLs are configurable so tests can point it at a local stub server.

pub mod app;
pub mod codespaces;
pub mod oauth;

pub use codespaces::Provisioned;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GithubError {
    /// The OAuth code-for-token exchange was rejected.
    #[error("GitHub token exchange failed: {0}")]
    AuthExchange(String),
    /// The `/user` profile response carried no usable account id.
    #[error("GitHub returned an invalid user profile")]
    ProfileInvalid,
    /// GitHub answered 403; the token lacks access or codespace rights.
    #[error("GitHub denied access to this repository")]
    Forbidden,
    /// GitHub answered 404 for the repository.
    #[error("Repository not found on GitHub")]
    RepoNotFound,
    /// The workspace never reported a web URL within the readiness window.
    #[error("Timed out waiting for the workspace to become ready")]
    ProvisioningTimeout,
    /// GitHub App credentials are missing or unusable.
    #[error("GitHub App configuration error: {0}")]
    AppAuth(String),
    /// Any other non-success GitHub response.
    #[error("GitHub API error (status {status})")]
    Api { status: u16, body: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// HTTP client for the GitHub REST and OAuth APIs.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    oauth_base: String,
}

impl GithubClient {
    /// Builds a client against explicit base URLs (no trailing slash).
    pub fn new(api_base: impl Into<String>, oauth_base: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(common::config::project_name())
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http,
            api_base: api_base.into(),
            oauth_base: oauth_base.into(),
        }
    }

    /// Builds a client from the global configuration.
    pub fn from_config() -> Self {
        Self::new(
            common::config::github_api_base(),
            common::config::github_oauth_base(),
        )
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    pub(crate) fn oauth_url(&self, path: &str) -> String {
        format!("{}{}", self.oauth_base, path)
    }
}
