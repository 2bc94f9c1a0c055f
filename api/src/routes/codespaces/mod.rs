//! # codespaces Routes Module
//!
//! Routes for the `/api/codespaces` endpoint group: launching cloud
//! workspaces for a repository. `/start` is browser-facing and redirects;
//! `/create` is the JSON equivalent for the frontend.

pub mod get;
pub mod post;

use axum::{
    Json,
    Router,
    http::StatusCode,
    routing::{get, post},
};

use self::get::start;
use self::post::create;
use crate::response::ApiResponse;
use crate::services::github::GithubError;
use crate::state::AppState;

/// Builds the `/api/codespaces` route group.
///
/// - `GET /api/codespaces/start?repo=owner/repo&branch=` → `start`
/// - `POST /api/codespaces/create` → `create`
pub fn codespaces_routes() -> Router<AppState> {
    Router::new()
        .route("/start", get(start))
        .route("/create", post(create))
}

/// Maps a provisioning failure onto the response taxonomy.
pub(crate) fn provision_failure(err: GithubError) -> (StatusCode, Json<ApiResponse<()>>) {
    let status = match err {
        GithubError::Forbidden => StatusCode::FORBIDDEN,
        GithubError::RepoNotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiResponse::error(err.to_string())))
}

/// Splits `owner/repo`, rejecting anything else.
pub(crate) fn split_repo(repo: &str) -> Option<(&str, &str)> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Some((owner, name))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::split_repo;

    #[test]
    fn split_repo_requires_exactly_owner_and_name() {
        assert_eq!(split_repo("alice/hello"), Some(("alice", "hello")));
        assert_eq!(split_repo("alice"), None);
        assert_eq!(split_repo("alice/"), None);
        assert_eq!(split_repo("/hello"), None);
        assert_eq!(split_repo("a/b/c"), None);
    }
}
