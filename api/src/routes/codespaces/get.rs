use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::time::Duration;
use tracing::error;
use url::form_urlencoded;

use super::{provision_failure, split_repo};
use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::services::github::Provisioned;
use crate::state::AppState;
use db::models::user::Model as User;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartParams {
    pub repo: Option<String>,
    /// Accepted as an alias for `repo`.
    pub repo_full_name: Option<String>,
    pub branch: Option<String>,
}

/// GET /api/codespaces/start?repo=owner/repo&branch=
///
/// Browser entry point for launching a workspace. Anonymous callers are
/// redirected into the codespaces OAuth flow with `returnTo` pointing back
/// here, so after granting scopes they land in the workspace directly.
///
/// ### Responses
/// - `302 Found` → the workspace URL (or the OAuth flow when anonymous)
/// - `200 OK` with the raw descriptor when the workspace is still pending
/// - `400 Bad Request` when `repo` is missing or not `owner/repo`
/// - `401 Unauthorized` when the stored GitHub token is missing
/// - `403 Forbidden` / `404 Not Found` passed through from GitHub
pub async fn start(
    State(app_state): State<AppState>,
    Query(params): Query<StartParams>,
    user: Option<AuthUser>,
) -> Response {
    let Some(repo) = params.repo.or(params.repo_full_name) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                "Missing repo parameter (owner/repo)",
            )),
        )
            .into_response();
    };

    let Some(user) = user else {
        // Round-trip through OAuth and come back to this exact request.
        let mut return_to = format!(
            "{}/api/codespaces/start?repo={}",
            common::config::backend_url(),
            urlencode(&repo)
        );
        if let Some(branch) = &params.branch {
            return_to.push_str(&format!("&branch={}", urlencode(branch)));
        }
        let target = format!(
            "/auth/github?returnTo={}&client=codespaces",
            urlencode(&return_to)
        );
        return Redirect::temporary(&target).into_response();
    };

    let Some((owner, name)) = split_repo(&repo) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                "Invalid repo parameter. Expected owner/repo",
            )),
        )
            .into_response();
    };

    let token = match stored_token(&app_state, user.user_id()).await {
        Ok(token) => token,
        Err(response) => return response,
    };

    let result = app_state
        .github()
        .provision(
            &token,
            owner,
            name,
            params.branch.as_deref(),
            Duration::from_secs(common::config::codespace_ready_timeout_secs()),
            Duration::from_secs(common::config::codespace_poll_interval_secs()),
        )
        .await;

    match result {
        Ok(Provisioned::Ready(url)) => Redirect::temporary(&url).into_response(),
        Ok(Provisioned::Pending(descriptor)) => Json(ApiResponse::success(
            descriptor,
            "Codespace created; not yet reachable",
        ))
        .into_response(),
        Err(err) => provision_failure(err).into_response(),
    }
}

/// Loads the caller's stored GitHub token, or produces the 401 telling them
/// to re-authenticate.
pub(super) async fn stored_token(app_state: &AppState, user_id: i64) -> Result<String, Response> {
    match User::find_by_id(app_state.db(), user_id).await {
        Ok(Some(user)) => user.github_access_token.ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<()>::error(
                    "Missing GitHub access token; please re-authenticate with GitHub to grant Codespaces access",
                )),
            )
                .into_response()
        }),
        Ok(None) => Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error("Not authenticated")),
        )
            .into_response()),
        Err(e) => {
            error!(error = %e, "Error loading user for provisioning");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to load user")),
            )
                .into_response())
        }
    }
}

fn urlencode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
