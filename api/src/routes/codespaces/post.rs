use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::get::stored_token;
use super::{provision_failure, split_repo};
use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::services::github::Provisioned;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub repo_full_name: String,
    pub branch: Option<String>,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    pub web_url: String,
}

/// POST /api/codespaces/create
///
/// JSON twin of `GET /api/codespaces/start`: runs the same provision
/// machine and answers with the workspace URL instead of a redirect.
///
/// ### Request Body
/// ```json
/// { "repoFullName": "alice/hello", "branch": "main" }
/// ```
///
/// ### Responses
/// - `200 OK`
/// ```json
/// { "success": true, "data": { "webUrl": "https://..." }, "message": "Codespace ready" }
/// ```
/// - `200 OK` with the raw descriptor when the workspace is still pending
/// - `400 Bad Request` / `401` / `403` / `404` as for `/start`
pub async fn create(
    State(app_state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateRequest>,
) -> Response {
    let Some((owner, name)) = split_repo(&req.repo_full_name) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                "Invalid repoFullName, expected owner/repo",
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
            req.branch.as_deref(),
            Duration::from_secs(common::config::codespace_ready_timeout_secs()),
            Duration::from_secs(common::config::codespace_poll_interval_secs()),
        )
        .await;

    match result {
        Ok(Provisioned::Ready(url)) => Json(ApiResponse::success(
            CreateResponse { web_url: url },
            "Codespace ready",
        ))
        .into_response(),
        Ok(Provisioned::Pending(descriptor)) => Json(ApiResponse::success(
            descriptor,
            "Codespace created; not yet reachable",
        ))
        .into_response(),
        Err(err) => provision_failure(err).into_response(),
    }
}
