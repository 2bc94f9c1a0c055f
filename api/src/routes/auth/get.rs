use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::error;

use super::OAUTH_STATE_COOKIE;
use crate::auth::claims::AuthUser;
use crate::auth::extractors::SESSION_COOKIE;
use crate::auth::generate_session_jwt;
use crate::response::ApiResponse;
use crate::services::github::GithubError;
use crate::services::github::oauth::{ClientVariant, OauthState, authorize_url};
use crate::state::AppState;
use db::models::user::Model as User;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartParams {
    pub return_to: Option<String>,
    pub client: Option<String>,
}

fn state_cookie<'a>(name: &'a str, value: String) -> Cookie<'a> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(common::config::env() == "production")
        .build()
}

/// GET /auth/github
///
/// Starts the GitHub OAuth flow. The serialized state (nonce, return target,
/// client variant) is mirrored into the `oauth_state` cookie and the caller
/// is redirected to GitHub's authorize URL.
///
/// Query parameters:
/// - `returnTo`: where to send the browser after login (optional)
/// - `client`: `codespaces` to use the workspace-provisioning OAuth app
pub async fn github_start(Query(params): Query<StartParams>, jar: CookieJar) -> impl IntoResponse {
    let variant = match params.client.as_deref() {
        Some("codespaces") => ClientVariant::Codespaces,
        _ => ClientVariant::Platform,
    };

    let state = OauthState::new(params.return_to, variant);
    let url = authorize_url(&state);
    let jar = jar.add(state_cookie(OAUTH_STATE_COOKIE, state.encode()));

    (jar, Redirect::temporary(&url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// GET /auth/github/callback
///
/// Completes the OAuth flow: exchanges the code for a token, fetches the
/// GitHub profile and granted scopes, upserts the local user (always
/// refreshing the stored token), then sets the session cookie and redirects
/// to the flow's return target.
///
/// ### Responses
/// - `302 Found` → `returnTo` (default `{FRONTEND_URL}/dashboard`)
/// - `400 Bad Request` when `code` or `state` is missing
/// - `500 Internal Server Error` when the exchange or profile fetch fails
pub async fn github_callback(
    State(app_state): State<AppState>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), (StatusCode, Json<ApiResponse<()>>)> {
    let (Some(code), Some(raw_state)) = (params.code, params.state) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Missing code or state")),
        ));
    };

    let state = OauthState::decode(&raw_state).unwrap_or_else(|| {
        // An unreadable state still lets login complete against the
        // platform app; only the nonce check is lost.
        OauthState::new(None, ClientVariant::Platform)
    });
    state.verify_nonce(jar.get(OAUTH_STATE_COOKIE).map(|c| c.value()));

    let github = app_state.github();
    let token = github
        .exchange_code_for_token(&code, state.client)
        .await
        .map_err(oauth_failure)?;
    let profile = github.fetch_user(&token).await.map_err(oauth_failure)?;
    let scopes = github.token_scopes(&token).await.map_err(oauth_failure)?;

    let user = User::upsert_from_github(
        app_state.db(),
        &profile.id.to_string(),
        &profile.login,
        profile.email.as_deref(),
        profile.avatar_url.as_deref(),
        &token,
        scopes.as_deref(),
    )
    .await
    .map_err(|e| {
        error!(error = %e, "User upsert failed during OAuth callback");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Failed to store user")),
        )
    })?;

    let (session_token, _expiry) = generate_session_jwt(user.id);
    let jar = jar
        .add(state_cookie(SESSION_COOKIE, session_token))
        .remove(Cookie::from(OAUTH_STATE_COOKIE));

    let return_to = state
        .return_to
        .unwrap_or_else(|| format!("{}/dashboard", common::config::frontend_url()));
    Ok((jar, Redirect::temporary(&return_to)))
}

fn oauth_failure(err: GithubError) -> (StatusCode, Json<ApiResponse<()>>) {
    error!(error = %err, "OAuth callback failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error(err.to_string())),
    )
}

/// GET /auth/user
///
/// Returns the current user's public profile. The stored GitHub access
/// token, granted scopes and token timestamp are never serialized.
///
/// ### Responses
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": { "id": 1, "github_id": "583231", "username": "octocat", ... },
///   "message": "User fetched successfully"
/// }
/// ```
/// - `401 Unauthorized` when there is no valid session
pub async fn me(
    State(app_state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<User>>, (StatusCode, Json<ApiResponse<()>>)> {
    match User::find_by_id(app_state.db(), user.user_id()).await {
        Ok(Some(user)) => Ok(Json(ApiResponse::success(
            user,
            "User fetched successfully",
        ))),
        Ok(None) => Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Not authenticated")),
        )),
        Err(e) => {
            error!(error = %e, "Failed to load current user");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to fetch user")),
            ))
        }
    }
}
