//! # auth Routes Module
//!
//! Routes for the `/auth` endpoint group: the GitHub OAuth flow and session
//! management.
//!
//! ## Structure
//! - `get.rs`: OAuth start/callback, current user
//! - `post.rs`: logout

pub mod get;
pub mod post;

use axum::{
    Router,
    routing::{get, post},
};

use self::get::{github_callback, github_start, me};
use self::post::logout;
use crate::state::AppState;

/// Builds the `/auth` route group.
///
/// - `GET /auth/github` → `github_start`
/// - `GET /auth/github/callback` → `github_callback`
/// - `GET /auth/user` → `me`
/// - `POST /auth/logout` → `logout`
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/github", get(github_start))
        .route("/github/callback", get(github_callback))
        .route("/user", get(me))
        .route("/logout", post(logout))
}

/// Name of the cookie mirroring the OAuth state during a flow.
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
