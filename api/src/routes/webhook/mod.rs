//! # webhook Routes Module
//!
//! Routes for the `/api/webhook` endpoint group: GitHub push events. The
//! endpoint is public in the sense that GitHub calls it directly; payload
//! shape is validated before anything is recorded.

pub mod post;

use axum::{Router, routing::post};

use self::post::github_push;
use crate::state::AppState;

/// Builds the `/api/webhook` route group.
///
/// - `POST /api/webhook/github` → `github_push`
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/github", post(github_push))
}
