//! # tools Routes Module
//!
//! Routes for the `/api/tools` endpoint group: direct result reporting from
//! grading tools running inside workspaces. The whole group is guarded by
//! the static platform token.

pub mod post;

use axum::{Router, routing::post};

use self::post::report;
use crate::state::AppState;

/// Builds the `/api/tools` route group.
///
/// - `POST /api/tools/report` → `report`
pub fn tools_routes() -> Router<AppState> {
    Router::new().route("/report", post(report))
}
