//! # grades Routes Module
//!
//! Routes for the `/api/grades` endpoint group: grading history queries,
//! readable by the platform token or by the student themselves.

pub mod get;

use axum::{Router, routing::get};

use self::get::list_grades;
use crate::state::AppState;

/// Builds the `/api/grades` route group.
///
/// - `GET /api/grades?username=&assignmentId=&limit=` → `list_grades`
pub fn grades_routes() -> Router<AppState> {
    Router::new().route("/", get(list_grades))
}
