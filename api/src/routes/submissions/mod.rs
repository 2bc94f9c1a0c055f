//! # submissions Routes Module
//!
//! Routes for the `/api/submissions` endpoint group. Submissions are
//! current state keyed on (user, assignment); submitting again replaces the
//! previous content. All endpoints require authentication.

pub mod delete;
pub mod get;
pub mod post;

use axum::{
    Router,
    routing::{delete, get, post},
};

use self::delete::delete_submission;
use self::get::{get_for_assignment, list_for_course};
use self::post::submit;
use crate::state::AppState;

/// Builds the `/api/submissions` route group.
///
/// - `GET /api/submissions/course/{course_id}` → `list_for_course`
/// - `GET /api/submissions/assignment/{assignment_id}` → `get_for_assignment`
/// - `POST /api/submissions` → `submit`
/// - `DELETE /api/submissions/{assignment_id}` → `delete_submission`
pub fn submissions_routes() -> Router<AppState> {
    Router::new()
        .route("/course/{course_id}", get(list_for_course))
        .route("/assignment/{assignment_id}", get(get_for_assignment))
        .route("/", post(submit))
        .route("/{assignment_id}", delete(delete_submission))
}
