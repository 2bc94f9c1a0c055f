//! # enrollments Routes Module
//!
//! Routes for the `/api/enrollments` endpoint group. All endpoints operate
//! on the calling user's own enrollments and require authentication.

pub mod delete;
pub mod get;
pub mod post;

use axum::{
    Router,
    routing::{delete, get, post},
};

use self::delete::unenroll;
use self::get::my_courses;
use self::post::enroll;
use crate::state::AppState;

/// Builds the `/api/enrollments` route group.
///
/// - `GET /api/enrollments/my-courses` → `my_courses`
/// - `POST /api/enrollments` → `enroll`
/// - `DELETE /api/enrollments/{course_id}` → `unenroll`
pub fn enrollments_routes() -> Router<AppState> {
    Router::new()
        .route("/my-courses", get(my_courses))
        .route("/", post(enroll))
        .route("/{course_id}", delete(unenroll))
}
