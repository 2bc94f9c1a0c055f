//! # courses Routes Module
//!
//! Routes for the `/api/courses` endpoint group: the public catalog plus
//! authenticated course and week creation.

pub mod get;
pub mod post;

use axum::{
    Router,
    routing::{get, post},
};

use self::get::{get_course, list_courses};
use self::post::{create_course, create_week};
use crate::state::AppState;

/// Builds the `/api/courses` route group.
///
/// - `GET /api/courses` → `list_courses`
/// - `GET /api/courses/{slug}` → `get_course`
/// - `POST /api/courses` → `create_course` (authenticated)
/// - `POST /api/courses/{course_id}/weeks` → `create_week` (authenticated)
pub fn courses_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/{slug}", get(get_course))
        // same param name as above; the weeks handler reads it as an id
        .route("/{slug}/weeks", post(create_week))
}
