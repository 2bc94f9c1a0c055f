use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::error;
use validator::Validate;

use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use common::format_validation_errors;
use db::models::{course::Model as Course, week::Model as Week};

static SLUG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[a-z0-9][a-z0-9-]*$").expect("valid regex"));

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,

    pub description: Option<String>,

    #[validate(regex(
        path = &*SLUG_REGEX,
        message = "Slug must be lowercase letters, digits and dashes"
    ))]
    pub slug: String,
}

/// POST /api/courses
///
/// Creates a course. Requires authentication.
///
/// ### Request Body
/// ```json
/// { "title": "CS50x", "description": "Intro to CS", "slug": "cs50x" }
/// ```
///
/// ### Responses
/// - `201 Created` with the new course
/// - `400 Bad Request` (validation failure)
/// - `409 Conflict`
/// ```json
/// { "success": false, "data": {}, "message": "A course with this slug already exists" }
/// ```
pub async fn create_course(
    State(app_state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<CreateCourseRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Option<Course>>::error(
                format_validation_errors(&validation_errors),
            )),
        );
    }

    match Course::create(
        app_state.db(),
        &req.slug,
        &req.title,
        req.description.as_deref(),
    )
    .await
    {
        Ok(course) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                Some(course),
                "Course created successfully",
            )),
        ),
        Err(e) if e.to_string().contains("UNIQUE") => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("A course with this slug already exists")),
        ),
        Err(e) => {
            error!(error = %e, "Error creating course");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Error creating course")),
            )
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWeekRequest {
    #[validate(range(min = 0, message = "Week number must not be negative"))]
    pub week_number: i32,

    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,

    pub description: Option<String>,
}

/// POST /api/courses/{course_id}/weeks
///
/// Adds a week to a course. Requires authentication.
///
/// ### Request Body
/// ```json
/// { "weekNumber": 1, "title": "C", "description": "Learn C basics" }
/// ```
///
/// ### Responses
/// - `201 Created` with the new week
/// - `404 Not Found` when the course does not exist
/// - `409 Conflict` when the course already has that week number
pub async fn create_week(
    State(app_state): State<AppState>,
    _user: AuthUser,
    Path(course_id): Path<i64>,
    Json(req): Json<CreateWeekRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Option<Week>>::error(
                format_validation_errors(&validation_errors),
            )),
        );
    }

    let db = app_state.db();
    match Course::find_by_id(db, course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Course not found")),
            );
        }
        Err(e) => {
            error!(error = %e, "Error creating week");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Error creating week")),
            );
        }
    }

    match Week::create(
        db,
        course_id,
        req.week_number,
        &req.title,
        req.description.as_deref(),
    )
    .await
    {
        Ok(week) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(Some(week), "Week created successfully")),
        ),
        Err(e) if e.to_string().contains("UNIQUE") => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error(
                "This course already has that week number",
            )),
        ),
        Err(e) => {
            error!(error = %e, "Error creating week");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Error creating week")),
            )
        }
    }
}
