use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use crate::auth::claims::AuthUser;
use crate::auth::guards::Empty;
use crate::response::ApiResponse;
use crate::state::AppState;
use db::models::enrollment::Model as Enrollment;

/// DELETE /api/enrollments/{course_id}
///
/// Removes the caller's enrollment in a course.
///
/// ### Responses
/// - `200 OK`
/// ```json
/// { "success": true, "data": {}, "message": "Unenrolled successfully" }
/// ```
/// - `404 Not Found` when the caller is not enrolled
pub async fn unenroll(
    State(app_state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<i64>,
) -> impl IntoResponse {
    match Enrollment::unenroll(app_state.db(), user.user_id(), course_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::success(Empty, "Unenrolled successfully")),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Not enrolled in this course")),
        ),
        Err(e) => {
            error!(error = %e, "Error unenrolling from course");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Error unenrolling from course")),
            )
        }
    }
}
