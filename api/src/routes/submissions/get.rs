use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::error;

use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use db::models::submission::Model as Submission;

fn db_failure(e: sea_orm::DbErr) -> (StatusCode, Json<ApiResponse<()>>) {
    error!(error = %e, "Error fetching submissions");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error("Error fetching submissions")),
    )
}

/// GET /api/submissions/course/{course_id}
///
/// Returns the caller's submissions within a course, newest first.
pub async fn list_for_course(
    State(app_state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Submission>>>, (StatusCode, Json<ApiResponse<()>>)> {
    let submissions =
        Submission::find_for_user_in_course(app_state.db(), user.user_id(), course_id)
            .await
            .map_err(db_failure)?;

    Ok(Json(ApiResponse::success(
        submissions,
        "Submissions fetched successfully",
    )))
}

/// GET /api/submissions/assignment/{assignment_id}
///
/// Returns the caller's current submission for an assignment.
///
/// ### Responses
/// - `200 OK` with the submission
/// - `404 Not Found`
/// ```json
/// { "success": false, "data": {}, "message": "Submission not found" }
/// ```
pub async fn get_for_assignment(
    State(app_state): State<AppState>,
    user: AuthUser,
    Path(assignment_id): Path<i64>,
) -> Result<Json<ApiResponse<Submission>>, (StatusCode, Json<ApiResponse<()>>)> {
    let submission =
        Submission::find_by_user_and_assignment(app_state.db(), user.user_id(), assignment_id)
            .await
            .map_err(db_failure)?
            .ok_or((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Submission not found")),
            ))?;

    Ok(Json(ApiResponse::success(
        submission,
        "Submission fetched successfully",
    )))
}
