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
use db::models::submission::Model as Submission;

/// DELETE /api/submissions/{assignment_id}
///
/// Removes the caller's submission for an assignment.
///
/// ### Responses
/// - `200 OK`
/// ```json
/// { "success": true, "data": {}, "message": "Submission deleted successfully" }
/// ```
/// - `404 Not Found` when no submission exists
pub async fn delete_submission(
    State(app_state): State<AppState>,
    user: AuthUser,
    Path(assignment_id): Path<i64>,
) -> impl IntoResponse {
    match Submission::delete_by_user_and_assignment(app_state.db(), user.user_id(), assignment_id)
        .await
    {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::success(Empty, "Submission deleted successfully")),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Submission not found")),
        ),
        Err(e) => {
            error!(error = %e, "Error deleting submission");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Error deleting submission")),
            )
        }
    }
}
