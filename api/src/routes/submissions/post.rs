use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tracing::error;
use validator::Validate;

use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use common::format_validation_errors;
use db::models::{
    assignment::Model as Assignment, enrollment::Model as Enrollment,
    submission::Model as Submission, week::Model as Week,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub assignment_id: i64,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,
}

/// POST /api/submissions
///
/// Creates or replaces the caller's submission for an assignment. The
/// caller must already be enrolled in the assignment's course; unlike the
/// grading ingest path, this endpoint never auto-enrolls.
///
/// ### Request Body
/// ```json
/// { "assignmentId": 12, "content": "print(\"hello\")" }
/// ```
///
/// ### Responses
/// - `200 OK` with the stored submission
/// - `403 Forbidden`
/// ```json
/// { "success": false, "data": {}, "message": "Not enrolled in this course" }
/// ```
/// - `404 Not Found` when the assignment does not exist
pub async fn submit(
    State(app_state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SubmitRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Option<Submission>>::error(
                format_validation_errors(&validation_errors),
            )),
        );
    }

    let db = app_state.db();
    let fail = |e: sea_orm::DbErr| {
        error!(error = %e, "Error submitting assignment");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Error submitting assignment")),
        )
    };

    let assignment = match Assignment::find_by_id(db, req.assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Assignment not found")),
            );
        }
        Err(e) => return fail(e),
    };

    let week = match Week::find_by_id(db, assignment.week_id).await {
        Ok(Some(week)) => week,
        Ok(None) => return fail(sea_orm::DbErr::RecordNotFound("week vanished".into())),
        Err(e) => return fail(e),
    };

    match Enrollment::find_by_user_and_course(db, user.user_id(), week.course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::FORBIDDEN,
                Json(ApiResponse::error("Not enrolled in this course")),
            );
        }
        Err(e) => return fail(e),
    }

    match Submission::upsert(db, user.user_id(), assignment.id, &req.content).await {
        Ok(submission) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                Some(submission),
                "Submission saved successfully",
            )),
        ),
        Err(e) => fail(e),
    }
}
