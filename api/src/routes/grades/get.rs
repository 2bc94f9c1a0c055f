use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use axum_extra::extract::TypedHeader;
use chrono::{DateTime, Utc};
use headers::{Authorization, authorization::Bearer};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::auth::claims::AuthUser;
use crate::auth::guards::is_platform_token;
use crate::response::ApiResponse;
use crate::state::AppState;
use db::models::{user::Model as User, workspace_run::Model as WorkspaceRun};

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradesParams {
    pub username: Option<String>,
    pub assignment_id: Option<String>,
    pub limit: Option<u64>,
}

/// One grading run, stripped to credential-free fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRow {
    pub id: i64,
    pub repo_full_name: String,
    pub branch: Option<String>,
    pub score: Option<f64>,
    pub max_score: Option<f64>,
    pub passed: Option<i32>,
    pub total: Option<i32>,
    pub status: String,
    pub summary: Option<String>,
    pub assignment_id: Option<String>,
    pub commit_sha: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<WorkspaceRun> for GradeRow {
    fn from(run: WorkspaceRun) -> Self {
        Self {
            id: run.id,
            repo_full_name: run.repo_full_name,
            branch: run.branch,
            score: run.score,
            max_score: run.max_score,
            passed: run.passed,
            total: run.total,
            status: run.status,
            summary: run.summary,
            assignment_id: run.assignment_slug,
            commit_sha: run.commit_sha,
            created_at: run.created_at,
        }
    }
}

/// GET /api/grades?username=&assignmentId=&limit=
///
/// Returns the newest `check` runs for a user, optionally narrowed to one
/// assignment. `limit` defaults to 50 and is capped at 200.
///
/// Access is granted to the platform token, or to a session whose user is
/// the queried `username`.
///
/// ### Responses
/// - `200 OK` with the runs (newest first)
/// - `400 Bad Request` when `username` is missing
/// - `401 Unauthorized` otherwise
pub async fn list_grades(
    State(app_state): State<AppState>,
    Query(params): Query<GradesParams>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    session: Option<AuthUser>,
) -> Result<Json<ApiResponse<Vec<GradeRow>>>, (StatusCode, Json<ApiResponse<()>>)> {
    let Some(username) = params.username else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("username query required")),
        ));
    };

    let authorized = match &bearer {
        Some(TypedHeader(Authorization(b))) if is_platform_token(Some(b.token())) => true,
        _ => match session {
            Some(user) => {
                match User::find_by_id(app_state.db(), user.user_id()).await {
                    Ok(Some(db_user)) => db_user.username == username,
                    _ => false,
                }
            }
            None => false,
        },
    };
    if !authorized {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Unauthorized")),
        ));
    }

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let runs = WorkspaceRun::list_checks(
        app_state.db(),
        &username,
        params.assignment_id.as_deref(),
        limit,
    )
    .await
    .map_err(|e| {
        error!(error = %e, "Error fetching grades");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Error fetching grades")),
        )
    })?;

    Ok(Json(ApiResponse::success(
        runs.into_iter().map(GradeRow::from).collect(),
        "Grades fetched successfully",
    )))
}
