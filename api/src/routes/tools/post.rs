use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

use crate::response::ApiResponse;
use crate::services::grading::{PASS_THRESHOLD_PERCENT, compute_score, mark_submission_if_passed};
use crate::state::AppState;
use db::models::workspace_run::{Model as WorkspaceRun, NewWorkspaceRun};

/// Default max score applied to tool reports.
const DEFAULT_MAX_SCORE: f64 = 100.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub repo_full_name: String,
    pub assignment_id: Option<String>,
    pub branch: Option<String>,
    pub tool: Option<String>,
    pub status: Option<String>,
    pub summary: Option<String>,
    pub raw_result: Option<Value>,
    pub github_login: Option<String>,
    pub commit_sha: Option<String>,
}

/// POST /api/tools/report
///
/// Accepts a result report from a grading tool. The score is computed from
/// `rawResult` (numeric `passed`/`total` fields, or a `passed/total` pattern
/// in its summary), rounded to two decimals, and persisted as an append-only
/// workspace run. A `check` report meeting the pass threshold also marks the
/// assignment as submitted.
///
/// Authentication: `Authorization: Bearer <PLATFORM_TOKEN>` (enforced by the
/// route guard).
///
/// ### Request Body
/// ```json
/// {
///   "repoFullName": "alice/hello",
///   "assignmentId": "hello",
///   "tool": "check",
///   "githubLogin": "alice",
///   "rawResult": { "passed": 7, "total": 10 }
/// }
/// ```
///
/// ### Response
/// - `200 OK` with the stored run
pub async fn report(
    State(app_state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> impl IntoResponse {
    let db = app_state.db();

    let score_info = req
        .raw_result
        .as_ref()
        .and_then(|raw| compute_score(raw, DEFAULT_MAX_SCORE));

    let (passed, total, score, max_score) = match &score_info {
        Some(info) => (
            Some(info.passed),
            Some(info.total),
            Some((info.score * 100.0).round() / 100.0),
            Some(DEFAULT_MAX_SCORE),
        ),
        None => (None, None, None, None),
    };

    let tool = req.tool.clone().unwrap_or_else(|| "check".to_string());
    let status = req.status.clone().unwrap_or_else(|| {
        if score.is_some() && score == max_score {
            "success".to_string()
        } else {
            "fail".to_string()
        }
    });

    let run = WorkspaceRun::record(
        db,
        NewWorkspaceRun {
            github_login: req.github_login.clone(),
            repo_full_name: req.repo_full_name.clone(),
            branch: req.branch.clone(),
            tool: tool.clone(),
            status,
            summary: req.summary.clone(),
            raw_result: req.raw_result.clone(),
            passed,
            total,
            score,
            max_score,
            commit_sha: req.commit_sha.clone(),
            assignment_slug: req.assignment_id.clone(),
        },
    )
    .await;

    let run = match run {
        Ok(run) => run,
        Err(e) => {
            error!(error = %e, "Error recording tool report");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Error recording report")),
            );
        }
    };

    if tool == "check" {
        if let (Some(login), Some(assignment), Some(score), Some(max_score)) = (
            req.github_login.as_deref(),
            req.assignment_id.as_deref(),
            score,
            max_score,
        ) {
            if let Err(e) = mark_submission_if_passed(
                db,
                login,
                assignment,
                score,
                max_score,
                PASS_THRESHOLD_PERCENT,
            )
            .await
            {
                // The run is recorded; a failed mark must not fail the report.
                error!(error = %e, "Auto-mark after tool report failed");
            }
        }
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(Some(run), "Report recorded")),
    )
}
