use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::Value;
use tracing::{error, warn};

use crate::response::ApiResponse;
use crate::services::checks::fetch_check_result;
use crate::services::grading::{PASS_THRESHOLD_PERCENT, compute_score, mark_submission_if_passed};
use crate::state::AppState;
use db::models::workspace_run::{Model as WorkspaceRun, NewWorkspaceRun};

/// Branch whose pushes mean "I am handing this in".
const SUBMIT_BRANCH: &str = "submit";

const DEFAULT_MAX_SCORE: f64 = 100.0;

/// POST /api/webhook/github
///
/// Receives GitHub push events.
///
/// - A push to the `submit` branch records a `submit` run and re-marks the
///   assignment from the latest `check` run for that repo and user.
/// - Any other push shallow-clones the repo at the pushed branch and looks
///   for `.check50/result.json`; a found result becomes a scored `check`
///   run, an absent one a `no_result` audit run.
///
/// ### Responses
/// - `200 OK` `{ "success": true, ... }`
/// - `400 Bad Request` when the payload has no `repository`/`ref`
pub async fn github_push(
    State(app_state): State<AppState>,
    Json(event): Json<Value>,
) -> impl IntoResponse {
    let repo_full_name = event
        .get("repository")
        .and_then(|r| r.get("full_name"))
        .and_then(Value::as_str);
    let git_ref = event.get("ref").and_then(Value::as_str);

    let (Some(repo_full_name), Some(git_ref)) = (repo_full_name, git_ref) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<String>::error("Invalid payload")),
        );
    };

    let branch = git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref);
    let github_login = event
        .get("pusher")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .or_else(|| {
            event
                .get("sender")
                .and_then(|s| s.get("login"))
                .and_then(Value::as_str)
        })
        .map(str::to_string);

    let db = app_state.db();
    let server_error = |e: &dyn std::fmt::Display| {
        error!(error = %e, "Webhook handling error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<String>::error("Webhook handling failed")),
        )
    };

    if branch == SUBMIT_BRANCH {
        let recorded = WorkspaceRun::record(
            db,
            NewWorkspaceRun {
                github_login: github_login.clone(),
                repo_full_name: repo_full_name.to_string(),
                branch: Some(branch.to_string()),
                tool: "submit".into(),
                status: "submitted".into(),
                summary: Some("User pushed to submit branch".into()),
                ..Default::default()
            },
        )
        .await;
        if let Err(e) = recorded {
            return server_error(&e);
        }

        // Re-mark from the latest check run; a failed mark must not block
        // the webhook acknowledgement.
        match WorkspaceRun::latest_check(db, repo_full_name, github_login.as_deref()).await {
            Ok(Some(latest)) => {
                if let (Some(login), Some(slug), Some(score), Some(max_score)) = (
                    github_login.as_deref(),
                    latest.assignment_slug.as_deref(),
                    latest.score,
                    latest.max_score,
                ) {
                    if let Err(e) = mark_submission_if_passed(
                        db,
                        login,
                        slug,
                        score,
                        max_score,
                        PASS_THRESHOLD_PERCENT,
                    )
                    .await
                    {
                        warn!(error = %e, "Auto-mark after submit failed");
                    }
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Latest check lookup failed after submit"),
        }

        return (
            StatusCode::OK,
            Json(ApiResponse::success(
                "submit recorded".to_string(),
                "Submit recorded",
            )),
        );
    }

    let check_result = match fetch_check_result(repo_full_name, branch).await {
        Ok(result) => result,
        Err(e) => return server_error(&e),
    };

    let commit_sha = event
        .get("head_commit")
        .and_then(|c| c.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let assignment_slug = event
        .get("repository")
        .and_then(|r| r.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);

    match check_result {
        Some(raw) => {
            let score_info = compute_score(&raw, DEFAULT_MAX_SCORE);
            let (status, summary, passed, total, score, max_score) = match &score_info {
                Some(info) => (
                    if info.passed == info.total {
                        "success".to_string()
                    } else {
                        "fail".to_string()
                    },
                    Some(format!("{}/{} tests passed", info.passed, info.total)),
                    Some(info.passed),
                    Some(info.total),
                    Some((info.score * 100.0).round() / 100.0),
                    Some(DEFAULT_MAX_SCORE),
                ),
                None => ("no_result".to_string(), None, None, None, None, None),
            };

            let recorded = WorkspaceRun::record(
                db,
                NewWorkspaceRun {
                    github_login,
                    repo_full_name: repo_full_name.to_string(),
                    branch: Some(branch.to_string()),
                    tool: "check".into(),
                    status,
                    summary,
                    raw_result: Some(raw),
                    passed,
                    total,
                    score,
                    max_score,
                    commit_sha,
                    assignment_slug,
                },
            )
            .await;
            if let Err(e) = recorded {
                return server_error(&e);
            }

            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    "check result recorded".to_string(),
                    "Check result recorded",
                )),
            )
        }
        None => {
            let recorded = WorkspaceRun::record(
                db,
                NewWorkspaceRun {
                    github_login,
                    repo_full_name: repo_full_name.to_string(),
                    branch: Some(branch.to_string()),
                    tool: "check".into(),
                    status: "no_result".into(),
                    summary: Some("No .check50/result.json found in repo".into()),
                    commit_sha,
                    assignment_slug,
                    ..Default::default()
                },
            )
            .await;
            if let Err(e) = recorded {
                return server_error(&e);
            }

            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    "no result found".to_string(),
                    "No check result found",
                )),
            )
        }
    }
}
