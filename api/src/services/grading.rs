//! Score computation and threshold-based auto-marking.

use db::models::{
    assignment::Model as Assignment, enrollment::Model as Enrollment,
    submission::Model as Submission, user::Model as User, week::Model as Week,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{DatabaseConnection, DbErr};
use serde_json::Value;
use tracing::info;

/// Score threshold (percent of max) at or above which a report marks the
/// assignment as submitted.
pub const PASS_THRESHOLD_PERCENT: f64 = 70.0;

static SUMMARY_RATIO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*/\s*(\d+)").expect("valid regex"));

static WEEK_SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^week\s*(\d+)$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreInfo {
    pub passed: i32,
    pub total: i32,
    pub score: f64,
}

/// Computes a score from a raw tool result.
///
/// Numeric `passed`/`total` fields win; otherwise the first `passed/total`
/// ratio in the `summary` string is used. Returns `None` when neither is
/// present or `total` is zero.
pub fn compute_score(raw_result: &Value, max_score: f64) -> Option<ScoreInfo> {
    let numeric = raw_result
        .get("passed")
        .and_then(Value::as_i64)
        .zip(raw_result.get("total").and_then(Value::as_i64));

    let (passed, total) = numeric.or_else(|| {
        let summary = raw_result.get("summary").and_then(Value::as_str)?;
        let caps = SUMMARY_RATIO.captures(summary)?;
        Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
    })?;

    if total == 0 {
        return None;
    }

    Some(ScoreInfo {
        passed: passed as i32,
        total: total as i32,
        score: passed as f64 / total as f64 * max_score,
    })
}

/// Resolves a reported assignment identifier to a row.
///
/// Lookup order: assignment slug, then a raw week id, then a legacy `weekN`
/// identifier (case-insensitive). Week matches auto-vivify a synthetic
/// per-week assignment so legacy reports still land somewhere stable.
async fn resolve_assignment(
    db: &DatabaseConnection,
    identifier: &str,
) -> Result<Option<Assignment>, DbErr> {
    if let Some(assignment) = Assignment::find_by_slug(db, identifier).await? {
        return Ok(Some(assignment));
    }

    let week = if let Ok(week_id) = identifier.parse::<i64>() {
        Week::find_by_id(db, week_id).await?
    } else if let Some(caps) = WEEK_SLUG.captures(identifier) {
        let number: i32 = caps[1].parse().unwrap_or(-1);
        Week::find_first_by_number(db, number).await?
    } else {
        None
    };

    match week {
        Some(week) => {
            let slug = format!("week{}-auto", week.id);
            let title = format!("Week {} (auto)", week.week_number);
            Ok(Some(
                Assignment::ensure_by_slug(db, week.id, &slug, &title).await?,
            ))
        }
        None => Ok(None),
    }
}

/// Marks the assignment as submitted when the score clears the threshold.
///
/// The reporter is auto-enrolled in the assignment's course if needed; this
/// path is deliberately more permissive than the interactive submission
/// endpoint, since a grading report proves the student is working in the
/// course. Returns whether a submission was recorded.
pub async fn mark_submission_if_passed(
    db: &DatabaseConnection,
    github_login: &str,
    assignment_identifier: &str,
    score: f64,
    max_score: f64,
    threshold_percent: f64,
) -> Result<bool, DbErr> {
    if max_score <= 0.0 || (score / max_score) * 100.0 < threshold_percent {
        return Ok(false);
    }

    let Some(user) = User::find_by_username(db, github_login).await? else {
        info!(github_login, "Passing report for an unknown user; skipping mark");
        return Ok(false);
    };

    let Some(assignment) = resolve_assignment(db, assignment_identifier).await? else {
        info!(
            identifier = assignment_identifier,
            "Passing report references no known assignment or week"
        );
        return Ok(false);
    };

    let week = Week::find_by_id(db, assignment.week_id)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound("assignment week vanished".into()))?;

    Enrollment::ensure(db, user.id, week.course_id).await?;

    let content = format!("auto-graded: {score:.2}/{max_score:.2}");
    Submission::upsert(db, user.id, assignment.id, &content).await?;

    info!(
        user = %user.username,
        assignment = %assignment.slug,
        score,
        "Marked assignment as submitted from grading report"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::{PASS_THRESHOLD_PERCENT, compute_score, mark_submission_if_passed};
    use db::models::{
        assignment::Model as Assignment, course::Model as Course,
        enrollment::Model as Enrollment, submission::Model as Submission, user::Model as User,
        week::Model as Week,
    };
    use db::test_utils::setup_test_db;
    use sea_orm::DatabaseConnection;
    use serde_json::json;

    #[test]
    fn numeric_fields_win_over_summary() {
        let raw = json!({ "passed": 7, "total": 10, "summary": "1/2 tests passed" });
        let info = compute_score(&raw, 100.0).unwrap();
        assert_eq!(info.passed, 7);
        assert_eq!(info.total, 10);
        assert_eq!(info.score, 70.0);
    }

    #[test]
    fn summary_ratio_is_the_fallback() {
        let raw = json!({ "summary": "passed 6/10 tests" });
        let info = compute_score(&raw, 50.0).unwrap();
        assert_eq!(info.score, 30.0);
    }

    #[test]
    fn zero_total_and_missing_fields_score_nothing() {
        assert!(compute_score(&json!({ "passed": 0, "total": 0 }), 100.0).is_none());
        assert!(compute_score(&json!({ "summary": "no tests ran" }), 100.0).is_none());
        assert!(compute_score(&json!({}), 100.0).is_none());
    }

    async fn fixture(db: &DatabaseConnection) -> (User, Assignment, Course) {
        let user = User::upsert_from_github(db, "1", "alice", None, None, "tok", None)
            .await
            .unwrap();
        let course = Course::create(db, "cs50x", "CS50x", None).await.unwrap();
        let week = Week::create(db, course.id, 1, "C", None).await.unwrap();
        let assignment = Assignment::create(db, week.id, "hello", "Hello", None)
            .await
            .unwrap();
        (user, assignment, course)
    }

    #[tokio::test]
    async fn seventy_percent_marks_and_auto_enrolls() {
        let db = setup_test_db().await;
        let (user, assignment, course) = fixture(&db).await;

        let marked = mark_submission_if_passed(
            &db,
            "alice",
            "hello",
            70.0,
            100.0,
            PASS_THRESHOLD_PERCENT,
        )
        .await
        .unwrap();
        assert!(marked);

        let submission = Submission::find_by_user_and_assignment(&db, user.id, assignment.id)
            .await
            .unwrap()
            .unwrap();
        assert!(submission.content.contains("70.00"));

        // The reporter was never enrolled interactively.
        assert!(
            Enrollment::find_by_user_and_course(&db, user.id, course.id)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn below_threshold_does_not_mark() {
        let db = setup_test_db().await;
        let (user, assignment, _) = fixture(&db).await;

        let marked = mark_submission_if_passed(
            &db,
            "alice",
            "hello",
            60.0,
            100.0,
            PASS_THRESHOLD_PERCENT,
        )
        .await
        .unwrap();
        assert!(!marked);

        assert!(
            Submission::find_by_user_and_assignment(&db, user.id, assignment.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn legacy_week_identifier_vivifies_a_synthetic_assignment() {
        let db = setup_test_db().await;
        let (user, _, course) = fixture(&db).await;
        let week2 = Week::create(&db, course.id, 2, "Arrays", None).await.unwrap();

        let marked = mark_submission_if_passed(
            &db,
            "alice",
            "Week2",
            90.0,
            100.0,
            PASS_THRESHOLD_PERCENT,
        )
        .await
        .unwrap();
        assert!(marked);

        let synthetic = Assignment::find_by_slug(&db, &format!("week{}-auto", week2.id))
            .await
            .unwrap()
            .unwrap();
        assert!(
            Submission::find_by_user_and_assignment(&db, user.id, synthetic.id)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn unknown_reporter_is_a_quiet_no_op() {
        let db = setup_test_db().await;
        fixture(&db).await;

        let marked =
            mark_submission_if_passed(&db, "stranger", "hello", 100.0, 100.0, 70.0)
                .await
                .unwrap();
        assert!(!marked);
    }
}
