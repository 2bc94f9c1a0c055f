use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sea_orm::DbErr;
use serde::Serialize;
use tracing::error;

use crate::response::ApiResponse;
use crate::state::AppState;
use db::models::{
    assignment::Model as Assignment, course::Model as Course, week::Model as Week,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    #[serde(flatten)]
    pub course: Course,
    pub week_count: u64,
    pub enrollment_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekDetail {
    #[serde(flatten)]
    pub week: Week,
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub weeks: Vec<WeekDetail>,
    pub enrollment_count: u64,
}

fn db_failure<T: Serialize + Default>(e: DbErr, what: &str) -> (StatusCode, Json<ApiResponse<T>>) {
    error!(error = %e, "Error fetching {what}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error(format!("Error fetching {what}"))),
    )
}

/// GET /api/courses
///
/// Lists all courses with their week and enrollment counts.
///
/// ### Response
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": [
///     { "id": 1, "slug": "cs50x", "title": "CS50x", "weekCount": 10, "enrollmentCount": 42 }
///   ],
///   "message": "Courses fetched successfully"
/// }
/// ```
pub async fn list_courses(
    State(app_state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CourseSummary>>>, (StatusCode, Json<ApiResponse<Vec<CourseSummary>>>)>
{
    let db = app_state.db();
    let courses = Course::list_all(db)
        .await
        .map_err(|e| db_failure(e, "courses"))?;

    let mut summaries = Vec::with_capacity(courses.len());
    for course in courses {
        let week_count = course
            .week_count(db)
            .await
            .map_err(|e| db_failure(e, "courses"))?;
        let enrollment_count = course
            .enrollment_count(db)
            .await
            .map_err(|e| db_failure(e, "courses"))?;
        summaries.push(CourseSummary {
            course,
            week_count,
            enrollment_count,
        });
    }

    Ok(Json(ApiResponse::success(
        summaries,
        "Courses fetched successfully",
    )))
}

/// GET /api/courses/{slug}
///
/// Returns one course with its weeks in order (each with its assignments)
/// and the enrollment count.
///
/// ### Responses
/// - `200 OK` with the course detail
/// - `404 Not Found`
/// ```json
/// { "success": false, "data": {}, "message": "Course not found" }
/// ```
pub async fn get_course(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<CourseDetail>>, (StatusCode, Json<ApiResponse<()>>)> {
    let db = app_state.db();

    let course = Course::find_by_slug(db, &slug)
        .await
        .map_err(|e| db_failure(e, "course"))?
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Course not found")),
        ))?;

    let weeks = Week::find_for_course(db, course.id)
        .await
        .map_err(|e| db_failure(e, "course"))?;
    let mut week_details = Vec::with_capacity(weeks.len());
    for week in weeks {
        let assignments = Assignment::find_for_week(db, week.id)
            .await
            .map_err(|e| db_failure(e, "course"))?;
        week_details.push(WeekDetail { week, assignments });
    }

    let enrollment_count = course
        .enrollment_count(db)
        .await
        .map_err(|e| db_failure(e, "course"))?;

    Ok(Json(ApiResponse::success(
        CourseDetail {
            course,
            weeks: week_details,
            enrollment_count,
        },
        "Course fetched successfully",
    )))
}
