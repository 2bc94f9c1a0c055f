use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::error;

use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use db::models::{
    course::Model as Course, enrollment::Model as Enrollment, week::Model as Week,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWithWeeks {
    #[serde(flatten)]
    pub course: Course,
    pub weeks: Vec<Week>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentWithCourse {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course: CourseWithWeeks,
}

/// GET /api/enrollments/my-courses
///
/// Returns the caller's enrollments, each with its course and that course's
/// weeks in order.
///
/// ### Response
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": [
///     {
///       "id": 1,
///       "user_id": 7,
///       "course_id": 3,
///       "course": { "slug": "cs50x", "title": "CS50x", "weeks": [ ... ] }
///     }
///   ],
///   "message": "Enrollments fetched successfully"
/// }
/// ```
pub async fn my_courses(
    State(app_state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<EnrollmentWithCourse>>>, (StatusCode, Json<ApiResponse<()>>)> {
    let db = app_state.db();

    let fail = |e: sea_orm::DbErr| {
        error!(error = %e, "Error fetching enrollments");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("Error fetching enrollments")),
        )
    };

    let enrollments = Enrollment::find_for_user(db, user.user_id())
        .await
        .map_err(fail)?;

    let mut result = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        let Some(course) = Course::find_by_id(db, enrollment.course_id).await.map_err(fail)?
        else {
            // Enrollment rows cascade with their course; a miss here is a
            // transient race, not an error worth failing the list for.
            continue;
        };
        let weeks = Week::find_for_course(db, course.id).await.map_err(fail)?;
        result.push(EnrollmentWithCourse {
            enrollment,
            course: CourseWithWeeks { course, weeks },
        });
    }

    Ok(Json(ApiResponse::success(
        result,
        "Enrollments fetched successfully",
    )))
}
