use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use db::models::{
    course::Model as Course,
    enrollment::{EnrollError, Model as Enrollment},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub course_id: Option<i64>,
    pub slug: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course: Course,
}

/// POST /api/enrollments
///
/// Enrolls the caller in a course, referenced either by id or by slug.
/// Enrolling by a slug that does not exist yet creates a stub course, so
/// students can join material that has not been published; its weeks and
/// assignments arrive later via the offline `seed` job.
///
/// ### Request Body
/// ```json
/// { "courseId": 3 }
/// ```
/// or
/// ```json
/// { "slug": "cs50x" }
/// ```
///
/// ### Responses
/// - `201 Created` with the enrollment and its course
/// - `400 Bad Request` when neither `courseId` nor `slug` is given
/// - `404 Not Found` when `courseId` references no course
/// - `409 Conflict`
/// ```json
/// { "success": false, "data": {}, "message": "Already enrolled in this course" }
/// ```
pub async fn enroll(
    State(app_state): State<AppState>,
    user: AuthUser,
    Json(req): Json<EnrollRequest>,
) -> impl IntoResponse {
    let db = app_state.db();

    let fail = |e: &dyn std::fmt::Display| {
        error!(error = %e, "Error enrolling in course");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Option<EnrollmentResponse>>::error(
                "Error enrolling in course",
            )),
        )
    };

    let course = match (req.course_id, req.slug) {
        (Some(course_id), _) => match Course::find_by_id(db, course_id).await {
            Ok(Some(course)) => course,
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(ApiResponse::error("Course not found")),
                );
            }
            Err(e) => return fail(&e),
        },
        (None, Some(slug)) => match Course::find_by_slug(db, &slug).await {
            Ok(Some(course)) => course,
            Ok(None) => match Course::create(db, &slug, &slug, None).await {
                Ok(course) => course,
                // Lost a race against another enroll creating the same stub.
                Err(e) if e.to_string().contains("UNIQUE") => {
                    match Course::find_by_slug(db, &slug).await {
                        Ok(Some(course)) => course,
                        Ok(None) => return fail(&"stub course vanished"),
                        Err(e) => return fail(&e),
                    }
                }
                Err(e) => return fail(&e),
            },
            Err(e) => return fail(&e),
        },
        (None, None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("Missing courseId or slug")),
            );
        }
    };

    match Enrollment::enroll(db, user.user_id(), course.id).await {
        Ok(enrollment) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                Some(EnrollmentResponse { enrollment, course }),
                "Enrolled successfully",
            )),
        ),
        Err(EnrollError::AlreadyEnrolled) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("Already enrolled in this course")),
        ),
        Err(EnrollError::Db(e)) => fail(&e),
    }
}
