use axum::{Json, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::auth::extractors::SESSION_COOKIE;
use crate::auth::guards::Empty;
use crate::response::ApiResponse;

/// POST /auth/logout
///
/// Removes the session cookie. Safe to call without a session.
///
/// ### Response
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {},
///   "message": "Logged out successfully"
/// }
/// ```
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    (
        jar,
        Json(ApiResponse::success(Empty, "Logged out successfully")),
    )
}
