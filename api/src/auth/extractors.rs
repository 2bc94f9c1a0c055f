use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{StatusCode, request::Parts},
};
use axum_extra::extract::TypedHeader;
use axum_extra::extract::cookie::CookieJar;
use headers::{Authorization, authorization::Bearer};

use crate::auth::claims::AuthUser;
use crate::auth::decode_session_jwt;

/// Name of the cookie carrying the session JWT.
pub const SESSION_COOKIE: &str = "session";

/// Implements extraction of `AuthUser` from request parts.
///
/// The session token is looked up in the `session` cookie first, then in the
/// `Authorization: Bearer` header, so both browser sessions and scripted
/// clients resolve through one code path.
///
/// # Errors
/// - Returns `401 Unauthorized` if no token is present or the token is
///   invalid or expired.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = session_token(parts, state)
            .await
            .ok_or((StatusCode::UNAUTHORIZED, "Not authenticated"))?;

        let claims = decode_session_jwt(&token)
            .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid or expired session"))?;

        Ok(AuthUser(claims))
    }
}

/// Optional variant used by endpoints that behave differently for
/// anonymous callers (e.g. redirecting into the OAuth flow).
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(user) => Ok(Some(user)),
            Err(_) => Ok(None),
        }
    }
}

async fn session_token<S: Send + Sync>(parts: &mut Parts, state: &S) -> Option<String> {
    let jar = CookieJar::from_request_parts(parts, state).await.ok()?;
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    <TypedHeader<Authorization<Bearer>> as FromRequestParts<S>>::from_request_parts(parts, state)
        .await
        .ok()
        .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::generate_session_jwt;
    use axum::http::Request;
    use common::config::AppConfig;
    use serial_test::serial;

    fn parts_for(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    #[serial]
    async fn request_without_credentials_is_unauthorized() {
        AppConfig::reset();
        let mut parts = parts_for(Request::builder().uri("/api/enrollments/my-courses"));
        let result = <AuthUser as FromRequestParts<()>>::from_request_parts(&mut parts, &()).await;
        let (status, _) = result.expect_err("no credentials must be rejected");
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[serial]
    async fn session_cookie_and_bearer_header_both_resolve() {
        AppConfig::reset();
        AppConfig::set_session_secret("extractor-test-secret");
        let (token, _) = generate_session_jwt(42);

        let mut parts = parts_for(
            Request::builder()
                .uri("/")
                .header("cookie", format!("{SESSION_COOKIE}={token}")),
        );
        let user = <AuthUser as FromRequestParts<()>>::from_request_parts(&mut parts, &())
            .await
            .expect("cookie session must authenticate");
        assert_eq!(user.user_id(), 42);

        let mut parts = parts_for(
            Request::builder()
                .uri("/")
                .header("authorization", format!("Bearer {token}")),
        );
        let user = <AuthUser as FromRequestParts<()>>::from_request_parts(&mut parts, &())
            .await
            .expect("bearer session must authenticate");
        assert_eq!(user.user_id(), 42);
        AppConfig::reset();
    }
}
