//! HTTP route entry point.
//!
//! Routes are organized by domain, each guarded by the appropriate access
//! control middleware:
//! - `/health` → health check (public)
//! - `/auth` → GitHub OAuth flow and session management (public)
//! - `/api/courses` → course catalog (reads public, writes authenticated)
//! - `/api/enrollments` → the caller's enrollments (authenticated)
//! - `/api/submissions` → the caller's submissions (authenticated)
//! - `/api/codespaces` → workspace provisioning (session-aware)
//! - `/api/grades` → grading history (platform token or own session)
//! - `/api/tools` → machine result reporting (platform token)
//! - `/api/webhook` → GitHub push events (public; GitHub-originated)

use crate::auth::guards::{allow_authenticated, allow_platform_token};
use crate::routes::{
    auth::auth_routes, codespaces::codespaces_routes, courses::courses_routes,
    enrollments::enrollments_routes, grades::grades_routes, health::health_routes,
    submissions::submissions_routes, tools::tools_routes, webhook::webhook_routes,
};
use crate::state::AppState;
use axum::{Router, middleware::from_fn};

pub mod auth;
pub mod codespaces;
pub mod courses;
pub mod enrollments;
pub mod grades;
pub mod health;
pub mod submissions;
pub mod tools;
pub mod webhook;

/// Builds the complete application router for all HTTP endpoints.
pub fn routes(app_state: AppState) -> Router {
    let api = Router::new()
        .nest("/courses", courses_routes())
        .nest(
            "/enrollments",
            enrollments_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/submissions",
            submissions_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest("/codespaces", codespaces_routes())
        .nest("/grades", grades_routes())
        .nest(
            "/tools",
            tools_routes().route_layer(from_fn(allow_platform_token)),
        )
        .nest("/webhook", webhook_routes());

    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest("/api", api)
        .with_state(app_state)
}
