use crate::services::github::GithubClient;
use sea_orm::DatabaseConnection;

/// Shared application state handed to every request handler.
///
/// Holds the database handle and the GitHub API client. Both are cheap to
/// clone, so the whole struct is passed by value through axum's `State`.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    github: GithubClient,
}

impl AppState {
    pub fn new(db: DatabaseConnection, github: GithubClient) -> Self {
        Self { db, github }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn github(&self) -> &GithubClient {
        &self.github
    }
}
