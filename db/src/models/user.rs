use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, Set};
use serde::Serialize;

/// Represents a platform user in the `users` table.
///
/// Users are created the first time a GitHub identity authenticates and
/// updated on every subsequent login. The stored OAuth token, granted scopes
/// and token timestamp are never serialized into API responses.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Remote GitHub account id, unique per user.
    #[sea_orm(unique)]
    pub github_id: String,
    /// GitHub login name.
    pub username: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    /// Stored OAuth access token. Never logged, never serialized.
    #[serde(skip_serializing)]
    pub github_access_token: Option<String>,
    /// Scopes actually granted by GitHub (may be narrower than requested).
    #[serde(skip_serializing)]
    pub github_token_scopes: Option<String>,
    #[serde(skip_serializing)]
    pub token_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
    #[sea_orm(has_many = "super::submission::Entity")]
    Submission,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn find_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    pub async fn find_by_github_id(
        db: &DatabaseConnection,
        github_id: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::GithubId.eq(github_id))
            .one(db)
            .await
    }

    pub async fn find_by_username(
        db: &DatabaseConnection,
        username: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::Username.eq(username))
            .one(db)
            .await
    }

    /// Creates or updates the local user for a GitHub identity.
    ///
    /// Profile fields are refreshed when present; the access token, granted
    /// scopes and token timestamp are always overwritten.
    pub async fn upsert_from_github(
        db: &DatabaseConnection,
        github_id: &str,
        username: &str,
        email: Option<&str>,
        avatar_url: Option<&str>,
        access_token: &str,
        token_scopes: Option<&str>,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();

        match Self::find_by_github_id(db, github_id).await? {
            Some(existing) => {
                let mut active: ActiveModel = existing.clone().into();
                active.username = Set(username.to_string());
                if email.is_some() {
                    active.email = Set(email.map(str::to_string));
                }
                if avatar_url.is_some() {
                    active.avatar_url = Set(avatar_url.map(str::to_string));
                }
                active.github_access_token = Set(Some(access_token.to_string()));
                active.github_token_scopes = Set(token_scopes.map(str::to_string));
                active.token_updated_at = Set(Some(now));
                active.updated_at = Set(now);
                active.update(db).await
            }
            None => {
                let active = ActiveModel {
                    github_id: Set(github_id.to_string()),
                    username: Set(username.to_string()),
                    email: Set(email.map(str::to_string)),
                    avatar_url: Set(avatar_url.map(str::to_string)),
                    github_access_token: Set(Some(access_token.to_string())),
                    github_token_scopes: Set(token_scopes.map(str::to_string)),
                    token_updated_at: Set(Some(now)),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                active.insert(db).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Model as User;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn upsert_creates_then_refreshes_token() {
        let db = setup_test_db().await;

        let created = User::upsert_from_github(
            &db,
            "12345",
            "octocat",
            Some("octo@example.com"),
            None,
            "gho_first",
            Some("repo,codespace"),
        )
        .await
        .unwrap();
        assert_eq!(created.username, "octocat");
        assert_eq!(created.github_access_token.as_deref(), Some("gho_first"));

        let updated = User::upsert_from_github(
            &db,
            "12345",
            "octocat-renamed",
            None,
            Some("https://example.com/a.png"),
            "gho_second",
            Some("repo"),
        )
        .await
        .unwrap();

        // Same row, refreshed token and profile.
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.username, "octocat-renamed");
        assert_eq!(updated.github_access_token.as_deref(), Some("gho_second"));
        assert_eq!(updated.github_token_scopes.as_deref(), Some("repo"));
        // Email not supplied on the second login stays intact.
        assert_eq!(updated.email.as_deref(), Some("octo@example.com"));
    }

    #[tokio::test]
    async fn serialization_never_leaks_the_token() {
        let db = setup_test_db().await;
        let user = User::upsert_from_github(&db, "7", "hexley", None, None, "gho_secret", None)
            .await
            .unwrap();

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("gho_secret"));
        assert!(!json.contains("github_access_token"));
    }
}
