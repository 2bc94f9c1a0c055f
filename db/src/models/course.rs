use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, QueryOrder, Set};
use serde::Serialize;

/// Represents a course in the `courses` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// URL-safe unique identifier, e.g. `cs50x`.
    #[sea_orm(unique)]
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::week::Entity")]
    Week,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
}

impl Related<super::week::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Week.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        slug: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = ActiveModel {
            slug: Set(slug.to_string()),
            title: Set(title.to_string()),
            description: Set(description.map(str::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    pub async fn find_by_slug(db: &DatabaseConnection, slug: &str) -> Result<Option<Self>, DbErr> {
        Entity::find().filter(Column::Slug.eq(slug)).one(db).await
    }

    pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Self>, DbErr> {
        Entity::find().order_by_asc(Column::Slug).all(db).await
    }

    /// Number of enrollments for this course.
    pub async fn enrollment_count(&self, db: &DatabaseConnection) -> Result<u64, DbErr> {
        super::enrollment::Entity::find()
            .filter(super::enrollment::Column::CourseId.eq(self.id))
            .count(db)
            .await
    }

    /// Number of weeks in this course.
    pub async fn week_count(&self, db: &DatabaseConnection) -> Result<u64, DbErr> {
        super::week::Entity::find()
            .filter(super::week::Column::CourseId.eq(self.id))
            .count(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::Model as Course;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn create_and_fetch_by_slug_round_trips() {
        let db = setup_test_db().await;

        Course::create(&db, "cs50x", "CS50x", Some("Intro to CS")).await.unwrap();

        let fetched = Course::find_by_slug(&db, "cs50x").await.unwrap().unwrap();
        assert_eq!(fetched.title, "CS50x");
        assert_eq!(fetched.description.as_deref(), Some("Intro to CS"));
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let db = setup_test_db().await;

        Course::create(&db, "web-dev", "Web Dev", None).await.unwrap();
        let dup = Course::create(&db, "web-dev", "Other", None).await;
        assert!(dup.is_err());
    }
}
