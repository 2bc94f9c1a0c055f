use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, QueryOrder, Set};
use serde::Serialize;

/// Represents an assignment in the `assignments` table.
///
/// Slugs are globally unique so grading reports can reference an assignment
/// without knowing its course or week.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub week_id: i64,
    #[sea_orm(unique)]
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::week::Entity",
        from = "Column::WeekId",
        to = "super::week::Column::Id"
    )]
    Week,
    #[sea_orm(has_many = "super::submission::Entity")]
    Submission,
}

impl Related<super::week::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Week.def()
    }
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        week_id: i64,
        slug: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = ActiveModel {
            week_id: Set(week_id),
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

    pub async fn find_for_week(db: &DatabaseConnection, week_id: i64) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::WeekId.eq(week_id))
            .order_by_asc(Column::Slug)
            .all(db)
            .await
    }

    /// Finds the assignment by slug or creates it under the given week.
    ///
    /// Grading ingest uses this to auto-vivify a synthetic per-week
    /// assignment when a report references a week rather than an assignment.
    pub async fn ensure_by_slug(
        db: &DatabaseConnection,
        week_id: i64,
        slug: &str,
        title: &str,
    ) -> Result<Self, DbErr> {
        match Self::find_by_slug(db, slug).await? {
            Some(existing) => Ok(existing),
            None => Self::create(db, week_id, slug, title, None).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Model as Assignment;
    use crate::models::course::Model as Course;
    use crate::models::week::Model as Week;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn slugs_are_globally_unique() {
        let db = setup_test_db().await;
        let course = Course::create(&db, "cs50x", "CS50x", None).await.unwrap();
        let w1 = Week::create(&db, course.id, 1, "C", None).await.unwrap();
        let w2 = Week::create(&db, course.id, 2, "Arrays", None).await.unwrap();

        Assignment::create(&db, w1.id, "hello", "Hello", None).await.unwrap();
        // Same slug under a different week still conflicts.
        assert!(Assignment::create(&db, w2.id, "hello", "Hello 2", None).await.is_err());
    }

    #[tokio::test]
    async fn ensure_by_slug_reuses_existing() {
        let db = setup_test_db().await;
        let course = Course::create(&db, "cs50x", "CS50x", None).await.unwrap();
        let week = Week::create(&db, course.id, 1, "C", None).await.unwrap();

        let a = Assignment::ensure_by_slug(&db, week.id, "mario", "Mario").await.unwrap();
        let b = Assignment::ensure_by_slug(&db, week.id, "mario", "Other").await.unwrap();
        assert_eq!(a.id, b.id);
    }
}
