use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, QueryOrder, Set};
use serde::Serialize;

/// Represents a course week in the `weeks` table.
///
/// Week numbers are unique within a course but not globally.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "weeks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub week_number: i32,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignment,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        course_id: i64,
        week_number: i32,
        title: &str,
        description: Option<&str>,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = ActiveModel {
            course_id: Set(course_id),
            week_number: Set(week_number),
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

    /// Weeks of a course ordered by week number.
    pub async fn find_for_course(
        db: &DatabaseConnection,
        course_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::WeekNumber)
            .all(db)
            .await
    }

    pub async fn find_by_course_and_number(
        db: &DatabaseConnection,
        course_id: i64,
        week_number: i32,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::WeekNumber.eq(week_number))
            .one(db)
            .await
    }

    /// First week with the given number across all courses.
    ///
    /// Used when resolving legacy `weekN` grading identifiers that carry no
    /// course information.
    pub async fn find_first_by_number(
        db: &DatabaseConnection,
        week_number: i32,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::WeekNumber.eq(week_number))
            .order_by_asc(Column::Id)
            .one(db)
            .await
    }

    /// Finds the week or creates it with the given title/description.
    pub async fn ensure(
        db: &DatabaseConnection,
        course_id: i64,
        week_number: i32,
        title: &str,
        description: Option<&str>,
    ) -> Result<Self, DbErr> {
        match Self::find_by_course_and_number(db, course_id, week_number).await? {
            Some(existing) => Ok(existing),
            None => Self::create(db, course_id, week_number, title, description).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Model as Week;
    use crate::models::course::Model as Course;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn week_numbers_are_unique_per_course_only() {
        let db = setup_test_db().await;
        let a = Course::create(&db, "a", "A", None).await.unwrap();
        let b = Course::create(&db, "b", "B", None).await.unwrap();

        Week::create(&db, a.id, 1, "Week 1", None).await.unwrap();
        // Same number in another course is fine.
        Week::create(&db, b.id, 1, "Week 1", None).await.unwrap();
        // Same number in the same course is not.
        assert!(Week::create(&db, a.id, 1, "Again", None).await.is_err());
    }

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let db = setup_test_db().await;
        let course = Course::create(&db, "cs50x", "CS50x", None).await.unwrap();

        let w1 = Week::ensure(&db, course.id, 3, "Algorithms", None).await.unwrap();
        let w2 = Week::ensure(&db, course.id, 3, "Renamed", None).await.unwrap();
        assert_eq!(w1.id, w2.id);
        assert_eq!(w2.title, "Algorithms");
    }
}
