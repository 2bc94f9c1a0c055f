use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ModelTrait, QueryOrder, Set};
use serde::Serialize;
use thiserror::Error;

/// Represents a user's enrollment in a course.
///
/// At most one enrollment may exist per (user, course) pair; the database
/// enforces this with a unique index so concurrent enrolls resolve to a
/// single row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Error)]
pub enum EnrollError {
    #[error("Already enrolled in this course")]
    AlreadyEnrolled,
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl Model {
    pub async fn find_by_user_and_course(
        db: &DatabaseConnection,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::CourseId.eq(course_id))
            .one(db)
            .await
    }

    pub async fn find_for_user(
        db: &DatabaseConnection,
        user_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::CreatedAt)
            .all(db)
            .await
    }

    /// Enrolls the user, rejecting duplicates.
    ///
    /// A lost race against a concurrent enroll surfaces the unique-index
    /// violation as `AlreadyEnrolled` rather than a generic database error.
    pub async fn enroll(
        db: &DatabaseConnection,
        user_id: i64,
        course_id: i64,
    ) -> Result<Self, EnrollError> {
        if Self::find_by_user_and_course(db, user_id, course_id)
            .await?
            .is_some()
        {
            return Err(EnrollError::AlreadyEnrolled);
        }

        let active = ActiveModel {
            user_id: Set(user_id),
            course_id: Set(course_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        match active.insert(db).await {
            Ok(model) => Ok(model),
            Err(e) if e.to_string().contains("UNIQUE") => Err(EnrollError::AlreadyEnrolled),
            Err(e) => Err(e.into()),
        }
    }

    /// Enrolls the user if not already enrolled; idempotent.
    ///
    /// Grading ingest auto-enrolls reporters, so a duplicate here is an
    /// expected outcome, not an error.
    pub async fn ensure(
        db: &DatabaseConnection,
        user_id: i64,
        course_id: i64,
    ) -> Result<Self, DbErr> {
        match Self::enroll(db, user_id, course_id).await {
            Ok(model) => Ok(model),
            Err(EnrollError::AlreadyEnrolled) => {
                Self::find_by_user_and_course(db, user_id, course_id)
                    .await?
                    .ok_or_else(|| DbErr::RecordNotFound("enrollment vanished".into()))
            }
            Err(EnrollError::Db(e)) => Err(e),
        }
    }

    /// Removes the enrollment; returns whether a row existed.
    pub async fn unenroll(
        db: &DatabaseConnection,
        user_id: i64,
        course_id: i64,
    ) -> Result<bool, DbErr> {
        match Self::find_by_user_and_course(db, user_id, course_id).await? {
            Some(model) => {
                model.delete(db).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EnrollError, Model as Enrollment};
    use crate::models::course::Model as Course;
    use crate::models::user::Model as User;
    use crate::test_utils::setup_test_db;
    use sea_orm::{EntityTrait, PaginatorTrait};

    async fn fixture(db: &sea_orm::DatabaseConnection) -> (User, Course) {
        let user = User::upsert_from_github(db, "1", "student", None, None, "tok", None)
            .await
            .unwrap();
        let course = Course::create(db, "cs50x", "CS50x", None).await.unwrap();
        (user, course)
    }

    #[tokio::test]
    async fn enrolling_twice_leaves_exactly_one_row() {
        let db = setup_test_db().await;
        let (user, course) = fixture(&db).await;

        Enrollment::enroll(&db, user.id, course.id).await.unwrap();
        let second = Enrollment::enroll(&db, user.id, course.id).await;
        assert!(matches!(second, Err(EnrollError::AlreadyEnrolled)));

        let count = super::Entity::find().count(&db).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn ensure_returns_the_existing_row() {
        let db = setup_test_db().await;
        let (user, course) = fixture(&db).await;

        let first = Enrollment::ensure(&db, user.id, course.id).await.unwrap();
        let second = Enrollment::ensure(&db, user.id, course.id).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn unenroll_reports_missing_rows() {
        let db = setup_test_db().await;
        let (user, course) = fixture(&db).await;

        assert!(!Enrollment::unenroll(&db, user.id, course.id).await.unwrap());
        Enrollment::enroll(&db, user.id, course.id).await.unwrap();
        assert!(Enrollment::unenroll(&db, user.id, course.id).await.unwrap());
    }
}
