use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, JoinType, ModelTrait, QueryOrder, QuerySelect, Set};
use serde::Serialize;

/// Represents a user's current submission for an assignment.
///
/// Submissions are current state, not a history log: the (user, assignment)
/// pair is unique and a re-submit replaces content and timestamp in place.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub assignment_id: i64,
    pub content: String,
    pub submitted_at: DateTime<Utc>,
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
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id"
    )]
    Assignment,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn find_by_user_and_assignment(
        db: &DatabaseConnection,
        user_id: i64,
        assignment_id: i64,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::AssignmentId.eq(assignment_id))
            .one(db)
            .await
    }

    /// The user's submissions within a course, newest first.
    pub async fn find_for_user_in_course(
        db: &DatabaseConnection,
        user_id: i64,
        course_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .join(JoinType::InnerJoin, Relation::Assignment.def())
            .join(
                JoinType::InnerJoin,
                super::assignment::Relation::Week.def(),
            )
            .filter(super::week::Column::CourseId.eq(course_id))
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::SubmittedAt)
            .all(db)
            .await
    }

    /// Creates or replaces the submission for (user, assignment).
    pub async fn upsert(
        db: &DatabaseConnection,
        user_id: i64,
        assignment_id: i64,
        content: &str,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        match Self::find_by_user_and_assignment(db, user_id, assignment_id).await? {
            Some(existing) => {
                let mut active: ActiveModel = existing.into();
                active.content = Set(content.to_string());
                active.submitted_at = Set(now);
                active.update(db).await
            }
            None => {
                let active = ActiveModel {
                    user_id: Set(user_id),
                    assignment_id: Set(assignment_id),
                    content: Set(content.to_string()),
                    submitted_at: Set(now),
                    ..Default::default()
                };
                active.insert(db).await
            }
        }
    }

    /// Removes the submission; returns whether a row existed.
    pub async fn delete_by_user_and_assignment(
        db: &DatabaseConnection,
        user_id: i64,
        assignment_id: i64,
    ) -> Result<bool, DbErr> {
        match Self::find_by_user_and_assignment(db, user_id, assignment_id).await? {
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
    use super::Model as Submission;
    use crate::models::assignment::Model as Assignment;
    use crate::models::course::Model as Course;
    use crate::models::user::Model as User;
    use crate::models::week::Model as Week;
    use crate::test_utils::setup_test_db;
    use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

    async fn fixture(db: &DatabaseConnection) -> (User, Assignment) {
        let user = User::upsert_from_github(db, "1", "student", None, None, "tok", None)
            .await
            .unwrap();
        let course = Course::create(db, "cs50x", "CS50x", None).await.unwrap();
        let week = Week::create(db, course.id, 1, "C", None).await.unwrap();
        let assignment = Assignment::create(db, week.id, "hello", "Hello", None)
            .await
            .unwrap();
        (user, assignment)
    }

    #[tokio::test]
    async fn upsert_replaces_rather_than_appends() {
        let db = setup_test_db().await;
        let (user, assignment) = fixture(&db).await;

        let first = Submission::upsert(&db, user.id, assignment.id, "draft").await.unwrap();
        let second = Submission::upsert(&db, user.id, assignment.id, "final").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.content, "final");
        assert!(second.submitted_at >= first.submitted_at);

        let count = super::Entity::find().count(&db).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn course_scoped_lookup_joins_through_weeks() {
        let db = setup_test_db().await;
        let (user, assignment) = fixture(&db).await;

        // A second course the user never submitted to.
        let other = Course::create(&db, "web-dev", "Web Dev", None).await.unwrap();
        let other_week = Week::create(&db, other.id, 1, "HTML", None).await.unwrap();
        Assignment::create(&db, other_week.id, "page", "Page", None).await.unwrap();

        Submission::upsert(&db, user.id, assignment.id, "code").await.unwrap();

        let course_id = Week::find_by_id(&db, assignment.week_id)
            .await
            .unwrap()
            .unwrap()
            .course_id;
        let in_course = Submission::find_for_user_in_course(&db, user.id, course_id)
            .await
            .unwrap();
        assert_eq!(in_course.len(), 1);

        let in_other = Submission::find_for_user_in_course(&db, user.id, other.id)
            .await
            .unwrap();
        assert!(in_other.is_empty());
    }

    #[tokio::test]
    async fn delete_reports_missing_rows() {
        let db = setup_test_db().await;
        let (user, assignment) = fixture(&db).await;

        assert!(
            !Submission::delete_by_user_and_assignment(&db, user.id, assignment.id)
                .await
                .unwrap()
        );
        Submission::upsert(&db, user.id, assignment.id, "x").await.unwrap();
        assert!(
            Submission::delete_by_user_and_assignment(&db, user.id, assignment.id)
                .await
                .unwrap()
        );
    }
}
