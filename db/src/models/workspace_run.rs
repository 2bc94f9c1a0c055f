use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, QueryOrder, QuerySelect, Set};
use serde::Serialize;

/// Append-only audit/grading record for workspace activity.
///
/// Rows are written by the grading ingest paths (tool reports and GitHub
/// push webhooks) and never updated afterwards.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "workspace_runs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub github_login: Option<String>,
    pub repo_full_name: String,
    pub branch: Option<String>,
    /// Reporting tool, e.g. `check` or `submit`.
    pub tool: String,
    pub status: String,
    pub summary: Option<String>,
    /// Raw result payload as reported; kept verbatim for auditing.
    pub raw_result: Option<Json>,
    pub passed: Option<i32>,
    pub total: Option<i32>,
    pub score: Option<f64>,
    pub max_score: Option<f64>,
    pub commit_sha: Option<String>,
    /// Assignment identifier as reported (slug or legacy `weekN`).
    pub assignment_slug: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("No RelationDef implemented")
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Input for a new run record; everything optional except repo/tool/status.
#[derive(Debug, Default, Clone)]
pub struct NewWorkspaceRun {
    pub github_login: Option<String>,
    pub repo_full_name: String,
    pub branch: Option<String>,
    pub tool: String,
    pub status: String,
    pub summary: Option<String>,
    pub raw_result: Option<Json>,
    pub passed: Option<i32>,
    pub total: Option<i32>,
    pub score: Option<f64>,
    pub max_score: Option<f64>,
    pub commit_sha: Option<String>,
    pub assignment_slug: Option<String>,
}

impl Model {
    /// Appends a run record.
    pub async fn record(db: &DatabaseConnection, run: NewWorkspaceRun) -> Result<Self, DbErr> {
        let active = ActiveModel {
            github_login: Set(run.github_login),
            repo_full_name: Set(run.repo_full_name),
            branch: Set(run.branch),
            tool: Set(run.tool),
            status: Set(run.status),
            summary: Set(run.summary),
            raw_result: Set(run.raw_result),
            passed: Set(run.passed),
            total: Set(run.total),
            score: Set(run.score),
            max_score: Set(run.max_score),
            commit_sha: Set(run.commit_sha),
            assignment_slug: Set(run.assignment_slug),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        active.insert(db).await
    }

    /// Latest `check` run for a repo and reporter.
    pub async fn latest_check(
        db: &DatabaseConnection,
        repo_full_name: &str,
        github_login: Option<&str>,
    ) -> Result<Option<Self>, DbErr> {
        let mut query = Entity::find()
            .filter(Column::RepoFullName.eq(repo_full_name))
            .filter(Column::Tool.eq("check"));
        if let Some(login) = github_login {
            query = query.filter(Column::GithubLogin.eq(login));
        }
        query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .one(db)
            .await
    }

    /// Newest `check` runs for a user, optionally narrowed to one assignment.
    pub async fn list_checks(
        db: &DatabaseConnection,
        github_login: &str,
        assignment_slug: Option<&str>,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        let mut query = Entity::find()
            .filter(Column::GithubLogin.eq(github_login))
            .filter(Column::Tool.eq("check"));
        if let Some(slug) = assignment_slug {
            query = query.filter(Column::AssignmentSlug.eq(slug));
        }
        query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::{Model as WorkspaceRun, NewWorkspaceRun};
    use crate::test_utils::setup_test_db;

    fn check_run(login: &str, slug: &str, score: f64) -> NewWorkspaceRun {
        NewWorkspaceRun {
            github_login: Some(login.into()),
            repo_full_name: format!("{login}/{slug}"),
            tool: "check".into(),
            status: "success".into(),
            score: Some(score),
            max_score: Some(100.0),
            assignment_slug: Some(slug.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn list_checks_filters_and_limits() {
        let db = setup_test_db().await;

        for i in 0..5 {
            WorkspaceRun::record(&db, check_run("alice", "hello", i as f64)).await.unwrap();
        }
        WorkspaceRun::record(&db, check_run("alice", "mario", 90.0)).await.unwrap();
        WorkspaceRun::record(&db, check_run("bob", "hello", 50.0)).await.unwrap();

        let all = WorkspaceRun::list_checks(&db, "alice", None, 50).await.unwrap();
        assert_eq!(all.len(), 6);

        let hello = WorkspaceRun::list_checks(&db, "alice", Some("hello"), 3).await.unwrap();
        assert_eq!(hello.len(), 3);
        assert!(hello.iter().all(|r| r.assignment_slug.as_deref() == Some("hello")));
    }

    #[tokio::test]
    async fn latest_check_picks_the_newest_row() {
        let db = setup_test_db().await;

        WorkspaceRun::record(&db, check_run("alice", "hello", 40.0)).await.unwrap();
        WorkspaceRun::record(&db, check_run("alice", "hello", 80.0)).await.unwrap();

        let latest = WorkspaceRun::latest_check(&db, "alice/hello", Some("alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.score, Some(80.0));
    }
}
