use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202608260007_create_workspace_runs"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("workspace_runs"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("github_login")).string().null())
                    .col(ColumnDef::new(Alias::new("repo_full_name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("branch")).string().null())
                    .col(ColumnDef::new(Alias::new("tool")).string().not_null())
                    .col(ColumnDef::new(Alias::new("status")).string().not_null())
                    .col(ColumnDef::new(Alias::new("summary")).string().null())
                    .col(ColumnDef::new(Alias::new("raw_result")).json().null())
                    .col(ColumnDef::new(Alias::new("passed")).integer().null())
                    .col(ColumnDef::new(Alias::new("total")).integer().null())
                    .col(ColumnDef::new(Alias::new("score")).double().null())
                    .col(ColumnDef::new(Alias::new("max_score")).double().null())
                    .col(ColumnDef::new(Alias::new("commit_sha")).string().null())
                    .col(ColumnDef::new(Alias::new("assignment_slug")).string().null())
                    .col(ColumnDef::new(Alias::new("created_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_workspace_runs_login_tool")
                    .table(Alias::new("workspace_runs"))
                    .col(Alias::new("github_login"))
                    .col(Alias::new("tool"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("workspace_runs")).to_owned())
            .await
    }
}
