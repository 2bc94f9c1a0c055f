use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202608260001_create_users::Migration),
            Box::new(migrations::m202608260002_create_courses::Migration),
            Box::new(migrations::m202608260003_create_weeks::Migration),
            Box::new(migrations::m202608260004_create_assignments::Migration),
            Box::new(migrations::m202608260005_create_enrollments::Migration),
            Box::new(migrations::m202608260006_create_submissions::Migration),
            Box::new(migrations::m202608260007_create_workspace_runs::Migration),
        ]
    }
}
