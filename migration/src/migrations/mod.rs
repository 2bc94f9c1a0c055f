pub mod m202608260001_create_users;
pub mod m202608260002_create_courses;
pub mod m202608260003_create_weeks;
pub mod m202608260004_create_assignments;
pub mod m202608260005_create_enrollments;
pub mod m202608260006_create_submissions;
pub mod m202608260007_create_workspace_runs;
