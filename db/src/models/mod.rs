pub mod assignment;
pub mod course;
pub mod enrollment;
pub mod submission;
pub mod user;
pub mod week;
pub mod workspace_run;
