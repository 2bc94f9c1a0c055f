pub mod checks;
pub mod content;
pub mod github;
pub mod grading;
