//! Offline content seeder.
//!
//! Scans `{CONTENT_DIR}` for course directories and creates any missing
//! courses, weeks and assignments from their front-matter markdown files.
//! Idempotent; safe to re-run after every content update.
//!
//! Usage: `cargo run --bin seed [course_slug]`

use api::services::content::{seed_all, seed_course};
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let db = db::connect().await;
    let content_dir = PathBuf::from(common::config::content_dir());

    match std::env::args().nth(1) {
        Some(slug) => match seed_course(&db, &content_dir, &slug).await {
            Ok(course) => println!("Seeded course '{}' (id {})", course.slug, course.id),
            Err(e) => {
                eprintln!("Seeding '{slug}' failed: {e}");
                std::process::exit(1);
            }
        },
        None => match seed_all(&db, &content_dir).await {
            Ok(count) => println!("Seeded {count} course(s) from {}", content_dir.display()),
            Err(e) => {
                eprintln!("Seeding failed: {e}");
                std::process::exit(1);
            }
        },
    }
}
