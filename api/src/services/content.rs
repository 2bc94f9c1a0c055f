//! Offline course-content seeding.
//!
//! Course material lives outside the API as a directory of markdown files
//! with front-matter metadata:
//!
//! ```text
//! {CONTENT_DIR}/{course_slug}/
//!   course.md          # course title/description
//!   week1/
//!     index.md         # week title/description
//!     hello.md         # assignment; slug defaults to the file stem
//! ```
//!
//! Seeding is idempotent and runs out-of-band (the `seed` binary), never
//! inside a request handler.

use db::models::{assignment::Model as Assignment, course::Model as Course, week::Model as Week};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{DatabaseConnection, DbErr};
use std::path::Path;
use tracing::{info, warn};

static WEEK_DIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^week(\d+)$").expect("valid regex"));

/// Metadata parsed from a markdown front-matter block.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
}

/// Parses a `---`-delimited front-matter block of `key: value` lines.
///
/// Unknown keys are ignored; a file without a block yields an empty result.
pub fn parse_front_matter(text: &str) -> FrontMatter {
    let mut matter = FrontMatter::default();

    let mut lines = text.lines();
    if lines.next().map(str::trim) != Some("---") {
        return matter;
    }

    for line in lines {
        let line = line.trim();
        if line == "---" {
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().trim_matches('"').to_string();
        match key.trim() {
            "title" => matter.title = Some(value),
            "description" => matter.description = Some(value),
            "slug" => matter.slug = Some(value),
            _ => {}
        }
    }

    matter
}

fn read_front_matter(path: &Path) -> FrontMatter {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_front_matter(&text),
        Err(_) => FrontMatter::default(),
    }
}

/// Seeds one course from `{content_dir}/{slug}`.
///
/// Existing rows are left untouched; only missing weeks and assignments are
/// created. Returns the course row.
pub async fn seed_course(
    db: &DatabaseConnection,
    content_dir: &Path,
    slug: &str,
) -> Result<Course, DbErr> {
    let course_dir = content_dir.join(slug);
    let meta = read_front_matter(&course_dir.join("course.md"));

    let course = match Course::find_by_slug(db, slug).await? {
        Some(existing) => existing,
        None => {
            let title = meta.title.clone().unwrap_or_else(|| slug.to_string());
            Course::create(db, slug, &title, meta.description.as_deref()).await?
        }
    };

    let mut week_dirs: Vec<(i32, std::path::PathBuf)> = Vec::new();
    let entries = match std::fs::read_dir(&course_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(slug, error = %e, "Course content directory is unreadable");
            return Ok(course);
        }
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some(caps) = WEEK_DIR.captures(&name) {
            if entry.path().is_dir() {
                if let Ok(number) = caps[1].parse::<i32>() {
                    week_dirs.push((number, entry.path()));
                }
            }
        }
    }
    week_dirs.sort_by_key(|(number, _)| *number);

    for (number, dir) in week_dirs {
        let week_meta = read_front_matter(&dir.join("index.md"));
        let title = week_meta
            .title
            .unwrap_or_else(|| format!("Week {number}"));
        let week = Week::ensure(db, course.id, number, &title, week_meta.description.as_deref())
            .await?;

        seed_week_assignments(db, &week, &dir).await?;
    }

    info!(slug, course_id = course.id, "Seeded course content");
    Ok(course)
}

async fn seed_week_assignments(
    db: &DatabaseConnection,
    week: &Week,
    dir: &Path,
) -> Result<(), DbErr> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(()),
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some("index") | None => continue,
            Some(stem) => stem.to_string(),
        };

        let meta = read_front_matter(&path);
        let slug = meta.slug.unwrap_or(stem);
        if Assignment::find_by_slug(db, &slug).await?.is_some() {
            continue;
        }
        let title = meta.title.unwrap_or_else(|| slug.clone());
        Assignment::create(db, week.id, &slug, &title, meta.description.as_deref()).await?;
    }

    Ok(())
}

/// Seeds every course directory under `content_dir`.
pub async fn seed_all(db: &DatabaseConnection, content_dir: &Path) -> Result<usize, DbErr> {
    let mut seeded = 0;
    let entries = match std::fs::read_dir(content_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %content_dir.display(), error = %e, "Content directory is unreadable");
            return Ok(0);
        }
    };

    for entry in entries.flatten() {
        if !entry.path().is_dir() {
            continue;
        }
        let slug = entry.file_name().to_string_lossy().to_string();
        seed_course(db, content_dir, &slug).await?;
        seeded += 1;
    }

    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::{parse_front_matter, seed_course};
    use db::models::{
        assignment::Model as Assignment, course::Model as Course, week::Model as Week,
    };
    use db::test_utils::setup_test_db;
    use std::fs;

    #[test]
    fn front_matter_parses_known_keys() {
        let text = "---\ntitle: Hello, World\ndescription: \"First program\"\nslug: hello\nextra: ignored\n---\n# Body\n";
        let matter = parse_front_matter(text);
        assert_eq!(matter.title.as_deref(), Some("Hello, World"));
        assert_eq!(matter.description.as_deref(), Some("First program"));
        assert_eq!(matter.slug.as_deref(), Some("hello"));
    }

    #[test]
    fn missing_front_matter_is_empty() {
        assert_eq!(parse_front_matter("# Just markdown\n"), Default::default());
    }

    fn write(path: &std::path::Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn seeding_creates_weeks_and_assignments() {
        let db = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        write(
            &root.join("cs50x/course.md"),
            "---\ntitle: CS50x\ndescription: Intro to CS\n---\n",
        );
        write(
            &root.join("cs50x/week1/index.md"),
            "---\ntitle: C\n---\n",
        );
        write(
            &root.join("cs50x/week1/hello.md"),
            "---\ntitle: Hello\ndescription: First C program\n---\n",
        );
        write(&root.join("cs50x/week2/mario.md"), "# no front matter\n");

        let course = seed_course(&db, root, "cs50x").await.unwrap();
        assert_eq!(course.title, "CS50x");

        let weeks = Week::find_for_course(&db, course.id).await.unwrap();
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].title, "C");
        assert_eq!(weeks[1].title, "Week 2");

        let hello = Assignment::find_by_slug(&db, "hello").await.unwrap().unwrap();
        assert_eq!(hello.description.as_deref(), Some("First C program"));
        assert!(Assignment::find_by_slug(&db, "mario").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn reseeding_is_idempotent() {
        let db = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        write(&root.join("cs50x/course.md"), "---\ntitle: CS50x\n---\n");
        write(&root.join("cs50x/week1/hello.md"), "---\ntitle: Hello\n---\n");

        let first = seed_course(&db, root, "cs50x").await.unwrap();
        let second = seed_course(&db, root, "cs50x").await.unwrap();
        assert_eq!(first.id, second.id);

        let weeks = Week::find_for_course(&db, first.id).await.unwrap();
        assert_eq!(weeks.len(), 1);
    }

    #[tokio::test]
    async fn missing_content_directory_still_creates_the_stub() {
        let db = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();

        let course = seed_course(&db, dir.path(), "ghost").await.unwrap();
        assert_eq!(course.slug, "ghost");
        assert_eq!(course.title, "ghost");
        assert!(Course::find_by_slug(&db, "ghost").await.unwrap().is_some());
    }
}
