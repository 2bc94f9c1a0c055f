//! Fetching grading results out of pushed repositories.
//!
//! The check tool leaves its output in `.check50/result.json`; after a push
//! webhook the repo is shallow-cloned at the pushed branch and that file is
//! read back if present.

use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CheckFetchError {
    #[error("git clone failed: {0}")]
    Clone(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Relative path of the result file inside a checked repository.
const RESULT_PATH: &str = ".check50/result.json";

/// Shallow-clones `repo_full_name` at `branch` and reads the check result.
///
/// Returns `Ok(None)` when the repository has no result file. A result file
/// that is not valid JSON is preserved as `{ "parseError": ..., "raw": ... }`
/// so the run record still captures what was found.
pub async fn fetch_check_result(
    repo_full_name: &str,
    branch: &str,
) -> Result<Option<Value>, CheckFetchError> {
    let repo_url = format!("https://github.com/{repo_full_name}.git");
    fetch_check_result_from_url(&repo_url, branch).await
}

/// Same as [`fetch_check_result`] against an explicit clone URL (tests use
/// local paths).
pub async fn fetch_check_result_from_url(
    repo_url: &str,
    branch: &str,
) -> Result<Option<Value>, CheckFetchError> {
    let tmp = tempfile::tempdir()?;
    let target = tmp.path().join("repo");

    let output = Command::new("git")
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg("--branch")
        .arg(branch)
        .arg(repo_url)
        .arg(&target)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(CheckFetchError::Clone(stderr));
    }

    read_check_result(&target)
}

/// Reads and parses the result file from a working tree.
pub fn read_check_result(repo_dir: &Path) -> Result<Option<Value>, CheckFetchError> {
    let result_path = repo_dir.join(RESULT_PATH);
    if !result_path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(&result_path)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(error = %e, "Check result file is not valid JSON");
            Ok(Some(serde_json::json!({
                "parseError": e.to_string(),
                "raw": raw,
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{fetch_check_result_from_url, read_check_result};
    use std::fs;
    use std::process::Command;

    fn git(dir: &std::path::Path, args: &[&str]) {
        let status = Command::new("git")
            .args([
                "-c",
                "user.email=test@example.com",
                "-c",
                "user.name=test",
            ])
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    fn make_repo(with_result: bool) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-b", "main"]);
        if with_result {
            fs::create_dir_all(dir.path().join(".check50")).unwrap();
            fs::write(
                dir.path().join(".check50/result.json"),
                r#"{ "passed": 7, "total": 10 }"#,
            )
            .unwrap();
        } else {
            fs::write(dir.path().join("README.md"), "hi\n").unwrap();
        }
        git(dir.path(), &["add", "."]);
        git(dir.path(), &["commit", "-m", "init"]);
        dir
    }

    #[tokio::test]
    async fn clone_and_read_finds_the_result() {
        let repo = make_repo(true);
        let url = repo.path().to_string_lossy().to_string();

        let result = fetch_check_result_from_url(&url, "main").await.unwrap();
        let value = result.unwrap();
        assert_eq!(value["passed"], 7);
        assert_eq!(value["total"], 10);
    }

    #[tokio::test]
    async fn repository_without_result_yields_none() {
        let repo = make_repo(false);
        let url = repo.path().to_string_lossy().to_string();

        let result = fetch_check_result_from_url(&url, "main").await.unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn malformed_json_is_preserved_for_auditing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".check50")).unwrap();
        fs::write(dir.path().join(".check50/result.json"), "not json").unwrap();

        let value = read_check_result(dir.path()).unwrap().unwrap();
        assert_eq!(value["raw"], "not json");
        assert!(value.get("parseError").is_some());
    }
}
