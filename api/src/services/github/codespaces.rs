//! Codespace workspace provisioning.
//!
//! The provision flow is lookup → readiness-wait → create. GitHub's
//! descriptor payloads have carried the browser URL under several names over
//! time, so resolution goes through [`web_url`] everywhere.

use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use super::{GithubClient, GithubError};

/// Outcome of a provision call.
#[derive(Debug, Clone, PartialEq)]
pub enum Provisioned {
    /// The workspace is reachable at this URL.
    Ready(String),
    /// Created but not yet reachable; the raw descriptor is returned so the
    /// caller can surface its state to the client.
    Pending(Value),
}

/// Resolves the browser URL from a codespace descriptor.
///
/// Aliases are tried in fixed priority order; the first non-empty string
/// wins.
pub fn web_url(descriptor: &Value) -> Option<String> {
    for key in ["html_url", "web_url", "url", "access_url"] {
        if let Some(url) = descriptor.get(key).and_then(Value::as_str) {
            if !url.is_empty() {
                return Some(url.to_string());
            }
        }
    }
    None
}

impl GithubClient {
    /// Lists the user's codespaces.
    pub async fn list_codespaces(&self, token: &str) -> Result<Vec<Value>, GithubError> {
        let resp = self
            .http()
            .get(self.api_url("/user/codespaces"))
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(GithubError::Api {
                status,
                body: resp.text().await.unwrap_or_default(),
            });
        }

        let body: Value = resp.json().await?;
        Ok(body
            .get("codespaces")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Finds the user's codespace for an exact `owner/repo`.
    pub async fn find_codespace(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Option<Value>, GithubError> {
        let wanted = format!("{owner}/{repo}");
        let codespaces = self.list_codespaces(token).await?;

        Ok(codespaces.into_iter().find(|cs| {
            let repository = cs.get("repository");
            let full_name = repository
                .and_then(|r| r.get("full_name"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| {
                    // Older payloads split owner and name.
                    let owner = repository
                        .and_then(|r| r.get("owner"))
                        .and_then(|o| o.get("login"))
                        .and_then(Value::as_str)?;
                    let name = repository.and_then(|r| r.get("name")).and_then(Value::as_str)?;
                    Some(format!("{owner}/{name}"))
                });
            full_name.as_deref() == Some(wanted.as_str())
        }))
    }

    /// Fetches one codespace descriptor by name.
    pub async fn get_codespace(&self, token: &str, name: &str) -> Result<Value, GithubError> {
        let resp = self
            .http()
            .get(self.api_url(&format!("/user/codespaces/{name}")))
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(GithubError::Api {
                status,
                body: resp.text().await.unwrap_or_default(),
            });
        }

        Ok(resp.json().await?)
    }

    /// Polls a codespace until it reports a web URL.
    pub async fn wait_for_ready(
        &self,
        token: &str,
        name: &str,
        timeout: Duration,
        interval: Duration,
    ) -> Result<String, GithubError> {
        let deadline = Instant::now() + timeout;

        loop {
            let descriptor = self.get_codespace(token, name).await?;
            if let Some(url) = web_url(&descriptor) {
                return Ok(url);
            }
            if Instant::now() >= deadline {
                return Err(GithubError::ProvisioningTimeout);
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Creates a codespace on a repository.
    pub async fn create_codespace(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        git_ref: Option<&str>,
    ) -> Result<Value, GithubError> {
        let mut body = serde_json::Map::new();
        if let Some(r) = git_ref {
            body.insert("ref".into(), Value::String(r.to_string()));
        }

        let resp = self
            .http()
            .post(self.api_url(&format!("/repos/{owner}/{repo}/codespaces")))
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .json(&Value::Object(body))
            .send()
            .await?;

        match resp.status().as_u16() {
            403 => Err(GithubError::Forbidden),
            404 => Err(GithubError::RepoNotFound),
            s if !resp.status().is_success() => {
                let body = resp.text().await.unwrap_or_default();
                warn!(status = s, %body, "Codespace creation rejected");
                Err(GithubError::Api { status: s, body })
            }
            _ => Ok(resp.json().await?),
        }
    }

    /// Resolves a usable workspace for `owner/repo`.
    ///
    /// 1. Reuse: an existing codespace that already carries a web URL is
    ///    returned immediately.
    /// 2. Readiness-wait: an existing codespace without a URL is polled;
    ///    on timeout the flow falls through to creation, treating the stuck
    ///    workspace as unusable.
    /// 3. Create: a fresh descriptor with a URL is `Ready`, otherwise the
    ///    descriptor is returned as `Pending` without waiting.
    ///
    /// Lookup failures are logged and fall through to creation.
    pub async fn provision(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        branch: Option<&str>,
        ready_wait: Duration,
        poll_interval: Duration,
    ) -> Result<Provisioned, GithubError> {
        match self.find_codespace(token, owner, repo).await {
            Ok(Some(existing)) => {
                if let Some(url) = web_url(&existing) {
                    info!(repo = %format!("{owner}/{repo}"), "Reusing ready codespace");
                    return Ok(Provisioned::Ready(url));
                }

                if let Some(name) = existing.get("name").and_then(Value::as_str) {
                    match self
                        .wait_for_ready(token, name, ready_wait, poll_interval)
                        .await
                    {
                        Ok(url) => return Ok(Provisioned::Ready(url)),
                        Err(GithubError::ProvisioningTimeout) => {
                            warn!(name, "Codespace never became ready; creating a new one");
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Codespace lookup failed; attempting creation");
            }
        }

        let created = self.create_codespace(token, owner, repo, branch).await?;
        match web_url(&created) {
            Some(url) => Ok(Provisioned::Ready(url)),
            None => Ok(Provisioned::Pending(created)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Provisioned, web_url};
    use crate::services::github::{GithubClient, GithubError};
    use axum::extract::State;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone)]
    struct Stub {
        existing: Option<Value>,
        poll_response: Option<Value>,
        created: Value,
        create_calls: Arc<AtomicUsize>,
    }

    /// Serves a fake GitHub API on an ephemeral local port.
    async fn spawn_stub(stub: Stub) -> String {
        let app = Router::new()
            .route(
                "/user/codespaces",
                get(|State(s): State<Stub>| async move {
                    let list: Vec<Value> = s.existing.clone().into_iter().collect();
                    Json(json!({ "total_count": list.len(), "codespaces": list }))
                }),
            )
            .route(
                "/user/codespaces/{name}",
                get(|State(s): State<Stub>| async move {
                    Json(s.poll_response.clone().unwrap_or(json!({})))
                }),
            )
            .route(
                "/repos/{owner}/{repo}/codespaces",
                post(|State(s): State<Stub>| async move {
                    s.create_calls.fetch_add(1, Ordering::SeqCst);
                    Json(s.created.clone())
                }),
            )
            .with_state(stub);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base: &str) -> GithubClient {
        GithubClient::new(base, base)
    }

    #[test]
    fn web_url_alias_priority_is_fixed() {
        let descriptor = json!({
            "access_url": "https://d.example",
            "url": "https://c.example",
            "web_url": "https://b.example",
            "html_url": "https://a.example",
        });
        assert_eq!(web_url(&descriptor).as_deref(), Some("https://a.example"));

        let fallback = json!({ "html_url": "", "access_url": "https://d.example" });
        assert_eq!(web_url(&fallback).as_deref(), Some("https://d.example"));

        assert_eq!(web_url(&json!({})), None);
    }

    #[tokio::test]
    async fn ready_codespace_short_circuits_creation() {
        let create_calls = Arc::new(AtomicUsize::new(0));
        let base = spawn_stub(Stub {
            existing: Some(json!({
                "name": "fluffy-disco",
                "web_url": "https://fluffy-disco.github.dev",
                "repository": { "full_name": "alice/hello" },
            })),
            poll_response: None,
            created: json!({}),
            create_calls: create_calls.clone(),
        })
        .await;

        let result = client(&base)
            .provision(
                "tok",
                "alice",
                "hello",
                None,
                Duration::from_millis(100),
                Duration::from_millis(10),
            )
            .await
            .unwrap();

        assert_eq!(
            result,
            Provisioned::Ready("https://fluffy-disco.github.dev".into())
        );
        assert_eq!(create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn readiness_timeout_falls_through_to_create() {
        let create_calls = Arc::new(AtomicUsize::new(0));
        let base = spawn_stub(Stub {
            existing: Some(json!({
                "name": "stuck-machine",
                "repository": { "full_name": "alice/hello" },
            })),
            // Never reports a URL.
            poll_response: Some(json!({ "name": "stuck-machine", "state": "Queued" })),
            created: json!({ "html_url": "https://fresh.github.dev" }),
            create_calls: create_calls.clone(),
        })
        .await;

        let result = client(&base)
            .provision(
                "tok",
                "alice",
                "hello",
                None,
                Duration::from_millis(50),
                Duration::from_millis(10),
            )
            .await
            .unwrap();

        assert_eq!(result, Provisioned::Ready("https://fresh.github.dev".into()));
        assert_eq!(create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn creation_without_url_is_pending() {
        let create_calls = Arc::new(AtomicUsize::new(0));
        let base = spawn_stub(Stub {
            existing: None,
            poll_response: None,
            created: json!({ "name": "brand-new", "state": "Provisioning" }),
            create_calls: create_calls.clone(),
        })
        .await;

        let result = client(&base)
            .provision(
                "tok",
                "alice",
                "hello",
                Some("main"),
                Duration::from_millis(50),
                Duration::from_millis(10),
            )
            .await
            .unwrap();

        match result {
            Provisioned::Pending(descriptor) => {
                assert_eq!(descriptor["name"], "brand-new");
            }
            other => panic!("expected pending, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn forbidden_creation_maps_to_forbidden() {
        let app = Router::new().route(
            "/repos/{owner}/{repo}/codespaces",
            post(|| async { axum::http::StatusCode::FORBIDDEN }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let err = client(&format!("http://{addr}"))
            .create_codespace("tok", "alice", "private", None)
            .await
            .unwrap_err();
        assert!(matches!(err, GithubError::Forbidden));
    }

    #[tokio::test]
    async fn find_codespace_matches_split_owner_and_name() {
        let base = spawn_stub(Stub {
            existing: Some(json!({
                "name": "legacy-shape",
                "repository": { "owner": { "login": "alice" }, "name": "hello" },
            })),
            poll_response: None,
            created: json!({}),
            create_calls: Arc::new(AtomicUsize::new(0)),
        })
        .await;

        let found = client(&base)
            .find_codespace("tok", "alice", "hello")
            .await
            .unwrap();
        assert!(found.is_some());

        let missing = client(&base)
            .find_codespace("tok", "alice", "other")
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
