//! GitHub App authentication: short-lived app JWTs and installation tokens.
//!
//! Installation tokens let server-side jobs (webhook clones, repo setup)
//! act on repositories without borrowing a user's OAuth token.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::Serialize;
use serde_json::Value;

use super::{GithubClient, GithubError};

#[derive(Debug, Serialize)]
struct AppJwtClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

/// Loads the app private key from `GITHUB_APP_PRIVATE_KEY`, falling back to
/// the PEM file at `GITHUB_APP_PRIVATE_KEY_PATH`.
fn private_key_pem() -> Result<String, GithubError> {
    let inline = common::config::github_app_private_key();
    if !inline.is_empty() {
        // Env vars flatten newlines; restore them for PEM parsing.
        return Ok(inline.replace("\\n", "\n"));
    }

    let path = common::config::github_app_private_key_path();
    std::fs::read_to_string(&path)
        .map_err(|e| GithubError::AppAuth(format!("cannot read private key at {path}: {e}")))
}

/// Creates a signed RS256 JWT identifying the GitHub App itself.
///
/// `iat` is backdated 60 seconds to absorb clock drift; GitHub caps the
/// lifetime at 10 minutes, so 9 is used.
pub fn create_app_jwt() -> Result<String, GithubError> {
    let app_id = common::config::github_app_id();
    if app_id.is_empty() {
        return Err(GithubError::AppAuth("GITHUB_APP_ID is not set".into()));
    }

    let pem = private_key_pem()?;
    let key = EncodingKey::from_rsa_pem(pem.as_bytes())
        .map_err(|e| GithubError::AppAuth(format!("invalid RSA private key: {e}")))?;

    let now = Utc::now().timestamp();
    let claims = AppJwtClaims {
        iat: now - 60,
        exp: now + 9 * 60,
        iss: app_id,
    };

    encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| GithubError::AppAuth(format!("app JWT signing failed: {e}")))
}

impl GithubClient {
    /// Looks up the installation id covering a repository.
    pub async fn repo_installation_id(
        &self,
        app_jwt: &str,
        owner: &str,
        repo: &str,
    ) -> Result<i64, GithubError> {
        let resp = self
            .http()
            .get(self.api_url(&format!("/repos/{owner}/{repo}/installation")))
            .bearer_auth(app_jwt)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        match resp.status().as_u16() {
            404 => Err(GithubError::RepoNotFound),
            s if !resp.status().is_success() => Err(GithubError::Api {
                status: s,
                body: resp.text().await.unwrap_or_default(),
            }),
            _ => {
                let body: Value = resp.json().await?;
                body.get("id")
                    .and_then(Value::as_i64)
                    .ok_or(GithubError::AppAuth(
                        "installation lookup returned no id".into(),
                    ))
            }
        }
    }

    /// Mints an installation access token.
    pub async fn create_installation_token(
        &self,
        app_jwt: &str,
        installation_id: i64,
    ) -> Result<String, GithubError> {
        let resp = self
            .http()
            .post(self.api_url(&format!(
                "/app/installations/{installation_id}/access_tokens"
            )))
            .bearer_auth(app_jwt)
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
        body.get("token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(GithubError::AppAuth(
                "installation token response carried no token".into(),
            ))
    }

    /// Resolves an installation token for a repository.
    ///
    /// An explicitly configured `GITHUB_APP_INSTALLATION_ID` wins; otherwise
    /// the installation is discovered through the repository.
    pub async fn installation_token_for_repo(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<String, GithubError> {
        let app_jwt = create_app_jwt()?;

        let configured = common::config::github_app_installation_id();
        let installation_id = if let Ok(id) = configured.parse::<i64>() {
            id
        } else {
            self.repo_installation_id(&app_jwt, owner, repo).await?
        };

        self.create_installation_token(&app_jwt, installation_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::create_app_jwt;
    use common::config::AppConfig;
    use serial_test::serial;

    #[test]
    #[serial]
    fn missing_app_id_is_a_configuration_error() {
        AppConfig::reset();
        AppConfig::set_github_app_id("");
        let err = create_app_jwt().unwrap_err();
        assert!(err.to_string().contains("configuration"));
    }
}
