//! GitHub OAuth: authorize-URL construction, code exchange, profile fetch.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use url::Url;

use super::{GithubClient, GithubError};

/// Which registered OAuth application a flow runs against.
///
/// The codespaces variant exists because workspace provisioning may use a
/// separate OAuth app with the `codespace` scope; its credentials fall back
/// to the platform app when unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientVariant {
    #[default]
    Platform,
    Codespaces,
}

impl ClientVariant {
    pub fn client_id(&self) -> String {
        match self {
            ClientVariant::Platform => common::config::github_client_id(),
            ClientVariant::Codespaces => common::config::github_codespaces_client_id(),
        }
    }

    pub fn client_secret(&self) -> String {
        match self {
            ClientVariant::Platform => common::config::github_client_secret(),
            ClientVariant::Codespaces => common::config::github_codespaces_client_secret(),
        }
    }
}

/// The OAuth `state` payload, round-tripped through GitHub and mirrored in
/// the `oauth_state` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OauthState {
    pub nonce: String,
    pub return_to: Option<String>,
    #[serde(default)]
    pub client: ClientVariant,
}

impl OauthState {
    /// Builds a fresh state with a random nonce.
    pub fn new(return_to: Option<String>, client: ClientVariant) -> Self {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self {
            nonce: hex::encode(bytes),
            return_to,
            client,
        }
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("OauthState serialization cannot fail")
    }

    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Compares the callback state against the cookie mirror.
    ///
    /// A mismatch is logged but not enforced; the session cookie may be
    /// missing when the flow started in another tab or the cookie expired.
    pub fn verify_nonce(&self, cookie_state: Option<&str>) {
        match cookie_state.and_then(Self::decode) {
            Some(mirror) if mirror.nonce == self.nonce => {}
            Some(_) => warn!("OAuth state nonce mismatch between callback and cookie"),
            None => warn!("OAuth callback arrived without a readable state cookie"),
        }
    }
}

/// Public profile fields extracted from `GET /user`.
#[derive(Debug, Clone)]
pub struct GithubProfile {
    pub id: i64,
    pub login: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// Builds the GitHub authorize URL for the given state.
pub fn authorize_url(state: &OauthState) -> String {
    let base = common::config::github_oauth_base();
    let mut url = Url::parse(&format!("{base}/authorize"))
        .expect("GITHUB_OAUTH_BASE must be a valid URL");
    url.query_pairs_mut()
        .append_pair("client_id", &state.client.client_id())
        .append_pair(
            "redirect_uri",
            &format!("{}/auth/github/callback", common::config::backend_url()),
        )
        .append_pair("scope", &common::config::github_oauth_scopes())
        .append_pair("state", &state.encode())
        .append_pair("allow_signup", "false");
    url.to_string()
}

impl GithubClient {
    /// Exchanges an OAuth code for an access token.
    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        variant: ClientVariant,
    ) -> Result<String, GithubError> {
        let resp = self
            .http()
            .post(self.oauth_url("/access_token"))
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "client_id": variant.client_id(),
                "client_secret": variant.client_secret(),
                "code": code,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(GithubError::AuthExchange(format!(
                "token endpoint answered {status}"
            )));
        }

        let body: Value = resp.json().await?;
        if let Some(token) = body.get("access_token").and_then(Value::as_str) {
            return Ok(token.to_string());
        }

        let reason = body
            .get("error_description")
            .or_else(|| body.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("no access token in response")
            .to_string();
        Err(GithubError::AuthExchange(reason))
    }

    /// Fetches the authenticated user's profile.
    pub async fn fetch_user(&self, token: &str) -> Result<GithubProfile, GithubError> {
        let resp = self
            .http()
            .get(self.api_url("/user"))
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(GithubError::ProfileInvalid);
        }

        let body: Value = resp.json().await?;
        let id = body
            .get("id")
            .and_then(Value::as_i64)
            .ok_or(GithubError::ProfileInvalid)?;
        let login = body
            .get("login")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(GithubProfile {
            id,
            login,
            email: body
                .get("email")
                .and_then(Value::as_str)
                .map(str::to_string),
            avatar_url: body
                .get("avatar_url")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    /// Reads the scopes actually granted to a token.
    ///
    /// GitHub reports them in the `x-oauth-scopes` response header; fine-
    /// grained tokens omit the header entirely.
    pub async fn token_scopes(&self, token: &str) -> Result<Option<String>, GithubError> {
        let resp = self
            .http()
            .get(self.api_url("/"))
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        Ok(resp
            .headers()
            .get("x-oauth-scopes")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientVariant, OauthState, authorize_url};
    use common::config::AppConfig;
    use serial_test::serial;

    #[test]
    fn state_round_trips_with_nonce_intact() {
        let state = OauthState::new(Some("/courses/cs50x".into()), ClientVariant::Codespaces);
        let decoded = OauthState::decode(&state.encode()).unwrap();
        assert_eq!(decoded.nonce, state.nonce);
        assert_eq!(decoded.return_to.as_deref(), Some("/courses/cs50x"));
        assert_eq!(decoded.client, ClientVariant::Codespaces);
    }

    #[test]
    fn nonces_are_unique_per_state() {
        let a = OauthState::new(None, ClientVariant::Platform);
        let b = OauthState::new(None, ClientVariant::Platform);
        assert_ne!(a.nonce, b.nonce);
        assert_eq!(a.nonce.len(), 32);
    }

    #[test]
    #[serial]
    fn authorize_url_carries_redirect_and_scopes() {
        AppConfig::reset();
        AppConfig::set_github_client_id("abc123");
        AppConfig::set_backend_url("http://localhost:3000");

        let state = OauthState::new(None, ClientVariant::Platform);
        let url = authorize_url(&state);
        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("client_id=abc123"));
        assert!(url.contains("allow_signup=false"));
        assert!(url.contains("auth%2Fgithub%2Fcallback"));
        AppConfig::reset();
    }
}
