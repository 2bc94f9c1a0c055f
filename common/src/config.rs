//! Global application configuration.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton holding
//! runtime configuration loaded from environment variables. Free accessor
//! functions expose individual values; per-field setters exist so tests can
//! override values without touching the process environment.

use std::env;
use std::sync::{OnceLock, RwLock};

/// The complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub backend_url: String,
    pub frontend_url: String,
    pub session_secret: String,
    pub session_duration_hours: i64,
    pub github_client_id: String,
    pub github_client_secret: String,
    pub github_codespaces_client_id: String,
    pub github_codespaces_client_secret: String,
    pub github_oauth_scopes: String,
    pub github_api_base: String,
    pub github_oauth_base: String,
    pub github_app_id: String,
    pub github_app_private_key: String,
    pub github_app_private_key_path: String,
    pub github_app_installation_id: String,
    pub platform_token: String,
    pub content_dir: String,
    pub codespace_ready_timeout_secs: u64,
    pub codespace_poll_interval_secs: u64,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every field has a development default so the process (and the test
    /// suite) can start without a fully provisioned environment; production
    /// deployments are expected to set the OAuth and session variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env_or("APP_ENV", "development"),
            project_name: env_or("PROJECT_NAME", "course-platform"),
            log_level: env_or("LOG_LEVEL", "api=info"),
            log_file: env_or("LOG_FILE", "api.log"),
            log_to_stdout: env_or("LOG_TO_STDOUT", "false") == "true",
            host: env_or("HOST", "127.0.0.1"),
            port: env_or("PORT", "3000").parse().unwrap_or(3000),
            database_path: env_or("DATABASE_PATH", "data/dev.db"),
            backend_url: env_or("BACKEND_URL", "http://localhost:3000"),
            frontend_url: env_or("FRONTEND_URL", "http://localhost:5173"),
            session_secret: env_or("SESSION_SECRET", "dev-session-secret"),
            session_duration_hours: env_or("SESSION_DURATION_HOURS", "24")
                .parse()
                .unwrap_or(24),
            github_client_id: env_or("GITHUB_CLIENT_ID", ""),
            github_client_secret: env_or("GITHUB_CLIENT_SECRET", ""),
            github_codespaces_client_id: env_or("GITHUB_CODESPACES_CLIENT_ID", ""),
            github_codespaces_client_secret: env_or("GITHUB_CODESPACES_CLIENT_SECRET", ""),
            github_oauth_scopes: env_or("GITHUB_OAUTH_SCOPES", "repo,read:org,codespace"),
            github_api_base: env_or("GITHUB_API_BASE", "https://api.github.com"),
            github_oauth_base: env_or("GITHUB_OAUTH_BASE", "https://github.com/login/oauth"),
            github_app_id: env_or("GITHUB_APP_ID", ""),
            github_app_private_key: env_or("GITHUB_APP_PRIVATE_KEY", ""),
            github_app_private_key_path: env_or(
                "GITHUB_APP_PRIVATE_KEY_PATH",
                "./secrets/github_app_private_key.pem",
            ),
            github_app_installation_id: env_or("GITHUB_APP_INSTALLATION_ID", ""),
            platform_token: env_or("PLATFORM_TOKEN", ""),
            content_dir: env_or("CONTENT_DIR", "content"),
            codespace_ready_timeout_secs: env_or("CODESPACE_READY_TIMEOUT_SECS", "45")
                .parse()
                .unwrap_or(45),
            codespace_poll_interval_secs: env_or("CODESPACE_POLL_INTERVAL_SECS", "2")
                .parse()
                .unwrap_or(2),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Reloads the configuration from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().unwrap();
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter used by the public per-field setters.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_backend_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.backend_url = value.into());
    }

    pub fn set_frontend_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.frontend_url = value.into());
    }

    pub fn set_session_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.session_secret = value.into());
    }

    pub fn set_github_client_id(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.github_client_id = value.into());
    }

    pub fn set_github_client_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.github_client_secret = value.into());
    }

    pub fn set_github_codespaces_client_id(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.github_codespaces_client_id = value.into());
    }

    pub fn set_github_codespaces_client_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.github_codespaces_client_secret = value.into());
    }

    pub fn set_github_oauth_scopes(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.github_oauth_scopes = value.into());
    }

    pub fn set_github_api_base(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.github_api_base = value.into());
    }

    pub fn set_github_oauth_base(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.github_oauth_base = value.into());
    }

    pub fn set_github_app_id(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.github_app_id = value.into());
    }

    pub fn set_platform_token(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.platform_token = value.into());
    }

    pub fn set_content_dir(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.content_dir = value.into());
    }
}

// --- Free accessor functions ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn backend_url() -> String {
    AppConfig::global().backend_url.clone()
}

pub fn frontend_url() -> String {
    AppConfig::global().frontend_url.clone()
}

pub fn session_secret() -> String {
    AppConfig::global().session_secret.clone()
}

pub fn session_duration_hours() -> i64 {
    AppConfig::global().session_duration_hours
}

pub fn github_client_id() -> String {
    AppConfig::global().github_client_id.clone()
}

pub fn github_client_secret() -> String {
    AppConfig::global().github_client_secret.clone()
}

/// Codespaces OAuth client id, falling back to the platform client.
pub fn github_codespaces_client_id() -> String {
    let cfg = AppConfig::global();
    if cfg.github_codespaces_client_id.is_empty() {
        cfg.github_client_id.clone()
    } else {
        cfg.github_codespaces_client_id.clone()
    }
}

/// Codespaces OAuth client secret, falling back to the platform client.
pub fn github_codespaces_client_secret() -> String {
    let cfg = AppConfig::global();
    if cfg.github_codespaces_client_secret.is_empty() {
        cfg.github_client_secret.clone()
    } else {
        cfg.github_codespaces_client_secret.clone()
    }
}

pub fn github_oauth_scopes() -> String {
    AppConfig::global().github_oauth_scopes.clone()
}

pub fn github_api_base() -> String {
    AppConfig::global().github_api_base.clone()
}

pub fn github_oauth_base() -> String {
    AppConfig::global().github_oauth_base.clone()
}

pub fn github_app_id() -> String {
    AppConfig::global().github_app_id.clone()
}

pub fn github_app_private_key() -> String {
    AppConfig::global().github_app_private_key.clone()
}

pub fn github_app_private_key_path() -> String {
    AppConfig::global().github_app_private_key_path.clone()
}

pub fn github_app_installation_id() -> String {
    AppConfig::global().github_app_installation_id.clone()
}

pub fn platform_token() -> String {
    AppConfig::global().platform_token.clone()
}

pub fn content_dir() -> String {
    AppConfig::global().content_dir.clone()
}

pub fn codespace_ready_timeout_secs() -> u64 {
    AppConfig::global().codespace_ready_timeout_secs
}

pub fn codespace_poll_interval_secs() -> u64 {
    AppConfig::global().codespace_poll_interval_secs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn codespaces_client_falls_back_to_platform() {
        AppConfig::reset();
        AppConfig::set_github_client_id("platform-id");
        AppConfig::set_github_codespaces_client_id("");
        assert_eq!(github_codespaces_client_id(), "platform-id");

        AppConfig::set_github_codespaces_client_id("codespaces-id");
        assert_eq!(github_codespaces_client_id(), "codespaces-id");
        AppConfig::reset();
    }
}
