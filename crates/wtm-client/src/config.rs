//! Configuration loading and resolution.
//!
//! Every value is resolved as: explicit argument, then environment, then default.

use url::Url;
use wtm_core::{WtmError, WtmResult};

pub const DEFAULT_BASE_URL: &str = "https://whatthemovie.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/131.0.0.0 Safari/537.36";

/// Connection settings for a [`crate::HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Site root; relative paths like `/shot/random` are joined onto it.
    pub base_url: Url,
    /// Per-request deadline.
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("valid default URL"),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Resolve from `WTM_BASE_URL`, `WTM_TIMEOUT_MS` and `WTM_USER_AGENT`.
    pub fn from_env() -> WtmResult<Self> {
        Self::resolve(None, None)
    }

    /// Resolve with explicit overrides taking priority over the environment.
    pub fn resolve(base_url: Option<&str>, timeout_ms: Option<u64>) -> WtmResult<Self> {
        let mut config = Self::default();

        if let Some(url) = base_url
            .map(str::to_string)
            .or_else(|| env_var("WTM_BASE_URL"))
        {
            config.base_url = Url::parse(&url)?;
        }

        if let Some(ms) = timeout_ms {
            config.timeout_ms = ms;
        } else if let Some(raw) = env_var("WTM_TIMEOUT_MS") {
            config.timeout_ms = raw.parse().map_err(|_| {
                WtmError::Config(format!("WTM_TIMEOUT_MS is not a number: {raw}"))
            })?;
        }

        if let Some(ua) = env_var("WTM_USER_AGENT") {
            config.user_agent = ua;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Join a site path (or pass through an absolute URL).
    pub fn url(&self, path: &str) -> WtmResult<Url> {
        Ok(self.base_url.join(path)?)
    }
}

/// Account used for `Session::login`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read `WTM_USER` and `WTM_PASSWORD`.
    pub fn from_env() -> WtmResult<Self> {
        let username = env_var("WTM_USER")
            .ok_or_else(|| WtmError::Config("WTM_USER is not set".to_string()))?;
        let password = env_var("WTM_PASSWORD")
            .ok_or_else(|| WtmError::Config("WTM_PASSWORD is not set".to_string()))?;
        Ok(Self { username, password })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
