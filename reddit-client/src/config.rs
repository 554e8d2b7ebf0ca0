use relaybot_core::BotConfig;
use std::fmt;
use std::time::Duration;

pub const REDDIT_AUTH_BASE: &str = "https://www.reddit.com";
pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

/// Credentials and connection settings for a script-type Reddit app.
#[derive(Clone)]
pub struct RedditOAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    pub auth_base_url: String,
    pub api_base_url: String,
    /// Minimum gap between the end of one request and the start of the next.
    pub min_request_interval: Duration,
}

impl RedditOAuth2Config {
    pub fn new(
        client_id: String,
        client_secret: String,
        username: String,
        password: String,
        user_agent: String,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            username,
            password,
            user_agent,
            auth_base_url: REDDIT_AUTH_BASE.to_string(),
            api_base_url: REDDIT_API_BASE.to_string(),
            min_request_interval: Duration::from_secs(2),
        }
    }

    pub fn from_bot_config(config: &BotConfig) -> Self {
        Self::new(
            config.client_id.clone(),
            config.client_secret.clone(),
            config.username.clone(),
            config.password.clone(),
            config.user_agent.clone(),
        )
        .with_min_request_interval(Duration::from_secs(config.request_interval_secs))
    }

    /// Points both the token endpoint and the API at other hosts.
    pub fn with_base_urls(mut self, auth_base_url: String, api_base_url: String) -> Self {
        self.auth_base_url = auth_base_url.trim_end_matches('/').to_string();
        self.api_base_url = api_base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/api/v1/authorize", self.auth_base_url)
    }

    pub fn token_url(&self) -> String {
        format!("{}/api/v1/access_token", self.auth_base_url)
    }

    pub fn api_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_base_url, endpoint)
    }
}

impl fmt::Debug for RedditOAuth2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditOAuth2Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("auth_base_url", &self.auth_base_url)
            .field("api_base_url", &self.api_base_url)
            .field("min_request_interval", &self.min_request_interval)
            .finish()
    }
}
