//! Bot configuration file.
//!
//! The file is YAML. Keys are lower-case; the capitalised spellings written by
//! older deployments (`Username`, `Subreddits`, ...) are accepted as aliases.

use crate::error::ConfigError;
use crate::types::Destination;
use serde::Deserialize;
use std::io;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "rust:relaybot:v0.1.0";
pub const DEFAULT_MIN_SCORE: i64 = 5;
pub const DEFAULT_REQUEST_INTERVAL_SECS: u64 = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(alias = "Username")]
    pub username: String,

    #[serde(alias = "Password")]
    pub password: String,

    /// OAuth client id. Named `access_token` in the file for compatibility.
    #[serde(rename = "access_token", alias = "AccessToken")]
    pub client_id: String,

    #[serde(alias = "ClientSecret")]
    pub client_secret: String,

    #[serde(default, alias = "Subreddits")]
    pub subreddits: Vec<String>,

    #[serde(default, alias = "DomainWhitelist")]
    pub domain_whitelist: Vec<String>,

    #[serde(default = "default_destinations")]
    pub destinations: Vec<Destination>,

    #[serde(default = "default_min_score")]
    pub min_score: i64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_request_interval_secs")]
    pub request_interval_secs: u64,

    /// Ask Reddit whether a captcha is needed before the first submission.
    #[serde(default)]
    pub preflight_captcha: bool,
}

fn default_destinations() -> Vec<Destination> {
    vec![
        Destination::new("maybemaybeoriginal"),
        Destination::with_title("maybemaybemaybe", "Maybe Maybe Maybe"),
    ]
}

fn default_min_score() -> i64 {
    DEFAULT_MIN_SCORE
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_interval_secs() -> u64 {
    DEFAULT_REQUEST_INTERVAL_SECS
}

impl BotConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::Read {
                path: path.display().to_string(),
                source: e,
            },
        })?;

        let config = Self::from_yaml(&contents)?;
        debug!(
            "Loaded config from {}: {} subreddits, {} whitelisted domains",
            path.display(),
            config.subreddits.len(),
            config.domain_whitelist.len()
        );
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: BotConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("username", &self.username),
            ("password", &self.password),
            ("access_token", &self.client_id),
            ("client_secret", &self.client_secret),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                });
            }
        }

        if self.subreddits.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "at least one subreddit must be configured".to_string(),
            });
        }

        if self.destinations.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "at least one destination must be configured".to_string(),
            });
        }

        if let Some(dest) = self.destinations.iter().find(|d| d.subreddit.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "destinations".to_string(),
                value: format!("{:?}", dest),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"
username: bot_account
password: hunter2
access_token: client-id
client_secret: client-secret
subreddits:
  - maybemaybemaybe
  - wtf
domain_whitelist:
  - i.imgur.com
  - gfycat.com
"#;

    #[test]
    fn test_legacy_config_gets_defaults() {
        let config = BotConfig::from_yaml(LEGACY).unwrap();

        assert_eq!(config.username, "bot_account");
        assert_eq!(config.client_id, "client-id");
        assert_eq!(config.subreddits, vec!["maybemaybemaybe", "wtf"]);
        assert_eq!(config.min_score, DEFAULT_MIN_SCORE);
        assert_eq!(config.request_interval_secs, 2);
        assert!(!config.preflight_captcha);
        assert_eq!(config.destinations.len(), 2);
        assert_eq!(config.destinations[0].title, None);
        assert_eq!(
            config.destinations[1].title.as_deref(),
            Some("Maybe Maybe Maybe")
        );
    }

    #[test]
    fn test_capitalised_aliases() {
        let yaml = r#"
Username: bot_account
Password: hunter2
AccessToken: client-id
ClientSecret: client-secret
Subreddits: [pics]
DomainWhitelist: [i.redd.it]
"#;
        let config = BotConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.client_secret, "client-secret");
        assert_eq!(config.domain_whitelist, vec!["i.redd.it"]);
    }

    #[test]
    fn test_explicit_destinations() {
        let yaml = format!(
            "{}\ndestinations:\n  - subreddit: mirror\nmin_score: 0\n",
            LEGACY
        );
        let config = BotConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.destinations, vec![Destination::new("mirror")]);
        assert_eq!(config.min_score, 0);
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let yaml = LEGACY.replace("password: hunter2", "password: \"\"");
        let err = BotConfig::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field } if field == "password"));
    }

    #[test]
    fn test_empty_subreddits_rejected() {
        let yaml = r#"
username: a
password: b
access_token: c
client_secret: d
"#;
        let err = BotConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { .. }));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = BotConfig::from_yaml("username: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
