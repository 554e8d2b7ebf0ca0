use crate::config::RedditOAuth2Config;
use crate::dispatcher::Dispatcher;
use oauth2::basic::{BasicClient, BasicErrorResponse};
use oauth2::{
    AuthUrl, ClientId, ClientSecret, RequestTokenError, ResourceOwnerPassword,
    ResourceOwnerUsername, TokenResponse, TokenUrl,
};
use relaybot_core::{CoreError, RedditApiError};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }
}

#[derive(Debug, Clone)]
pub enum AuthState {
    NotAuthenticated,
    Authenticated { expires_at: SystemTime },
    TokenExpired { expired_at: SystemTime },
}

/// Holds the bearer token and renews it with the password grant when it lapses.
pub struct Authenticator {
    oauth_client: BasicClient,
    username: ResourceOwnerUsername,
    password: ResourceOwnerPassword,
    token: Option<RedditToken>,
}

impl Authenticator {
    pub fn new(config: &RedditOAuth2Config) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(config.authorize_url()).map_err(|e| CoreError::InvalidInput {
            message: format!("Invalid authorize URL: {}", e),
        })?;
        let token_url = TokenUrl::new(config.token_url()).map_err(|e| CoreError::InvalidInput {
            message: format!("Invalid token URL: {}", e),
        })?;

        // BasicClient sends the client id/secret as HTTP basic auth.
        let oauth_client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            auth_url,
            Some(token_url),
        );

        Ok(Self {
            oauth_client,
            username: ResourceOwnerUsername::new(config.username.clone()),
            password: ResourceOwnerPassword::new(config.password.clone()),
            token: None,
        })
    }

    pub fn token(&self) -> Option<&RedditToken> {
        self.token.as_ref()
    }

    pub fn set_token(&mut self, token: RedditToken) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(&self.token, Some(token) if !token.is_expired())
    }

    pub fn needs_refresh(&self) -> bool {
        matches!(&self.token, Some(token) if token.is_expired())
    }

    pub fn get_auth_state(&self) -> AuthState {
        match &self.token {
            None => AuthState::NotAuthenticated,
            Some(token) if token.is_expired() => AuthState::TokenExpired {
                expired_at: token.expires_at,
            },
            Some(token) => AuthState::Authenticated {
                expires_at: token.expires_at,
            },
        }
    }

    /// Returns a bearer token that has not expired, exchanging credentials first if needed.
    pub async fn ensure_valid_token(
        &mut self,
        dispatcher: &mut Dispatcher,
    ) -> Result<&str, CoreError> {
        if !self.is_authenticated() {
            if self.needs_refresh() {
                debug!("Access token expired, refreshing");
            }
            self.refresh(dispatcher).await?;
        }

        self.token
            .as_ref()
            .map(|token| token.access_token.as_str())
            .ok_or_else(|| CoreError::Internal {
                message: "token missing after successful exchange".to_string(),
            })
    }

    async fn refresh(&mut self, dispatcher: &mut Dispatcher) -> Result<(), CoreError> {
        info!("Requesting access token for /u/{}", self.username.as_str());

        let response = self
            .oauth_client
            .exchange_password(&self.username, &self.password)
            .request_async(move |request| dispatcher.exchange(request))
            .await
            .map_err(token_error)?;

        let lifetime = response.expires_in().unwrap_or_else(|| {
            warn!(
                "Token response carried no expires_in, assuming {:?}",
                DEFAULT_TOKEN_LIFETIME
            );
            DEFAULT_TOKEN_LIFETIME
        });
        let scope = response
            .scopes()
            .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();

        self.token = Some(RedditToken {
            access_token: response.access_token().secret().clone(),
            expires_at: SystemTime::now() + lifetime,
            scope,
        });

        debug!("Access token valid for {:?}", lifetime);
        Ok(())
    }
}

fn token_error(err: RequestTokenError<CoreError, BasicErrorResponse>) -> CoreError {
    let reason = match err {
        RequestTokenError::ServerResponse(response) => response.to_string(),
        RequestTokenError::Request(e) => return e,
        RequestTokenError::Parse(e, _) => format!("malformed token response: {}", e),
        RequestTokenError::Other(message) => message,
    };
    CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RedditOAuth2Config {
        RedditOAuth2Config::new(
            "test_client_id".to_string(),
            "test_client_secret".to_string(),
            "test_user".to_string(),
            "test_pass".to_string(),
            "relaybot-test/1.0".to_string(),
        )
    }

    #[test]
    fn test_initial_state() {
        let auth = Authenticator::new(&config()).unwrap();
        assert!(!auth.is_authenticated());
        assert!(!auth.needs_refresh());
        assert!(matches!(auth.get_auth_state(), AuthState::NotAuthenticated));
    }

    #[test]
    fn test_token_expiry_states() {
        let mut auth = Authenticator::new(&config()).unwrap();

        auth.set_token(RedditToken {
            access_token: "valid".to_string(),
            expires_at: SystemTime::now() + Duration::from_secs(600),
            scope: vec!["*".to_string()],
        });
        assert!(auth.is_authenticated());
        assert!(matches!(auth.get_auth_state(), AuthState::Authenticated { .. }));

        auth.set_token(RedditToken {
            access_token: "stale".to_string(),
            expires_at: SystemTime::now() - Duration::from_secs(1),
            scope: vec![],
        });
        assert!(!auth.is_authenticated());
        assert!(auth.needs_refresh());
        assert!(matches!(auth.get_auth_state(), AuthState::TokenExpired { .. }));

        auth.clear_token();
        assert!(matches!(auth.get_auth_state(), AuthState::NotAuthenticated));
    }

    #[test]
    fn test_token_expiring_now_counts_as_expired() {
        let token = RedditToken {
            access_token: "edge".to_string(),
            expires_at: SystemTime::now(),
            scope: vec![],
        };
        assert!(token.is_expired());
    }

    #[test]
    fn test_token_serialization() {
        let token = RedditToken {
            access_token: "test_access_token".to_string(),
            expires_at: SystemTime::UNIX_EPOCH + Duration::from_secs(1640995200),
            scope: vec!["*".to_string()],
        };

        let serialized = serde_json::to_string(&token).unwrap();
        assert!(serialized.contains("test_access_token"));

        let deserialized: RedditToken = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.access_token, token.access_token);
        assert_eq!(deserialized.expires_at, token.expires_at);
        assert_eq!(deserialized.scope, token.scope);
    }
}
