use crate::auth::{AuthState, Authenticator, RedditToken};
use crate::config::RedditOAuth2Config;
use crate::dispatcher::Dispatcher;
use relaybot_core::{CoreError, Item, RedditApiError};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    pub author: String,
    pub subreddit: String,
    pub url: String,
    pub permalink: String,
    pub score: i64,
    pub over_18: bool,
    pub is_self: bool,
    pub domain: String,
}

/// Authenticated, rate-limited access to the handful of Reddit endpoints the bot uses.
///
/// All mutable client state (the bearer token and the time of the last request)
/// lives here and is only touched through `&mut self`.
pub struct RedditClient {
    config: RedditOAuth2Config,
    dispatcher: Dispatcher,
    authenticator: Authenticator,
}

impl RedditClient {
    pub fn new(config: RedditOAuth2Config) -> Result<Self, CoreError> {
        let dispatcher = Dispatcher::new(&config.user_agent, config.min_request_interval)?;
        let authenticator = Authenticator::new(&config)?;

        Ok(Self {
            config,
            dispatcher,
            authenticator,
        })
    }

    pub fn config(&self) -> &RedditOAuth2Config {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticator.is_authenticated()
    }

    pub fn needs_refresh(&self) -> bool {
        self.authenticator.needs_refresh()
    }

    pub fn get_auth_state(&self) -> AuthState {
        self.authenticator.get_auth_state()
    }

    pub fn token(&self) -> Option<&RedditToken> {
        self.authenticator.token()
    }

    pub fn set_token(&mut self, token: RedditToken) {
        self.authenticator.set_token(token);
    }

    /// Exchanges credentials for a token unless the current one is still valid.
    pub async fn ensure_authenticated(&mut self) -> Result<(), CoreError> {
        self.authenticator
            .ensure_valid_token(&mut self.dispatcher)
            .await?;
        Ok(())
    }

    pub async fn get(&mut self, endpoint: &str) -> Result<Response, CoreError> {
        self.send_authenticated(Method::GET, endpoint, None).await
    }

    pub async fn post_form(
        &mut self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<Response, CoreError> {
        self.send_authenticated(Method::POST, endpoint, Some(form))
            .await
    }

    async fn send_authenticated(
        &mut self,
        method: Method,
        endpoint: &str,
        form: Option<&[(&str, &str)]>,
    ) -> Result<Response, CoreError> {
        self.dispatcher.wait_for_slot().await;
        let token = self
            .authenticator
            .ensure_valid_token(&mut self.dispatcher)
            .await?
            .to_string();

        let mut request_builder = self
            .dispatcher
            .http_client()
            .request(method, self.config.api_url(endpoint))
            .header(AUTHORIZATION, format!("bearer {}", token));

        if let Some(form) = form {
            request_builder = request_builder.form(form);
        }

        let request = request_builder.build()?;
        self.dispatcher.dispatch(request).await
    }

    /// Fetches the hot listing of `subreddit`, in listing order.
    pub async fn fetch_listing(&mut self, subreddit: &str) -> Result<Vec<Item>, CoreError> {
        let endpoint = format!("/r/{}/hot", subreddit);
        let response = self.get(&endpoint).await?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            })
        })?;

        info!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            subreddit
        );

        let items = listing
            .data
            .children
            .into_iter()
            .map(|child| Item::from(child.data))
            .collect::<Vec<_>>();
        debug!("Decoded {} items from r/{}", items.len(), subreddit);
        Ok(items)
    }
}

impl From<RedditPostData> for Item {
    fn from(post_data: RedditPostData) -> Self {
        Self {
            id: post_data.id,
            domain: post_data.domain,
            subreddit: post_data.subreddit,
            author: post_data.author,
            permalink: post_data.permalink,
            title: post_data.title,
            url: post_data.url,
            score: post_data.score,
            is_adult: post_data.over_18,
            is_self_post: post_data.is_self,
        }
    }
}
