use crate::rate_limiter::RequestGate;
use oauth2::{HttpRequest, HttpResponse};
use relaybot_core::{CoreError, RedditApiError};
use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Client, Request, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Sends every outbound request through the rate gate with the bot's user agent.
#[derive(Debug)]
pub struct Dispatcher {
    http_client: Client,
    gate: RequestGate,
    user_agent: HeaderValue,
}

impl Dispatcher {
    pub fn new(user_agent: &str, min_interval: Duration) -> Result<Self, CoreError> {
        let user_agent = HeaderValue::from_str(user_agent).map_err(|_| CoreError::InvalidInput {
            message: format!("user agent is not a valid header value: {:?}", user_agent),
        })?;

        let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http_client,
            gate: RequestGate::new(min_interval),
            user_agent,
        })
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.to_str().unwrap_or_default()
    }

    /// Sleeps until the gate lets the next request out.
    ///
    /// Callers that attach a bearer token wait here before checking the token,
    /// so the token cannot lapse while the request is held back.
    pub async fn wait_for_slot(&self) -> Duration {
        self.gate.wait().await
    }

    /// Sends `request` and maps non-success statuses to typed errors.
    pub async fn dispatch(&mut self, request: Request) -> Result<Response, CoreError> {
        let endpoint = request.url().path().to_string();
        let response = self.send(request).await?;
        check_status(response, &endpoint)
    }

    /// Sends `request` without inspecting the status code.
    pub async fn send(&mut self, mut request: Request) -> Result<Response, CoreError> {
        self.gate.wait().await;

        request
            .headers_mut()
            .insert(USER_AGENT, self.user_agent.clone());

        let method = request.method().clone();
        let endpoint = request.url().path().to_string();
        info!("Making Reddit API request: {} {}", method, endpoint);

        let result = self.http_client.execute(request).await;
        self.gate.mark_dispatched();

        result.map_err(|e| {
            error!("Network error for {} {}: {}", method, endpoint, e);
            if e.is_timeout() {
                CoreError::RedditApi(RedditApiError::RequestTimeout)
            } else {
                CoreError::Network(e)
            }
        })
    }

    /// HTTP function handed to `oauth2` so the token exchange goes through the gate too.
    pub async fn exchange(&mut self, request: HttpRequest) -> Result<HttpResponse, CoreError> {
        let request = self
            .http_client
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .build()?;

        let response = self.send(request).await?;
        let status_code = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        debug!("Token endpoint answered with {}", status_code);

        Ok(HttpResponse {
            status_code,
            headers,
            body,
        })
    }
}

fn check_status(response: Response, endpoint: &str) -> Result<Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        debug!("Request successful: {} {}", status, endpoint);
        return Ok(response);
    }

    error!("Request failed with status: {} for {}", status, endpoint);

    let err = match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        StatusCode::UNAUTHORIZED => RedditApiError::InvalidToken,
        StatusCode::FORBIDDEN => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        StatusCode::NOT_FOUND => RedditApiError::InvalidResponse {
            details: format!("Resource not found: {}", endpoint),
        },
        status if status.is_server_error() => RedditApiError::ServerError {
            status_code: status.as_u16(),
        },
        status => RedditApiError::InvalidResponse {
            details: format!("Unexpected status {} for {}", status, endpoint),
        },
    };

    Err(CoreError::RedditApi(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatcher_creation() {
        let dispatcher = Dispatcher::new("relaybot-test/1.0", Duration::from_secs(2)).unwrap();
        assert_eq!(dispatcher.user_agent(), "relaybot-test/1.0");
        assert_eq!(dispatcher.gate().min_interval(), Duration::from_secs(2));
        assert!(dispatcher.gate().last_dispatch().is_none());
    }

    #[test]
    fn test_invalid_user_agent_rejected() {
        let result = Dispatcher::new("bad\nagent", Duration::ZERO);
        assert!(matches!(result, Err(CoreError::InvalidInput { .. })));
    }
}
