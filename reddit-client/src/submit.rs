//! Link submission, comments and the captcha endpoints.

use crate::api::RedditClient;
use relaybot_core::{ApiErrorKind, CoreError, Item, RedditApiError};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};

/// One attempt at submitting a link post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitLinkRequest {
    pub subreddit: String,
    pub title: String,
    pub url: String,
    pub captcha_id: Option<String>,
    pub captcha_response: Option<String>,
}

impl SubmitLinkRequest {
    pub fn for_item(item: &Item, subreddit: &str) -> Self {
        Self {
            subreddit: subreddit.to_string(),
            title: item.title.clone(),
            url: item.url.clone(),
            captcha_id: None,
            captcha_response: None,
        }
    }

    /// The same request answering the captcha `captcha_id` with `response`.
    pub fn with_captcha(&self, captcha_id: &str, response: &str) -> Self {
        Self {
            captcha_id: Some(captcha_id.to_string()),
            captcha_response: Some(response.to_string()),
            ..self.clone()
        }
    }

    fn form(&self) -> Vec<(&str, &str)> {
        let mut form = vec![
            ("api_type", "json"),
            ("kind", "link"),
            ("extension", "json"),
            ("sr", self.subreddit.as_str()),
            ("title", self.title.as_str()),
            ("url", self.url.as_str()),
        ];

        // Reddit only looks at the captcha pair when both halves are present.
        if let (Some(iden), Some(answer)) = (&self.captcha_id, &self.captcha_response) {
            if !iden.is_empty() && !answer.is_empty() {
                form.push(("iden", iden.as_str()));
                form.push(("captcha", answer.as_str()));
            }
        }

        form
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedPost {
    pub id: String,
    /// Fullname (`t3_...`) used as the parent of follow-up comments.
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(SubmittedPost),
    ChallengeRequired { captcha_id: String },
}

/// One entry of the `errors` array, sent by Reddit as `[kind, message, field]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<Value>")]
pub struct ApiErrorEntry {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl From<Vec<Value>> for ApiErrorEntry {
    fn from(parts: Vec<Value>) -> Self {
        let text = |index: usize| {
            parts
                .get(index)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            kind: ApiErrorKind::parse(&text(0)),
            message: text(1),
        }
    }
}

impl From<ApiErrorEntry> for CoreError {
    fn from(entry: ApiErrorEntry) -> Self {
        CoreError::RedditApi(RedditApiError::SubmissionRejected {
            kind: entry.kind,
            message: entry.message,
        })
    }
}

#[derive(Debug, Deserialize)]
struct JsonEnvelope<T> {
    json: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    #[serde(default)]
    captcha: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
    #[serde(default)]
    data: Option<SubmitData>,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    #[serde(default)]
    url: String,
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CommentResponse {
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct NewCaptchaResponse {
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
    #[serde(default)]
    data: Option<NewCaptchaData>,
}

#[derive(Debug, Deserialize)]
struct NewCaptchaData {
    iden: String,
}

impl SubmitResponse {
    pub(crate) fn into_outcome(self) -> Result<SubmitOutcome, CoreError> {
        if self
            .errors
            .iter()
            .any(|entry| entry.kind == ApiErrorKind::BadCaptcha)
        {
            let captcha_id = self
                .captcha
                .filter(|iden| !iden.is_empty())
                .ok_or_else(|| {
                    CoreError::RedditApi(RedditApiError::InvalidResponse {
                        details: "BAD_CAPTCHA without a captcha id".to_string(),
                    })
                })?;
            return Ok(SubmitOutcome::ChallengeRequired { captcha_id });
        }

        if let Some(entry) = self.errors.into_iter().next() {
            return Err(entry.into());
        }

        match self.data {
            Some(data) => Ok(SubmitOutcome::Created(SubmittedPost {
                id: data.id,
                name: data.name,
                url: data.url,
            })),
            None => Err(CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: "submit response carried neither errors nor post data".to_string(),
            })),
        }
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, CoreError> {
    let envelope: JsonEnvelope<T> = response.json().await.map_err(|e| {
        error!("Failed to parse {} response: {}", what, e);
        CoreError::RedditApi(RedditApiError::InvalidResponse {
            details: format!("Failed to parse {} response", what),
        })
    })?;
    Ok(envelope.json)
}

impl RedditClient {
    /// Submits a link post. A captcha demand is returned as an outcome, not an error.
    pub async fn submit_link(
        &mut self,
        request: &SubmitLinkRequest,
    ) -> Result<SubmitOutcome, CoreError> {
        debug!(
            "Submitting {} to r/{} (captcha: {})",
            request.url,
            request.subreddit,
            request.captcha_id.is_some()
        );
        let response = self.post_form("/api/submit.json", &request.form()).await?;
        let submit: SubmitResponse = decode_json(response, "submit").await?;
        let outcome = submit.into_outcome()?;

        if let SubmitOutcome::Created(post) = &outcome {
            info!("Created post {} in r/{}", post.name, request.subreddit);
        }
        Ok(outcome)
    }

    /// Posts `text` as a comment on the thing named `parent_name`.
    pub async fn submit_comment(&mut self, parent_name: &str, text: &str) -> Result<(), CoreError> {
        let form = [("api_type", "json"), ("text", text), ("thing_id", parent_name)];
        let response = self.post_form("/api/comment.json", &form).await?;
        let comment: CommentResponse = decode_json(response, "comment").await?;

        if let Some(entry) = comment.errors.into_iter().next() {
            return Err(entry.into());
        }

        debug!("Commented on {}", parent_name);
        Ok(())
    }

    pub async fn needs_captcha(&mut self) -> Result<bool, CoreError> {
        let response = self.get("/api/needs_captcha").await?;
        let body = response.text().await?;
        Ok(body.trim() == "true")
    }

    /// Asks Reddit for a fresh captcha and returns its id.
    pub async fn new_captcha(&mut self) -> Result<String, CoreError> {
        let response = self
            .post_form("/api/new_captcha", &[("api_type", "json")])
            .await?;
        let captcha: NewCaptchaResponse = decode_json(response, "new_captcha").await?;

        if let Some(entry) = captcha.errors.into_iter().next() {
            return Err(entry.into());
        }

        captcha
            .data
            .map(|data| data.iden)
            .filter(|iden| !iden.is_empty())
            .ok_or_else(|| {
                CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: "new_captcha response carried no iden".to_string(),
                })
            })
    }
}
