#![allow(dead_code)]

use async_trait::async_trait;
use database::Database;
use reddit_client::{RedditClient, RedditOAuth2Config};
use relay_service::ChallengeResolver;
use relaybot_core::{CoreError, Item};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Answers captchas from a fixed script and remembers which ids it was shown.
pub struct ScriptedResolver {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
}

impl ScriptedResolver {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            asked: Vec::new(),
        }
    }
}

#[async_trait]
impl ChallengeResolver for ScriptedResolver {
    async fn resolve(&mut self, captcha_id: &str) -> Result<String, CoreError> {
        self.asked.push(captcha_id.to_string());
        self.answers.pop_front().ok_or_else(|| CoreError::InvalidInput {
            message: "no scripted captcha answers left".to_string(),
        })
    }
}

pub fn test_client(server: &MockServer) -> RedditClient {
    let config = RedditOAuth2Config::new(
        "test_client_id".to_string(),
        "test_client_secret".to_string(),
        "test_user".to_string(),
        "test_pass".to_string(),
        "relaybot-test/1.0".to_string(),
    )
    .with_base_urls(server.uri(), server.uri())
    .with_min_request_interval(Duration::ZERO);

    RedditClient::new(config).unwrap()
}

pub async fn temp_database() -> Database {
    let path = std::env::temp_dir().join(format!("test_relay_{}.db", uuid::Uuid::new_v4()));
    Database::open(path.to_str().unwrap()).await.unwrap()
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "token_type": "bearer",
            "expires_in": 3600,
            "scope": "*"
        })))
        .mount(server)
        .await;
}

pub fn post(id: &str, domain: &str, score: i64) -> Value {
    json!({"kind": "t3", "data": {
        "id": id,
        "title": format!("Title of {}", id),
        "author": "someone",
        "subreddit": "gifs",
        "url": format!("https://{}/{}.gif", domain, id),
        "permalink": format!("/r/gifs/comments/{}/title/", id),
        "score": score,
        "over_18": false,
        "is_self": false,
        "domain": domain
    }})
}

pub async fn mount_listing(server: &MockServer, subreddit: &str, posts: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/r/{}/hot", subreddit)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Listing",
            "data": {"after": null, "before": null, "children": posts}
        })))
        .mount(server)
        .await;
}

pub fn created(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "json": {"errors": [], "data": {
            "url": format!("https://www.reddit.com/comments/{}/", id),
            "id": id,
            "name": format!("t3_{}", id)
        }}
    }))
}

pub fn bad_captcha(next_captcha: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "json": {
            "captcha": next_captcha,
            "errors": [["BAD_CAPTCHA", "care to try these again?", "captcha"]]
        }
    }))
}

pub async fn mount_comment_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/comment.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"json": {"errors": []}})))
        .mount(server)
        .await;
}

pub async fn count_requests(server: &MockServer, endpoint: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == endpoint)
        .count()
}

pub fn sample_item() -> Item {
    Item {
        id: "abc".to_string(),
        domain: "i.imgur.com".to_string(),
        subreddit: "gifs".to_string(),
        author: "someone".to_string(),
        permalink: "/r/gifs/comments/abc/title/".to_string(),
        title: "Title".to_string(),
        url: "https://i.imgur.com/abc.gif".to_string(),
        score: 10,
        is_adult: false,
        is_self_post: false,
    }
}
