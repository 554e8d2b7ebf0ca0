use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit API error: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    /// True when a dedup write hit an id that is already recorded.
    pub fn is_duplicate_item(&self) -> bool {
        matches!(self, CoreError::Database(DatabaseError::DuplicateItem { .. }))
    }
}

/// Error kinds reported in the `errors` list of a submit or comment response.
///
/// Anything Reddit sends that is not listed here decodes to [`ApiErrorKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    BadCaptcha,
    RateLimit,
    AlreadySubmitted,
    SubredditNotFound,
    SubredditNotAllowed,
    NoUrl,
    BadUrl,
    UserRequired,
    Other(String),
}

impl ApiErrorKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "BAD_CAPTCHA" => ApiErrorKind::BadCaptcha,
            "RATELIMIT" => ApiErrorKind::RateLimit,
            "ALREADY_SUB" => ApiErrorKind::AlreadySubmitted,
            "SUBREDDIT_NOEXIST" => ApiErrorKind::SubredditNotFound,
            "SUBREDDIT_NOTALLOWED" => ApiErrorKind::SubredditNotAllowed,
            "NO_URL" => ApiErrorKind::NoUrl,
            "BAD_URL" => ApiErrorKind::BadUrl,
            "USER_REQUIRED" => ApiErrorKind::UserRequired,
            other => ApiErrorKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ApiErrorKind::BadCaptcha => "BAD_CAPTCHA",
            ApiErrorKind::RateLimit => "RATELIMIT",
            ApiErrorKind::AlreadySubmitted => "ALREADY_SUB",
            ApiErrorKind::SubredditNotFound => "SUBREDDIT_NOEXIST",
            ApiErrorKind::SubredditNotAllowed => "SUBREDDIT_NOTALLOWED",
            ApiErrorKind::NoUrl => "NO_URL",
            ApiErrorKind::BadUrl => "BAD_URL",
            ApiErrorKind::UserRequired => "USER_REQUIRED",
            ApiErrorKind::Other(kind) => kind,
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },

    #[error("Submission rejected ({kind}): {message}")]
    SubmissionRejected { kind: ApiErrorKind, message: String },
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Migration failed: {migration}")]
    MigrationFailed { migration: String },

    #[error("Item already recorded: {id}")]
    DuplicateItem { id: String },

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] serde_yaml::Error),
}
