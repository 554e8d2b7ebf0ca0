use relaybot_core::{
    ApiErrorKind, ConfigError, CoreError, DatabaseError, ErrorExt, ErrorReporter, RedditApiError,
};

#[test]
fn test_error_codes() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert_eq!(reddit_error.error_code(), "REDDIT_API");

    let db_error = CoreError::Database(DatabaseError::DuplicateItem {
        id: "abc".to_string(),
    });
    assert_eq!(db_error.error_code(), "DATABASE");

    let config_error = CoreError::Config(ConfigError::MissingField {
        field: "username".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");
}

#[test]
fn test_duplicate_item_detection() {
    let duplicate = CoreError::from(DatabaseError::DuplicateItem {
        id: "abc".to_string(),
    });
    assert!(duplicate.is_duplicate_item());

    let other = CoreError::from(RedditApiError::RequestTimeout);
    assert!(!other.is_duplicate_item());
}

#[test]
fn test_api_error_kind_parsing() {
    assert_eq!(ApiErrorKind::parse("BAD_CAPTCHA"), ApiErrorKind::BadCaptcha);
    assert_eq!(ApiErrorKind::parse("RATELIMIT"), ApiErrorKind::RateLimit);
    assert_eq!(
        ApiErrorKind::parse("SOMETHING_NEW"),
        ApiErrorKind::Other("SOMETHING_NEW".to_string())
    );
    assert_eq!(ApiErrorKind::AlreadySubmitted.to_string(), "ALREADY_SUB");
}

#[test]
fn test_user_friendly_messages() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    let message = reddit_error.user_friendly_message();
    assert!(message.contains("authentication token is invalid"));

    let rejected = CoreError::RedditApi(RedditApiError::SubmissionRejected {
        kind: ApiErrorKind::AlreadySubmitted,
        message: "that link has already been submitted".to_string(),
    });
    assert!(rejected.user_friendly_message().contains("ALREADY_SUB"));

    let config_error = CoreError::Config(ConfigError::MissingField {
        field: "client_secret".to_string(),
    });
    assert!(config_error.user_friendly_message().contains("client_secret"));
}

#[test]
fn test_error_reporter() {
    let reporter = ErrorReporter::new()
        .with_error_reporting(true)
        .with_warning_reporting(true);
    let error = CoreError::RedditApi(RedditApiError::InvalidToken);

    // This test just ensures the methods don't panic
    reporter.report_error(&error);
    reporter.report_warning(&error);
}
