use relaybot_core::{BotConfig, ConfigError, ErrorExt};
use std::io::Write;

#[test]
fn test_load_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "username: bot\npassword: pw\naccess_token: id\nclient_secret: secret\nsubreddits: [gifs]\ndomain_whitelist: [i.imgur.com]"
    )
    .unwrap();

    let config = BotConfig::load(file.path()).unwrap();
    assert_eq!(config.subreddits, vec!["gifs"]);
    assert_eq!(config.domain_whitelist, vec!["i.imgur.com"]);
}

#[test]
fn test_missing_file() {
    let err = BotConfig::load("/definitely/not/here/bot.yml").unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}

#[test]
fn test_unreadable_path_is_not_reported_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = BotConfig::load(dir.path()).unwrap_err();

    assert!(matches!(err, ConfigError::Read { .. }));
    assert_eq!(err.error_code(), "CONFIG_READ_FAILED");
}

#[test]
fn test_non_utf8_file_is_read_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0xff, 0xfe, 0x00, 0x80]).unwrap();

    let err = BotConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
