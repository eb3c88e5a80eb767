use crate::config::{Config, ConfigError};
use rstest::rstest;
use serial_test::serial;
use specgen_ai::DEFAULT_MODEL;
use std::env;
use std::path::PathBuf;

const VARS: [&str; 5] = [
    "SPECGEN_DB_PATH",
    "SPECGEN_MAX_CONNECTIONS",
    "ANTHROPIC_API_KEY",
    "ANTHROPIC_MODEL",
    "SPECGEN_AI_BASE_URL",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_config_from_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.db_path, specgen_core::database_file());
    assert_eq!(config.max_connections, 5);
    assert_eq!(config.anthropic_api_key, None);
    assert_eq!(config.anthropic_model, DEFAULT_MODEL);
    assert_eq!(config.ai_base_url, None);
}

#[test]
#[serial]
fn test_config_from_env_with_all_custom() {
    clear_env();
    env::set_var("SPECGEN_DB_PATH", "/tmp/specgen-test.db");
    env::set_var("SPECGEN_MAX_CONNECTIONS", "2");
    env::set_var("ANTHROPIC_API_KEY", "sk-test");
    env::set_var("ANTHROPIC_MODEL", "claude-test");
    env::set_var("SPECGEN_AI_BASE_URL", "http://localhost:8080");

    let config = Config::from_env().unwrap();

    assert_eq!(config.db_path, PathBuf::from("/tmp/specgen-test.db"));
    assert_eq!(config.max_connections, 2);
    assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.anthropic_model, "claude-test");
    assert_eq!(config.ai_base_url.as_deref(), Some("http://localhost:8080"));

    let storage = config.storage_config();
    assert_eq!(storage.path, PathBuf::from("/tmp/specgen-test.db"));
    assert_eq!(storage.max_connections, 2);
    assert!(storage.enable_wal);

    let ai = config.ai_service();
    assert!(ai.has_api_key());
    assert_eq!(ai.model(), "claude-test");

    clear_env();
}

#[test]
#[serial]
fn test_config_blank_api_key_is_ignored() {
    clear_env();
    env::set_var("ANTHROPIC_API_KEY", "  ");

    let config = Config::from_env().unwrap();
    assert_eq!(config.anthropic_api_key, None);

    clear_env();
}

#[test]
#[serial]
fn test_config_invalid_max_connections() {
    clear_env();
    env::set_var("SPECGEN_MAX_CONNECTIONS", "lots");

    let result = Config::from_env();

    assert!(matches!(
        result.unwrap_err(),
        ConfigError::InvalidMaxConnections(_)
    ));

    clear_env();
}

#[rstest]
#[case("0")]
#[case("101")]
#[serial]
fn test_config_max_connections_out_of_range(#[case] value: &str) {
    clear_env();
    env::set_var("SPECGEN_MAX_CONNECTIONS", value);

    let result = Config::from_env();

    assert!(matches!(
        result.unwrap_err(),
        ConfigError::MaxConnectionsOutOfRange(_)
    ));

    clear_env();
}

#[test]
#[serial]
fn test_config_empty_db_path() {
    clear_env();
    env::set_var("SPECGEN_DB_PATH", " ");

    assert!(matches!(
        Config::from_env().unwrap_err(),
        ConfigError::EmptyDatabasePath
    ));

    clear_env();
}
