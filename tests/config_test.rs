//! Tests for configuration loading, merging, and validation

use std::io::Write;
use std::time::Duration;

use fanout::config::{Config, ConfigManager, TargetConfig};

#[test]
fn default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    assert_eq!(config.targets.len(), 2);
    assert_eq!(config.targets[0].addr(), "localhost:8000");
    assert_eq!(config.targets[1].addr(), "localhost:8001");
    assert_eq!(config.poll.interval, Duration::from_secs(1));
    assert_eq!(config.poll.read_buffer_size, 8192);
}

#[test]
fn loads_config_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[targets]]
host = "localhost"
port = 9000

[[targets]]
host = "localhost"
port = 9001

[request]
method = "GET"
path = "/health"

[poll]
interval = "250ms"
read_buffer_size = 4096

[logging]
log_level = "debug"
"#
    )
    .unwrap();

    let config = ConfigManager::load_from_file(file.path()).unwrap();

    assert_eq!(config.targets.len(), 2);
    assert_eq!(config.targets[0].port, 9000);
    assert_eq!(config.request.path, "/health");
    assert_eq!(config.poll.interval, Duration::from_millis(250));
    assert_eq!(config.poll.read_buffer_size, 4096);
    assert_eq!(config.logging.log_level, "debug");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let config =
        ConfigManager::load_from_file(std::path::Path::new("/nonexistent/fanout.toml")).unwrap();
    assert_eq!(config.targets.len(), 2);
}

#[test]
fn rejects_invalid_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not valid toml [").unwrap();

    assert!(ConfigManager::load_from_file(file.path()).is_err());
}

#[test]
fn rejects_config_failing_validation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
targets = []

[request]
method = "GET"
path = "/"

[poll]
interval = "1s"
read_buffer_size = 8192

[logging]
log_level = "info"
"#
    )
    .unwrap();

    assert!(ConfigManager::load_from_file(file.path()).is_err());
}

#[test]
fn loads_config_from_environment() {
    std::env::set_var("FANOUT_TARGETS", "127.0.0.1:7000,127.0.0.1:7001");
    std::env::set_var("FANOUT_POLL_INTERVAL", "2s");
    std::env::set_var("FANOUT_READ_BUFFER_SIZE", "1024");

    let config = ConfigManager::load_from_env().unwrap();

    std::env::remove_var("FANOUT_TARGETS");
    std::env::remove_var("FANOUT_POLL_INTERVAL");
    std::env::remove_var("FANOUT_READ_BUFFER_SIZE");

    assert_eq!(config.targets.len(), 2);
    assert_eq!(config.targets[0].port, 7000);
    assert_eq!(config.poll.interval, Duration::from_secs(2));
    assert_eq!(config.poll.read_buffer_size, 1024);
}

#[test]
fn cli_overrides_take_priority() {
    let mut config = Config::default();

    config.merge_with_cli_args(
        &["127.0.0.1:9100".to_string()],
        Some("/ping"),
        Some(Duration::from_millis(50)),
        Some(2048),
    );

    assert_eq!(
        config.targets,
        vec![TargetConfig {
            host: "127.0.0.1".to_string(),
            port: 9100
        }]
    );
    assert_eq!(config.request.path, "/ping");
    assert_eq!(config.poll.interval, Duration::from_millis(50));
    assert_eq!(config.poll.read_buffer_size, 2048);
}

#[test]
fn invalid_cli_targets_are_ignored() {
    let mut config = Config::default();

    config.merge_with_cli_args(&["nonsense".to_string()], None, None, None);

    // The defaults survive a bad override
    assert_eq!(config.targets.len(), 2);
    assert_eq!(config.targets[0].port, 8000);
}

#[test]
fn validation_rejects_empty_target_list() {
    let mut config = Config::default();
    config.targets.clear();
    assert!(config.validate().is_err());
}

#[test]
fn validation_rejects_port_zero() {
    let mut config = Config::default();
    config.targets[0].port = 0;
    assert!(config.validate().is_err());
}

#[test]
fn validation_rejects_relative_request_path() {
    let mut config = Config::default();
    config.request.path = "status".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn validation_bounds_the_read_buffer() {
    let mut config = Config::default();

    config.poll.read_buffer_size = 16;
    assert!(config.validate().is_err());

    config.poll.read_buffer_size = 2 * 1024 * 1024;
    assert!(config.validate().is_err());

    config.poll.read_buffer_size = 8192;
    assert!(config.validate().is_ok());
}

#[test]
fn zero_poll_interval_is_allowed() {
    let mut config = Config::default();
    config.poll.interval = Duration::from_secs(0);
    assert!(config.validate().is_ok());
}
