//! Configuration Types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub targets: Vec<TargetConfig>,
    pub request: RequestConfig,
    pub poll: PollConfig,
    pub logging: LoggingConfig,
}

/// One outbound connection target
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TargetConfig {
    pub host: String,
    pub port: u16,
}

impl TargetConfig {
    /// Render as a `host:port` address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Request payload configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestConfig {
    pub method: String,
    pub path: String,
}

/// Poll loop configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollConfig {
    /// Timeout for each readiness check over the live connection set
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Size of the buffer used for each bounded drain read
    pub read_buffer_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets: vec![
                TargetConfig {
                    host: "localhost".to_string(),
                    port: 8000,
                },
                TargetConfig {
                    host: "localhost".to_string(),
                    port: 8001,
                },
            ],
            request: RequestConfig {
                method: "GET".to_string(),
                path: "/".to_string(),
            },
            poll: PollConfig {
                interval: Duration::from_secs(1),
                read_buffer_size: 8192,
            },
            logging: LoggingConfig {
                log_level: "info".to_string(),
            },
        }
    }
}
