//! Configuration Manager

use super::{Config, TargetConfig};
use crate::Result;
use anyhow::{bail, Context};
use std::path::Path;
use std::time::Duration;

/// Manages configuration loading and validation
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Config> {
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            config
                .validate()
                .with_context(|| "Configuration validation failed")?;

            tracing::info!("Configuration loaded and validated successfully");
            Ok(config)
        } else {
            tracing::warn!(
                "Configuration file not found at {}, using defaults",
                path.display()
            );
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Config> {
        let mut config = Config::default();

        if let Ok(targets) = std::env::var("FANOUT_TARGETS") {
            config.targets = parse_target_list(&targets)
                .with_context(|| format!("Invalid FANOUT_TARGETS: {}", targets))?;
        }

        if let Ok(path) = std::env::var("FANOUT_REQUEST_PATH") {
            config.request.path = path;
        }

        if let Ok(interval) = std::env::var("FANOUT_POLL_INTERVAL") {
            config.poll.interval = humantime::parse_duration(&interval)
                .with_context(|| format!("Invalid FANOUT_POLL_INTERVAL: {}", interval))?;
        }

        if let Ok(buffer_size) = std::env::var("FANOUT_READ_BUFFER_SIZE") {
            config.poll.read_buffer_size = buffer_size
                .parse::<usize>()
                .with_context(|| format!("Invalid FANOUT_READ_BUFFER_SIZE: {}", buffer_size))?;
        }

        if let Ok(log_level) = std::env::var("FANOUT_LOG_LEVEL") {
            config.logging.log_level = log_level;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parse a comma-separated `host:port,host:port` target list
pub fn parse_target_list(raw: &str) -> Result<Vec<TargetConfig>> {
    raw.split(',')
        .map(|entry| TargetConfig::parse(entry.trim()))
        .collect()
}

impl TargetConfig {
    /// Parse a single `host:port` pair
    pub fn parse(raw: &str) -> Result<Self> {
        let (host, port) = raw
            .rsplit_once(':')
            .with_context(|| format!("Target '{}' is not in host:port form", raw))?;

        if host.is_empty() {
            bail!("Target '{}' has an empty host", raw);
        }

        let port = port
            .parse::<u16>()
            .with_context(|| format!("Target '{}' has an invalid port", raw))?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.validate_targets()
            .with_context(|| "Target configuration validation failed")?;

        self.validate_request()
            .with_context(|| "Request configuration validation failed")?;

        self.validate_poll()
            .with_context(|| "Poll configuration validation failed")?;

        self.validate_logging()
            .with_context(|| "Logging configuration validation failed")?;

        Ok(())
    }

    /// Validate the target list
    fn validate_targets(&self) -> Result<()> {
        if self.targets.is_empty() {
            bail!("at least one target must be configured");
        }

        for (i, target) in self.targets.iter().enumerate() {
            if target.host.is_empty() {
                bail!("Target {} has an empty host", i);
            }

            if target.port == 0 {
                bail!("Target {} has port 0", i);
            }
        }

        Ok(())
    }

    /// Validate the request configuration
    fn validate_request(&self) -> Result<()> {
        if !["GET", "HEAD"].contains(&self.request.method.as_str()) {
            bail!("request.method must be 'GET' or 'HEAD'");
        }

        if !self.request.path.starts_with('/') {
            bail!("request.path must start with '/'");
        }

        Ok(())
    }

    /// Validate the poll loop configuration
    fn validate_poll(&self) -> Result<()> {
        if self.poll.interval > Duration::from_secs(3600) {
            bail!("poll.interval cannot exceed 1 hour");
        }

        if self.poll.read_buffer_size < 64 {
            bail!("poll.read_buffer_size must be at least 64 bytes");
        }

        if self.poll.read_buffer_size > 1048576 {
            bail!("poll.read_buffer_size cannot exceed 1MB");
        }

        Ok(())
    }

    /// Validate the logging configuration
    fn validate_logging(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.log_level.as_str()) {
            bail!(
                "logging.log_level must be one of: {}",
                valid_log_levels.join(", ")
            );
        }

        Ok(())
    }

    /// Merge with CLI arguments
    pub fn merge_with_cli_args(
        &mut self,
        targets: &[String],
        path: Option<&str>,
        poll_interval: Option<Duration>,
        read_buffer_size: Option<usize>,
    ) {
        // Override targets if provided
        if !targets.is_empty() {
            match targets
                .iter()
                .map(|t| TargetConfig::parse(t))
                .collect::<Result<Vec<_>>>()
            {
                Ok(parsed) => {
                    tracing::info!("CLI override: {} targets", parsed.len());
                    self.targets = parsed;
                }
                Err(e) => {
                    tracing::warn!("Ignoring invalid CLI targets: {}", e);
                }
            }
        }

        // Override request path if provided
        if let Some(path) = path {
            self.request.path = path.to_string();
            tracing::info!("CLI override: request path set to {}", path);
        }

        // Override poll interval if provided
        if let Some(interval) = poll_interval {
            self.poll.interval = interval;
            tracing::info!("CLI override: poll interval set to {:?}", interval);
        }

        // Override read buffer size if provided
        if let Some(size) = read_buffer_size {
            self.poll.read_buffer_size = size;
            tracing::info!("CLI override: read buffer size set to {} bytes", size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_port_pairs() {
        let target = TargetConfig::parse("localhost:8000").unwrap();
        assert_eq!(target.host, "localhost");
        assert_eq!(target.port, 8000);
    }

    #[test]
    fn rejects_malformed_targets() {
        assert!(TargetConfig::parse("localhost").is_err());
        assert!(TargetConfig::parse(":8000").is_err());
        assert!(TargetConfig::parse("localhost:notaport").is_err());
    }

    #[test]
    fn parses_comma_separated_target_lists() {
        let targets = parse_target_list("localhost:8000, localhost:8001").unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].port, 8001);
    }
}
