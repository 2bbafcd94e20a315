use std::{env, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::echo::EchoHandler;
use crate::mcp::server::Capabilities;
use crate::registry::ServerEntry;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 49200;
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);
pub const DEFAULT_DESCRIPTION: &str = "MCP server over JSON-RPC 2.0";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub name: String,
    pub description: String,
    pub server_type: String,
    pub host: String,
    pub port: u16,
    pub capabilities: Capabilities,
    pub shutdown_grace: Duration,
    pub registry_path: Option<PathBuf>,
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MCP_PORT must be a valid u16")]
    InvalidPort,
    #[error("MCP_CAPABILITIES entry `{0}` must be `name` or `name=true|false`")]
    InvalidCapability(String),
    #[error("MCP_SHUTDOWN_GRACE_SECS must be a whole number of seconds")]
    InvalidShutdownGrace,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = var("MCP_PORT")
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(DEFAULT_PORT);
        let capabilities = match var("MCP_CAPABILITIES") {
            Some(value) => parse_capabilities(&value)?,
            None => EchoHandler::default_capabilities(),
        };
        let shutdown_grace = var("MCP_SHUTDOWN_GRACE_SECS")
            .map(|value| {
                value
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::InvalidShutdownGrace)
            })
            .transpose()?
            .unwrap_or(DEFAULT_SHUTDOWN_GRACE);

        Ok(Self {
            name: var("MCP_SERVER_NAME").unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string()),
            description: var("MCP_SERVER_DESCRIPTION")
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            server_type: var("MCP_SERVER_TYPE").unwrap_or_else(|| "http".to_string()),
            host: var("MCP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            capabilities,
            shutdown_grace,
            registry_path: var("MCP_REGISTRY_PATH").map(PathBuf::from),
            log_level: var("MCP_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn registry_entry(&self) -> ServerEntry {
        ServerEntry {
            name: self.name.clone(),
            server_type: self.server_type.clone(),
            host: self.host.clone(),
            port: self.port,
            capabilities: self.capabilities.clone(),
        }
    }
}

fn parse_capabilities(value: &str) -> Result<Capabilities, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (name, enabled) = match item.split_once('=') {
                Some((name, flag)) => {
                    let enabled = flag
                        .trim()
                        .parse::<bool>()
                        .map_err(|_| ConfigError::InvalidCapability(item.to_string()))?;
                    (name.trim(), enabled)
                }
                None => (item, true),
            };
            if name.is_empty() {
                return Err(ConfigError::InvalidCapability(item.to_string()));
            }
            Ok((name.to_string(), enabled))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn parse_defaults() {
        let config = config_from(&[]).expect("config should parse");

        assert_eq!(config.name, env!("CARGO_PKG_NAME"));
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 49200);
        assert_eq!(config.server_type, "http");
        assert_eq!(config.shutdown_grace, Duration::from_secs(10));
        assert_eq!(config.registry_path, None);
        assert_eq!(config.capabilities.get("echo"), Some(&true));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("MCP_HOST", "  "), ("MCP_PORT", "")]).expect("config");

        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn invalid_port_fails() {
        let err = config_from(&[("MCP_PORT", "70000")]).expect_err("expected invalid port");
        assert!(matches!(err, ConfigError::InvalidPort));
    }

    #[test]
    fn capabilities_parse_flags() {
        let config = config_from(&[("MCP_CAPABILITIES", "echo, tools=false,resources=true")])
            .expect("config should parse");

        assert_eq!(
            config.capabilities,
            Capabilities::from([
                ("echo".to_string(), true),
                ("resources".to_string(), true),
                ("tools".to_string(), false),
            ])
        );
    }

    #[test]
    fn invalid_capability_flag_fails() {
        let err = config_from(&[("MCP_CAPABILITIES", "echo=maybe")])
            .expect_err("expected invalid capability");
        assert!(matches!(err, ConfigError::InvalidCapability(item) if item == "echo=maybe"));

        let err = config_from(&[("MCP_CAPABILITIES", "=true")]).expect_err("empty name");
        assert!(matches!(err, ConfigError::InvalidCapability(_)));
    }

    #[test]
    fn invalid_grace_period_fails() {
        let err = config_from(&[("MCP_SHUTDOWN_GRACE_SECS", "soon")]).expect_err("bad grace");
        assert!(matches!(err, ConfigError::InvalidShutdownGrace));
    }

    #[test]
    fn registry_entry_mirrors_config() {
        let config = config_from(&[
            ("MCP_SERVER_NAME", "echo-server"),
            ("MCP_PORT", "8080"),
            ("MCP_REGISTRY_PATH", "/tmp/registry.json"),
        ])
        .expect("config should parse");
        let entry = config.registry_entry();

        assert_eq!(entry.name, "echo-server");
        assert_eq!(entry.port, 8080);
        assert_eq!(entry.host, "localhost");
        assert_eq!(config.registry_path, Some(PathBuf::from("/tmp/registry.json")));
    }
}
