//! Hub configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for the hub server, the completion gateway and the
/// terminal front-end.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Base URL of the Ollama runtime.
    ollama_url: String,

    /// Model identifier sent with every chat request.
    model: String,

    /// Sampling temperature for move generation.
    temperature: f32,

    /// Upper bound on generated tokens.
    num_predict: u32,

    /// Address the hub server binds to.
    host: String,

    /// Port the hub server binds to.
    port: u16,

    /// Chat gateway used by the move client. Defaults to this server's
    /// own `/api/chat` route.
    gateway_url: Option<String>,

    /// Timeout applied to outbound HTTP requests.
    request_timeout_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://127.0.0.1:11434".to_string(),
            model: "gemma3:1b".to_string(),
            temperature: 0.1,
            num_predict: 2,
            host: "127.0.0.1".to_string(),
            port: 3000,
            gateway_url: None,
            request_timeout_secs: 30,
        }
    }
}

impl HubConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(model = %config.model, ollama_url = %config.ollama_url, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from `path` when it exists, otherwise falls back to defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Overrides the bind address.
    pub fn with_listen(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Overrides the gateway URL used by the move client.
    pub fn with_gateway_url(mut self, gateway_url: Option<String>) -> Self {
        if gateway_url.is_some() {
            self.gateway_url = gateway_url;
        }
        self
    }

    /// Gateway URL the move client should post to.
    ///
    /// Without an explicit URL this is the server's own route; a wildcard
    /// bind address is reached through loopback.
    pub fn resolved_gateway_url(&self) -> String {
        self.gateway_url.clone().unwrap_or_else(|| {
            let host = self.host.trim_start_matches('[').trim_end_matches(']');
            let host = match host.parse::<IpAddr>() {
                Ok(ip) if ip.is_unspecified() => "127.0.0.1".to_string(),
                Ok(IpAddr::V6(ip)) => format!("[{}]", ip),
                _ => host.to_string(),
            };
            format!("http://{}:{}/api/chat", host, self.port)
        })
    }

    /// Outbound request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::new("model must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::new(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
