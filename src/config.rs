//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Channel the modules are deployed on
    pub channel_id: String,

    /// Deployed name of the event module
    pub event_module_name: String,

    /// Deployed name of the ticket module
    pub ticket_module_name: String,

    /// Environment (development, production)
    pub environment: String,

    /// Log output format (pretty, json)
    pub log_format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidValue("LOG_FORMAT")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            channel_id: "ticken-channel".to_string(),
            event_module_name: "ticken-event".to_string(),
            ticket_module_name: "ticken-ticket".to_string(),
            environment: "development".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT"))?,
            None => defaults.port,
        };

        let channel_id = non_empty(lookup("CHANNEL_ID"), defaults.channel_id, "CHANNEL_ID")?;

        let event_module_name = non_empty(
            lookup("EVENT_MODULE_NAME"),
            defaults.event_module_name,
            "EVENT_MODULE_NAME",
        )?;

        let ticket_module_name = non_empty(
            lookup("TICKET_MODULE_NAME"),
            defaults.ticket_module_name,
            "TICKET_MODULE_NAME",
        )?;

        if event_module_name == ticket_module_name {
            return Err(ConfigError::InvalidValue("TICKET_MODULE_NAME"));
        }

        let environment = lookup("ENVIRONMENT").unwrap_or(defaults.environment);

        let log_format = match lookup("LOG_FORMAT") {
            Some(format) => format.parse()?,
            None => defaults.log_format,
        };

        Ok(Self {
            host,
            port,
            channel_id,
            event_module_name,
            ticket_module_name,
            environment,
            log_format,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn non_empty(
    value: Option<String>,
    default: String,
    name: &'static str,
) -> Result<String, ConfigError> {
    match value {
        Some(value) if value.trim().is_empty() => Err(ConfigError::InvalidValue(name)),
        Some(value) => Ok(value.trim().to_string()),
        None => Ok(default),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.event_module_name, "ticken-event");
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("CHANNEL_ID", "mychannel"),
            ("LOG_FORMAT", "JSON"),
            ("ENVIRONMENT", "production"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.channel_id, "mychannel");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidValue("PORT"))
        ));
        assert!(matches!(
            load(&[("LOG_FORMAT", "xml")]),
            Err(ConfigError::InvalidValue("LOG_FORMAT"))
        ));
        assert!(matches!(
            load(&[("EVENT_MODULE_NAME", " ")]),
            Err(ConfigError::InvalidValue("EVENT_MODULE_NAME"))
        ));
        assert!(matches!(
            load(&[("TICKET_MODULE_NAME", "ticken-event")]),
            Err(ConfigError::InvalidValue("TICKET_MODULE_NAME"))
        ));
    }
}
