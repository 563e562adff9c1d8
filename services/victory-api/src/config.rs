//! Service configuration.
//!
//! Defaults, then an optional TOML file, then environment overrides, then a
//! single validation pass at startup. Nothing reads the environment after
//! [`ServiceConfig::load`] returns.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use victory_core::LogFormat;
use victory_identity::{WorkflowConfig, DEFAULT_ALLOWED_DOMAINS};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    InvalidEnv { key: String, reason: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/victory.db"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    Mailgun,
    /// Write codes to the log instead of sending mail
    Log,
}

impl std::str::FromStr for MailProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mailgun" => Ok(MailProvider::Mailgun),
            "log" => Ok(MailProvider::Log),
            other => Err(format!("unknown mail provider '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub provider: MailProvider,
    pub api_base: String,
    pub domain: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub sender: String,
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: MailProvider::Mailgun,
            api_base: "https://api.mailgun.net".to_string(),
            domain: "mail.victoryapp.net".to_string(),
            api_key: None,
            sender: "Victory <no-reply@mail.victoryapp.net>".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub code_ttl_secs: u64,
    pub max_code_attempts: u32,
    pub sweep_interval_secs: u64,
    pub allowed_domains: Vec<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_secs: 900,
            max_code_attempts: 8,
            sweep_interval_secs: 60,
            allowed_domains: DEFAULT_ALLOWED_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub verification: VerificationConfig,
    pub logging: LoggingConfig,
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

impl ServiceConfig {
    /// Load defaults, the optional file, and process environment, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from `lookup`, typically the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("VICTORY_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("VICTORY_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse_env("VICTORY_PORT", &v)?;
        }
        if let Some(v) = lookup("DATABASE_PATH") {
            self.storage.database_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("MAIL_PROVIDER") {
            self.mail.provider = parse_env("MAIL_PROVIDER", &v)?;
        }
        if let Some(v) = lookup("MAILGUN_API_KEY") {
            self.mail.api_key = Some(v);
        }
        if let Some(v) = lookup("MAILGUN_DOMAIN") {
            self.mail.domain = v;
        }
        if let Some(v) = lookup("MAILGUN_API_BASE") {
            self.mail.api_base = v;
        }
        if let Some(v) = lookup("MAIL_SENDER") {
            self.mail.sender = v;
        }
        if let Some(v) = lookup("MAIL_TIMEOUT_SECS") {
            self.mail.timeout_secs = parse_env("MAIL_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("CODE_TTL_SECS") {
            self.verification.code_ttl_secs = parse_env("CODE_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("ALLOWED_EMAIL_DOMAINS") {
            self.verification.allowed_domains = v
                .split(',')
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect();
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            self.logging.format = parse_env("LOG_FORMAT", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mail.provider == MailProvider::Mailgun {
            if self.mail.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
                return Err(ConfigError::ValidationError(
                    "mail.api_key (MAILGUN_API_KEY) is required for the mailgun provider"
                        .to_string(),
                ));
            }
            if self.mail.domain.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "mail.domain cannot be empty".to_string(),
                ));
            }
        }
        if self.mail.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "mail.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.verification.code_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "verification.code_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.verification.max_code_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "verification.max_code_attempts must be greater than zero".to_string(),
            ));
        }
        if self.verification.sweep_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "verification.sweep_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.verification.allowed_domains.is_empty() {
            return Err(ConfigError::ValidationError(
                "verification.allowed_domains cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn workflow(&self) -> WorkflowConfig {
        WorkflowConfig {
            pending_ttl: Duration::from_secs(self.verification.code_ttl_secs),
            notify_timeout: Duration::from_secs(self.mail.timeout_secs),
            max_code_attempts: self.verification.max_code_attempts,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_need_an_api_key() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.verification.code_ttl_secs, 900);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_provider_validates_without_key() {
        let mut config = ServiceConfig::default();
        config.mail.provider = MailProvider::Log;
        config.validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServiceConfig::default();
        config
            .apply_env(env(&[
                ("PORT", "8088"),
                ("MAILGUN_API_KEY", "key-123"),
                ("ALLOWED_EMAIL_DOMAINS", "Example.com, pm.me,,"),
                ("LOG_FORMAT", "json"),
                ("CODE_TTL_SECS", "60"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.mail.api_key.as_deref(), Some("key-123"));
        assert_eq!(
            config.verification.allowed_domains,
            vec!["example.com".to_string(), "pm.me".to_string()]
        );
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.workflow().pending_ttl, Duration::from_secs(60));
        config.validate().unwrap();
    }

    #[test]
    fn test_victory_port_wins_over_port() {
        let mut config = ServiceConfig::default();
        config
            .apply_env(env(&[("PORT", "1"), ("VICTORY_PORT", "2")]))
            .unwrap();
        assert_eq!(config.server.port, 2);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = ServiceConfig::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = ServiceConfig::from_toml(
            r#"
            [server]
            port = 9000

            [mail]
            provider = "log"

            [verification]
            allowed_domains = ["example.com"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.mail.provider, MailProvider::Log);
        assert_eq!(config.verification.max_code_attempts, 8);
        assert_eq!(config.verification.allowed_domains, vec!["example.com"]);
        config.validate().unwrap();
    }

    #[test]
    fn test_example_config_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/victory.example.toml");
        let config = ServiceConfig::from_file(path).unwrap();
        assert_eq!(config.mail.provider, MailProvider::Log);
        assert_eq!(config.verification.allowed_domains.len(), 6);
        config.validate().unwrap();
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = ServiceConfig::default();
        config.mail.provider = MailProvider::Log;
        config.verification.code_ttl_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
