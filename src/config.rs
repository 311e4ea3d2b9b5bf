//! Node configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ReliefError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub node: NodeConfig,
    #[serde(default)]
    pub api: ApiConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub escalator: EscalatorConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Data directory (holds the SQLite store)
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP API port
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for JWT signing (minimum 32 characters)
    pub jwt_secret: String,

    /// Token lifetime in seconds
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,

    /// Registration key granting the administrator role
    pub admin_key: String,

    /// Registration key granting the field-volunteer role
    pub volunteer_key: String,
}

/// Priority escalator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalatorConfig {
    /// Whether the escalator is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Interval between escalation passes in seconds
    #[serde(default = "default_escalation_interval")]
    pub interval_secs: u64,
}

impl Default for EscalatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_escalation_interval(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedConfig {
    /// JSON file with the static district list, loaded idempotently at startup
    #[serde(default)]
    pub districts_file: Option<PathBuf>,
}

// Defaults
fn default_http_port() -> u16 {
    8080
}
fn default_token_expiry() -> u64 {
    1800
}
fn default_escalation_interval() -> u64 {
    120
}
fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node: NodeConfig {
                data_dir: PathBuf::from("/var/lib/relief-node"),
            },
            api: ApiConfig::default(),
            auth: AuthConfig {
                jwt_secret: String::new(),
                token_expiry_secs: default_token_expiry(),
                admin_key: String::new(),
                volunteer_key: String::new(),
            },
            escalator: EscalatorConfig::default(),
            seed: SeedConfig {
                districts_file: Some(PathBuf::from("static/districts.json")),
            },
        }
    }
}

impl Config {
    /// Validate startup-critical fields.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.len() < 32 {
            return Err(ReliefError::Config(
                "auth.jwt_secret must be at least 32 characters".into(),
            ));
        }
        if self.auth.admin_key.is_empty() || self.auth.volunteer_key.is_empty() {
            return Err(ReliefError::Config(
                "auth.admin_key and auth.volunteer_key are required".into(),
            ));
        }
        if self.escalator.interval_secs == 0 {
            return Err(ReliefError::Config(
                "escalator.interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.auth.jwt_secret = "a-test-secret-that-is-32-chars-long!".into();
        config.auth.admin_key = "ADMIN12345".into();
        config.auth.volunteer_key = "FIELDVOLUNTEER67890".into();
        config
    }

    #[test]
    fn test_defaults_applied_from_minimal_toml() {
        let toml_str = r#"
[node]
data_dir = "/tmp/relief-test"

[auth]
jwt_secret = "a-test-secret-that-is-32-chars-long!"
admin_key = "ADMIN12345"
volunteer_key = "FIELDVOLUNTEER67890"
"#;
        let config: Config = toml::from_str(toml_str).expect("valid TOML");
        assert_eq!(config.api.http_port, 8080);
        assert_eq!(config.auth.token_expiry_secs, 1800);
        assert!(config.escalator.enabled);
        assert_eq!(config.escalator.interval_secs, 120);
        assert!(config.seed.districts_file.is_none());
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let mut config = valid_config();
        config.auth.jwt_secret = "short".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = valid_config();
        config.escalator.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }
}
