//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use crate::models::is_valid_identity;
use crate::voting::Identity;
use serde::Deserialize;
use std::net::Ipv4Addr;
use thiserror::Error;
use tracing::warn;

/// Administrator used when `VOTING_ADMINISTRATOR` is not set (development only)
pub const DEFAULT_ADMINISTRATOR: &str = "0x0000000000000000000000000000000000000001";

/// Token secret used when `JWT_SECRET` is not set (development only)
pub const DEFAULT_JWT_SECRET: &str = "ballot-engine-dev-secret-change-in-production";

/// Bearer token lifetime when `TOKEN_TTL_MINUTES` is not set
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0), // Bind to 0.0.0.0 for Docker
            port: 3000,
        }
    }
}

/// Voting session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VotingConfig {
    /// Identity allowed to register voters, drive the workflow and tally
    pub administrator: String,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            administrator: DEFAULT_ADMINISTRATOR.to_string(),
        }
    }
}

impl VotingConfig {
    pub fn administrator_identity(&self) -> Identity {
        Identity::new(self.administrator.clone())
    }
}

/// Caller authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 secret that bearer tokens are signed with
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3001".to_string()],
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub server: ServerConfig,
    pub voting: VotingConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        let server = ServerConfig {
            host: std::env::var("HOST")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().port),
        };

        let voting = match std::env::var("VOTING_ADMINISTRATOR") {
            Ok(administrator) => Self::parse_administrator(&administrator)?,
            Err(_) => {
                warn!("⚠️  VOTING_ADMINISTRATOR not set, using default (set it in production!)");
                VotingConfig::default()
            }
        };

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.trim().is_empty() => {
                return Err(ConfigError::InvalidValue(
                    "JWT_SECRET must not be empty".to_string(),
                ));
            }
            Ok(secret) => secret,
            Err(_) => {
                warn!("⚠️  JWT_SECRET not set, using default (INSECURE - set in production!)");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let auth = AuthConfig {
            jwt_secret,
            token_ttl_minutes: std::env::var("TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|t| t.parse().ok())
                .filter(|t: &i64| *t > 0)
                .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES),
        };

        let cors = CorsConfig {
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|| CorsConfig::default().allowed_origins),
        };

        Ok(Self {
            server,
            voting,
            auth,
            cors,
        })
    }

    fn parse_administrator(value: &str) -> Result<VotingConfig, ConfigError> {
        let administrator = value.trim();
        if !is_valid_identity(administrator) {
            return Err(ConfigError::InvalidValue(format!(
                "VOTING_ADMINISTRATOR is not a valid identity: '{}'",
                administrator
            )));
        }
        Ok(VotingConfig {
            administrator: administrator.to_string(),
        })
    }
}
