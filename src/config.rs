//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; handlers only ever see the cached
//! `Config` inside the shared state.

use std::env;
use std::path::PathBuf;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Directory holding the JSON record sets (users, cars, audit log)
    pub data_dir: PathBuf,
    /// Frontend URL allowed for credentialed CORS requests
    pub frontend_url: String,
    /// Deployment environment: "development" or "production"
    pub environment: String,
    /// JWT signing key for access and refresh tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Shared secret gating the dev faucet endpoint
    pub faucet_secret: String,
    /// Optional bootstrap password: seeds an admin user into an empty store
    pub admin_password: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            data_dir: PathBuf::from("data"),
            frontend_url: "http://localhost:5173".to_string(),
            environment: "development".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            faucet_secret: "test_faucet_secret".to_string(),
            admin_password: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            data_dir: env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            faucet_secret: env::var("FAUCET_SECRET")
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        })
    }

    /// Whether we are running in a production configuration.
    ///
    /// Controls the `Secure` cookie flag and disables the dev faucet.
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
