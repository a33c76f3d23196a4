use crate::core::{AppError, Result};
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub biller: BillerConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Flat admin fee applied to instant pulsa/data purchases
    pub instant_admin_fee: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// External biller / virtual-account aggregator credentials
#[derive(Debug, Clone)]
pub struct BillerConfig {
    pub base_url: String,
    pub username: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Shared secret the upstream auth service signs identity headers with
    pub auth_signing_secret: String,
    /// Shared secret the aggregator signs top-up callbacks with
    pub callback_secret: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format: match env::var("LOG_FORMAT").as_deref() {
                    Ok("json") => LogFormat::Json,
                    _ => LogFormat::Pretty,
                },
                instant_admin_fee: Decimal::from_str(
                    &env::var("ADMIN_FEE_INSTANT").unwrap_or_else(|_| "2500".to_string()),
                )
                .map_err(|_| AppError::Configuration("Invalid ADMIN_FEE_INSTANT".to_string()))?,
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            biller: BillerConfig {
                base_url: env::var("BILLER_BASE_URL")
                    .unwrap_or_else(|_| "https://api-stg.oyindonesia.com/api".to_string()),
                username: env::var("BILLER_USERNAME")
                    .map_err(|_| AppError::Configuration("BILLER_USERNAME not set".to_string()))?,
                api_key: env::var("BILLER_API_KEY")
                    .map_err(|_| AppError::Configuration("BILLER_API_KEY not set".to_string()))?,
                timeout_secs: env::var("BILLER_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid BILLER_TIMEOUT_SECS".to_string())
                    })?,
            },
            security: SecurityConfig {
                auth_signing_secret: env::var("AUTH_SIGNING_SECRET").map_err(|_| {
                    AppError::Configuration("AUTH_SIGNING_SECRET not set".to_string())
                })?,
                callback_secret: env::var("CALLBACK_SECRET")
                    .map_err(|_| AppError::Configuration("CALLBACK_SECRET not set".to_string()))?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.biller.timeout_secs == 0 {
            return Err(AppError::Configuration(
                "Biller timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(AppError::Configuration(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.security.auth_signing_secret.trim().is_empty()
            || self.security.callback_secret.trim().is_empty()
        {
            return Err(AppError::Configuration(
                "Signing secrets cannot be empty".to_string(),
            ));
        }

        if self.app.instant_admin_fee < Decimal::ZERO {
            return Err(AppError::Configuration(
                "Instant admin fee cannot be negative".to_string(),
            ));
        }

        Ok(())
    }
}
