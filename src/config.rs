//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_HOST: &str = "0.0.0.0";
    pub const DEV_PORT: u16 = 8080;
    pub const DEV_DATABASE_HOST: &str = "localhost";
    pub const DEV_DATABASE_PORT: u16 = 5432;
    pub const DEV_DATABASE_NAME: &str = "vehicle_vision";
    pub const DEV_DATABASE_USER: &str = "postgres";
    pub const DEV_DATABASE_PASSWORD: &str = "postgres";
    pub const DEV_DATABASE_MAX_CONNECTIONS: u32 = 10;
    pub const DEV_DATABASE_MIN_CONNECTIONS: u32 = 1;
    pub const DEV_ANALYZER_URL: &str = "http://localhost:8000/analyze/vehicle";
    pub const DEV_ANALYZER_TIMEOUT_SECS: u64 = 30;
    pub const DEV_UPLOAD_DIR: &str = "uploads";
    pub const DEV_MAX_UPLOAD_SIZE: usize = 10_485_760; // 10MB per image
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: SecretString,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseSettings {
    /// Build the PostgreSQL connection URL.
    ///
    /// User and password are percent-encoded so credentials containing
    /// reserved characters survive URL parsing.
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            urlencoding::encode(&self.user),
            urlencoding::encode(self.password.expose_secret()),
            self.host,
            self.port,
            self.name
        )
    }
}

/// Settings for the external image analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    /// Full endpoint URL, including path.
    pub url: String,
    /// Upper bound on a single analyzer call.
    pub timeout: Duration,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// PostgreSQL settings
    pub database: DatabaseSettings,
    /// External analyzer settings
    pub analyzer: AnalyzerSettings,
    /// Root directory for uploaded images
    pub upload_dir: PathBuf,
    /// Maximum accepted image size in bytes
    pub max_upload_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable has a development default. In production mode the
    /// database password must be set to something other than the default.
    ///
    /// Environment variables:
    /// - `ENVIRONMENT`: development/production (default: development)
    /// - `HOST`, `PORT`: bind address (default: 0.0.0.0:8080)
    /// - `DATABASE_HOST`, `DATABASE_PORT`, `DATABASE_NAME`, `DATABASE_USER`,
    ///   `DATABASE_PASSWORD`: PostgreSQL connection parameters
    /// - `DATABASE_MAX_CONNECTIONS`, `DATABASE_MIN_CONNECTIONS`: pool limits
    /// - `ANALYZER_URL`: image analyzer endpoint
    /// - `ANALYZER_TIMEOUT_SECS`: analyzer timeout (default: 30)
    /// - `UPLOAD_DIR`: image storage root (default: uploads)
    /// - `MAX_UPLOAD_SIZE`: max image size in bytes (default: 10MB)
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("ENVIRONMENT") {
            Ok(value) => Environment::parse(&value).ok_or(ConfigError::InvalidValue(
                "ENVIRONMENT must be 'development' or 'production'",
            ))?,
            Err(_) => Environment::Development,
        };

        let host = env::var("HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());
        let port = parse_var("PORT", defaults::DEV_PORT, "PORT must be a valid port number")?;

        let database = DatabaseSettings {
            host: env::var("DATABASE_HOST")
                .unwrap_or_else(|_| defaults::DEV_DATABASE_HOST.to_string()),
            port: parse_var(
                "DATABASE_PORT",
                defaults::DEV_DATABASE_PORT,
                "DATABASE_PORT must be a valid port number",
            )?,
            name: env::var("DATABASE_NAME")
                .unwrap_or_else(|_| defaults::DEV_DATABASE_NAME.to_string()),
            user: env::var("DATABASE_USER")
                .unwrap_or_else(|_| defaults::DEV_DATABASE_USER.to_string()),
            password: SecretString::from(
                env::var("DATABASE_PASSWORD")
                    .unwrap_or_else(|_| defaults::DEV_DATABASE_PASSWORD.to_string()),
            ),
            max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                defaults::DEV_DATABASE_MAX_CONNECTIONS,
                "DATABASE_MAX_CONNECTIONS must be a valid number",
            )?,
            min_connections: parse_var(
                "DATABASE_MIN_CONNECTIONS",
                defaults::DEV_DATABASE_MIN_CONNECTIONS,
                "DATABASE_MIN_CONNECTIONS must be a valid number",
            )?,
        };

        let timeout_secs = parse_var(
            "ANALYZER_TIMEOUT_SECS",
            defaults::DEV_ANALYZER_TIMEOUT_SECS,
            "ANALYZER_TIMEOUT_SECS must be a valid number",
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "ANALYZER_TIMEOUT_SECS must be greater than zero",
            ));
        }

        let analyzer = AnalyzerSettings {
            url: env::var("ANALYZER_URL").unwrap_or_else(|_| defaults::DEV_ANALYZER_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(defaults::DEV_UPLOAD_DIR));

        let max_upload_size = parse_var(
            "MAX_UPLOAD_SIZE",
            defaults::DEV_MAX_UPLOAD_SIZE,
            "MAX_UPLOAD_SIZE must be a valid number",
        )?;

        let config = Config {
            environment,
            host,
            port,
            database,
            analyzer,
            upload_dir,
            max_upload_size,
        };

        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database.password.expose_secret() == defaults::DEV_DATABASE_PASSWORD {
            errors.push(
                "DATABASE_PASSWORD is using the development default. Set a production password."
                    .to_string(),
            );
        }

        if self.database.min_connections > self.database.max_connections {
            errors.push(format!(
                "DATABASE_MIN_CONNECTIONS ({}) exceeds DATABASE_MAX_CONNECTIONS ({})",
                self.database.min_connections, self.database.max_connections
            ));
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

fn parse_var<T: FromStr>(name: &str, default: T, message: &'static str) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue(message)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
