use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Upper bound for any token lifetime (one year)
pub const MAX_TOKEN_TTL_HOURS: u64 = 24 * 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub email: Option<EmailConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Externally visible origin used to build verification links and image URLs
    pub public_base_url: String,
    /// Directory uploaded images are written to; served under /static/images
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub verification_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("verification_expiry_hours", &self.verification_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let jwt_secret = env::var("SECRET_KEY")
            .or_else(|_| env::var("JWT_SECRET"))
            .map_err(|_| ConfigError::Missing("SECRET_KEY"))?;

        // Set defaults based on environment, then override with specific env vars
        let mut config = match environment {
            Environment::Production => Self::production(jwt_secret),
            Environment::Staging => Self::staging(jwt_secret),
            Environment::Development => Self::development(jwt_secret),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = parse_var("PORT", &v)?;
        }
        if let Ok(v) = env::var("PUBLIC_BASE_URL") {
            self.server.public_base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.server.upload_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", &v)?;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse_hours("SECURITY_JWT_EXPIRY_HOURS", &v)?;
        }
        if let Ok(v) = env::var("SECURITY_VERIFICATION_EXPIRY_HOURS") {
            self.security.verification_expiry_hours =
                parse_hours("SECURITY_VERIFICATION_EXPIRY_HOURS", &v)?;
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = parse_bcrypt_cost(&v)?;
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Email is only enabled when an SMTP host is present
        if let Ok(smtp_host) = env::var("SMTP_HOST") {
            let smtp_port = match env::var("SMTP_PORT") {
                Ok(v) => parse_var("SMTP_PORT", &v)?,
                Err(_) => 587,
            };
            self.email = Some(EmailConfig {
                smtp_host,
                smtp_port,
                smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
                smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
                from_address: env::var("SMTP_FROM").map_err(|_| ConfigError::Missing("SMTP_FROM"))?,
            });
        }

        Ok(())
    }

    pub fn development(jwt_secret: String) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8000,
                public_base_url: "http://localhost:8000".to_string(),
                upload_dir: PathBuf::from("./static/images"),
                max_upload_bytes: 10 * 1024 * 1024, // 10MB
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 24 * 7, // 1 week
                verification_expiry_hours: 48,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            email: None,
        }
    }

    fn staging(jwt_secret: String) -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 8000,
                public_base_url: "https://staging.example.com".to_string(),
                upload_dir: PathBuf::from("./static/images"),
                max_upload_bytes: 5 * 1024 * 1024, // 5MB
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 24,
                verification_expiry_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            email: None,
        }
    }

    fn production(jwt_secret: String) -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8000,
                public_base_url: "https://shop.example.com".to_string(),
                upload_dir: PathBuf::from("./static/images"),
                max_upload_bytes: 2 * 1024 * 1024, // 2MB
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 4,
                verification_expiry_hours: 24,
                bcrypt_cost: 12,
                cors_origins: vec!["https://shop.example.com".to_string()],
            },
            email: None,
        }
    }

    /// Public URL of an uploaded image
    pub fn image_url(&self, filename: &str) -> String {
        format!("{}/static/images/{}", self.server.public_base_url, filename)
    }
}

fn parse_var<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid(name, e.to_string()))
}

/// Token lifetime in hours, 1 to `MAX_TOKEN_TTL_HOURS`
fn parse_hours(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    let hours: u64 = parse_var(name, value)?;
    if hours == 0 || hours > MAX_TOKEN_TTL_HOURS {
        return Err(ConfigError::Invalid(
            name,
            format!("must be between 1 and {} hours", MAX_TOKEN_TTL_HOURS),
        ));
    }
    Ok(hours)
}

fn parse_bcrypt_cost(value: &str) -> Result<u32, ConfigError> {
    let cost: u32 = parse_var("SECURITY_BCRYPT_COST", value)?;
    if !(4..=31).contains(&cost) {
        return Err(ConfigError::Invalid("SECURITY_BCRYPT_COST", "must be between 4 and 31".to_string()));
    }
    Ok(cost)
}
