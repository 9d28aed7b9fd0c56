/// Configuration management for the Finauth service
use crate::error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub email: Option<EmailConfig>,
    pub sms: Option<SmsConfig>,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
}

/// Authentication configuration: token signing and password hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of access tokens issued on login
    pub access_token_ttl_hours: i64,
    /// Lifetime of the password-reset token issued after OTP verification
    pub reset_token_ttl_mins: i64,
    /// Argon2 memory parameter in KiB
    pub hash_memory_kib: u32,
    /// Argon2 iteration count
    pub hash_iterations: u32,
}

/// Email (SMTP) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from_address: String,
}

/// SMS gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    pub gateway_url: String,
    pub api_key: String,
    pub sender_id: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AuthResult<Self> {
        dotenv::dotenv().ok();

        let host = env::var("FINAUTH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("FINAUTH_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| AuthError::Validation("Invalid port number".to_string()))?;
        let version = env::var("FINAUTH_VERSION").unwrap_or_else(|_| "0.1.0".to_string());

        let data_directory: PathBuf = env::var("FINAUTH_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("FINAUTH_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("finauth.sqlite"));

        let jwt_secret = env::var("FINAUTH_JWT_SECRET")
            .map_err(|_| AuthError::Validation("JWT secret required".to_string()))?;
        let access_token_ttl_hours = env::var("FINAUTH_ACCESS_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .unwrap_or(24);
        let reset_token_ttl_mins = env::var("FINAUTH_RESET_TOKEN_TTL_MINS")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .unwrap_or(15);
        let hash_memory_kib = env::var("FINAUTH_HASH_MEMORY_KIB")
            .unwrap_or_else(|_| "32768".to_string())
            .parse()
            .unwrap_or(32768);
        let hash_iterations = env::var("FINAUTH_HASH_ITERATIONS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .unwrap_or(3);

        let email = if let Ok(smtp_url) = env::var("FINAUTH_SMTP_URL") {
            Some(EmailConfig {
                smtp_url,
                from_address: env::var("FINAUTH_EMAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| format!("noreply@{}", host)),
            })
        } else {
            None
        };

        let sms = if let Ok(gateway_url) = env::var("FINAUTH_SMS_GATEWAY_URL") {
            Some(SmsConfig {
                gateway_url,
                api_key: env::var("FINAUTH_SMS_API_KEY")
                    .map_err(|_| AuthError::Validation("SMS API key required".to_string()))?,
                sender_id: env::var("FINAUTH_SMS_SENDER_ID")
                    .unwrap_or_else(|_| "FINAUTH".to_string()),
            })
        } else {
            None
        };

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_json = env::var("FINAUTH_LOG_JSON")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        Ok(AppConfig {
            service: ServiceConfig {
                host,
                port,
                version,
            },
            storage: StorageConfig {
                data_directory,
                database,
            },
            auth: AuthConfig {
                jwt_secret,
                access_token_ttl_hours,
                reset_token_ttl_mins,
                hash_memory_kib,
                hash_iterations,
            },
            email,
            sms,
            logging: LoggingConfig {
                level: log_level,
                json: log_json,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> AuthResult<()> {
        if self.service.host.is_empty() {
            return Err(AuthError::Validation("Host cannot be empty".to_string()));
        }

        if self.auth.jwt_secret.len() < 32 {
            return Err(AuthError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.auth.hash_iterations == 0 {
            return Err(AuthError::Validation(
                "Hash iteration count must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
impl AppConfig {
    /// Configuration for tests: in-memory database, fixed secrets
    pub fn test_default() -> Self {
        AppConfig {
            service: ServiceConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                version: "0.1.0".to_string(),
            },
            storage: StorageConfig {
                data_directory: PathBuf::from("./data"),
                database: PathBuf::from(":memory:"),
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-key-0123456789abcdef-0123".to_string(),
                access_token_ttl_hours: 24,
                reset_token_ttl_mins: 15,
                hash_memory_kib: 1024,
                hash_iterations: 1,
            },
            email: None,
            sms: None,
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
        }
    }
}
