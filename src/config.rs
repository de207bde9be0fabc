/// Configuration management for the contactry backend
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub email: Option<EmailConfig>,
    pub links: LinkConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

/// Token signing and lifetime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Symmetric key for HMAC-signed tokens; never derived per-account
    pub signing_key: String,
    pub issuer: String,
    /// Access token lifetime, minutes-scale by design
    pub access_token_minutes: i64,
    /// Refresh token lifetime in days
    pub refresh_token_days: i64,
}

/// SMTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from_address: String,
    pub application_name: String,
}

/// Frontend link construction for emailed tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    pub app_url: String,
    pub confirm_email_path: String,
    pub reset_password_path: String,
    pub set_password_path: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ApiError::Validation("Invalid port number".to_string()))?;
        let version = env::var("APP_VERSION").unwrap_or_else(|_| "0.1.0".to_string());

        let database_path: PathBuf = env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "./data/contactry.sqlite".to_string())
            .into();

        let signing_key = env::var("AUTH_SIGNING_KEY")
            .map_err(|_| ApiError::Validation("AUTH_SIGNING_KEY required".to_string()))?;
        let issuer = env::var("AUTH_ISSUER").unwrap_or_else(|_| "contactry".to_string());
        let access_token_minutes = env::var("AUTH_ACCESS_TOKEN_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);
        let refresh_token_days = env::var("AUTH_REFRESH_TOKEN_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .unwrap_or(7);

        let email = if let Ok(smtp_url) = env::var("SMTP_URL") {
            Some(EmailConfig {
                smtp_url,
                from_address: env::var("MAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| format!("noreply@{}", hostname)),
                application_name: env::var("MAIL_APPLICATION_NAME")
                    .unwrap_or_else(|_| "Contactry".to_string()),
            })
        } else {
            None
        };

        let app_url = env::var("APP_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", hostname, port));
        let confirm_email_path = env::var("CONFIRM_EMAIL_PATH")
            .unwrap_or_else(|_| "account/confirm-email".to_string());
        let reset_password_path = env::var("RESET_PASSWORD_PATH")
            .unwrap_or_else(|_| "account/reset-password".to_string());
        let set_password_path = env::var("SET_PASSWORD_PATH")
            .unwrap_or_else(|_| "account/set-password".to_string());

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
            },
            storage: StorageConfig { database_path },
            auth: AuthConfig {
                signing_key,
                issuer,
                access_token_minutes,
                refresh_token_days,
            },
            email,
            links: LinkConfig {
                app_url,
                confirm_email_path,
                reset_password_path,
                set_password_path,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ApiError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.auth.signing_key.len() < 32 {
            return Err(ApiError::Validation(
                "Signing key must be at least 32 characters".to_string(),
            ));
        }

        if self.auth.access_token_minutes <= 0 || self.auth.refresh_token_days <= 0 {
            return Err(ApiError::Validation(
                "Token lifetimes must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "localhost".to_string(),
            port: 8080,
            version: "0.1.0".to_string(),
        },
        storage: StorageConfig {
            database_path: ":memory:".into(),
        },
        auth: AuthConfig {
            signing_key: "test-signing-key-at-least-32-chars-long".to_string(),
            issuer: "contactry-test".to_string(),
            access_token_minutes: 30,
            refresh_token_days: 7,
        },
        email: None,
        links: LinkConfig {
            app_url: "http://localhost:8080".to_string(),
            confirm_email_path: "account/confirm-email".to_string(),
            reset_password_path: "account/reset-password".to_string(),
            set_password_path: "account/set-password".to_string(),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_short_signing_key() {
        let mut config = test_config();
        config.auth.signing_key = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_test_config() {
        assert!(test_config().validate().is_ok());
    }
}
