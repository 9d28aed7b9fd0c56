/// Application context and dependency injection
use crate::{
    account::AccountManager,
    auth::TokenIssuer,
    config::AppConfig,
    db,
    error::{AuthError, AuthResult},
    notify::{mailer::EmailOtpSender, sms::SmsOtpSender},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub db: SqlitePool,
    pub account_manager: Arc<AccountManager>,
    pub token_issuer: TokenIssuer,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: AppConfig) -> AuthResult<Self> {
        config.validate()?;

        Self::ensure_directories(&config).await?;

        let db = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        let email_sender = Arc::new(EmailOtpSender::new(config.email.clone())?);
        if !email_sender.is_configured() {
            tracing::warn!("No SMTP configuration; email OTP dispatch will fail");
        }
        let sms_sender = Arc::new(SmsOtpSender::new(config.sms.clone())?);
        if !sms_sender.is_configured() {
            tracing::warn!("No SMS gateway configuration; mobile OTP dispatch will fail");
        }

        let account_manager = Arc::new(AccountManager::new(
            &config,
            db.clone(),
            email_sender,
            sms_sender,
        ));

        let token_issuer = TokenIssuer::new(config.auth.jwt_secret.clone());

        Ok(Self {
            config: Arc::new(config),
            db,
            account_manager,
            token_issuer,
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &AppConfig) -> AuthResult<()> {
        let dir = &config.storage.data_directory;
        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AuthError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
            })?;
        }

        // The database may live outside the data directory
        if let Some(parent) = config.storage.database.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        Ok(())
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!("http://{}:{}", self.config.service.host, self.config.service.port)
    }
}
