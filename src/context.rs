/// Application context and dependency injection
use crate::{
    account::{AccountStore, CompanyStore},
    config::ServerConfig,
    credentials::{CredentialProvider, IdentityCredentials},
    db,
    error::ApiResult,
    invite::InvitationOrchestrator,
    mailer::Mailer,
    session::SessionOrchestrator,
    token::{AccessTokenIssuer, RefreshTokenStore},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub accounts: AccountStore,
    pub companies: CompanyStore,
    pub access_tokens: AccessTokenIssuer,
    pub sessions: Arc<SessionOrchestrator>,
    pub invitations: Arc<InvitationOrchestrator>,
    pub mailer: Arc<Mailer>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        config.validate()?;

        let pool = db::create_pool(&config.storage.database_path, db::DatabaseOptions::default())
            .await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let accounts = AccountStore::new(pool.clone());
        let companies = CompanyStore::new(pool.clone());
        let credentials: Arc<dyn CredentialProvider> =
            Arc::new(IdentityCredentials::new(config.auth.signing_key.clone()));
        let access_tokens = AccessTokenIssuer::new(&config.auth);
        let refresh_tokens = RefreshTokenStore::new(pool.clone(), config.auth.refresh_token_days);
        let mailer = Arc::new(Mailer::new(config.email.clone(), config.links.clone())?);

        let sessions = Arc::new(SessionOrchestrator::new(
            accounts.clone(),
            credentials.clone(),
            access_tokens.clone(),
            refresh_tokens,
        ));

        let invitations = Arc::new(InvitationOrchestrator::new(
            accounts.clone(),
            companies.clone(),
            credentials,
            mailer.clone(),
        ));

        if !mailer.is_configured() {
            tracing::warn!("SMTP not configured, confirmation and reset emails will be dropped");
        }

        Ok(Self {
            config: Arc::new(config),
            db: pool,
            accounts,
            companies,
            access_tokens,
            sessions,
            invitations,
            mailer,
        })
    }
}
