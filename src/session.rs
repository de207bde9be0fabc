/// Session orchestration: login, refresh, logout
///
/// Each call is one stateless unit of work; nothing is held between
/// requests except the persisted refresh-token row.
use crate::{
    account::{AccountStore, AuthenticatedUser},
    credentials::CredentialProvider,
    db::models::{Account, AccountStatus, RefreshToken},
    error::{ApiError, ApiResult},
    token::{AccessTokenIssuer, RefreshTokenStore},
};
use std::sync::Arc;

/// Result of a successful login or refresh: the response body plus the
/// refresh token destined for the cookie.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub user: AuthenticatedUser,
    pub refresh: RefreshToken,
}

/// Composes account lookup, credential verification, token issuance, and
/// refresh-token rotation.
pub struct SessionOrchestrator {
    accounts: AccountStore,
    credentials: Arc<dyn CredentialProvider>,
    access_tokens: AccessTokenIssuer,
    refresh_tokens: RefreshTokenStore,
}

impl SessionOrchestrator {
    pub fn new(
        accounts: AccountStore,
        credentials: Arc<dyn CredentialProvider>,
        access_tokens: AccessTokenIssuer,
        refresh_tokens: RefreshTokenStore,
    ) -> Self {
        Self {
            accounts,
            credentials,
            access_tokens,
            refresh_tokens,
        }
    }

    /// Authenticate and open a session.
    ///
    /// Gating order: existence/deletion, then password, then eligibility.
    /// A locked or unconfirmed account fails even with the right password.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<SessionTokens> {
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .filter(|a| !a.is_deleted)
            .ok_or(ApiError::AccountNotFound)?;

        if !self.credentials.verify_password(&account, password) {
            return Err(ApiError::InvalidCredentials);
        }

        if !account.is_login_eligible() {
            return Err(if account.status == AccountStatus::Locked {
                ApiError::AccountLocked
            } else {
                ApiError::EmailNotConfirmed
            });
        }

        tracing::info!(account_id = %account.id, "login succeeded");
        self.open_session(&account).await
    }

    /// Exchange a valid refresh cookie for new tokens. Full rotation: the
    /// stored row is rewritten, so the presented cookie value dies here.
    pub async fn refresh(&self, account_id: &str, cookie_token: &str) -> ApiResult<SessionTokens> {
        if !self.refresh_tokens.validate(account_id, cookie_token).await? {
            return Err(ApiError::TokenInvalidOrExpired);
        }

        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .filter(|a| !a.is_deleted)
            .ok_or(ApiError::TokenInvalidOrExpired)?;

        tracing::debug!(account_id = %account.id, "refresh token rotated");
        self.open_session(&account).await
    }

    /// Issue an access token and rotate the refresh token for the account
    async fn open_session(&self, account: &Account) -> ApiResult<SessionTokens> {
        let refresh = self.refresh_tokens.create(account);
        self.refresh_tokens.save_or_update(&refresh).await?;

        let issued = self.access_tokens.issue(account)?;

        Ok(SessionTokens {
            user: AuthenticatedUser {
                account_id: account.id.clone(),
                full_name: account.full_name(),
                role: account.role,
                access_token: issued.token,
                expires_at: issued.expires_at,
            },
            refresh,
        })
    }
}
