/// Account provisioning: registration, invitation, and the emailed
/// purpose-token flows (confirm, resend, forgot/reset/set password).
use crate::{
    account::{
        account_from_invite, account_from_register, company_from_register, AccountStore,
        CompanyStore, ConfirmEmailRequest, InviteRequest, RegisterRequest, ResetPasswordRequest,
    },
    credentials::{CredentialProvider, TokenPurpose},
    db::models::{Account, AccountRole},
    error::{ApiError, ApiResult},
    mailer::Mailer,
    token::purpose,
};
use std::sync::Arc;

pub struct InvitationOrchestrator {
    accounts: AccountStore,
    companies: CompanyStore,
    credentials: Arc<dyn CredentialProvider>,
    mailer: Arc<Mailer>,
}

impl InvitationOrchestrator {
    pub fn new(
        accounts: AccountStore,
        companies: CompanyStore,
        credentials: Arc<dyn CredentialProvider>,
        mailer: Arc<Mailer>,
    ) -> Self {
        Self {
            accounts,
            companies,
            credentials,
            mailer,
        }
    }

    /// Create a new company and its Owner account, then email the
    /// confirmation link. The two inserts are not transactional: if the
    /// account insert fails the freshly created company is deleted again.
    /// A failed email is reported but never rolls the account back.
    pub async fn register(&self, req: &RegisterRequest) -> ApiResult<()> {
        if self.accounts.email_exists(&req.email).await? {
            return Err(ApiError::Validation(
                "An account with this email already exists".to_string(),
            ));
        }

        let company = self.companies.create(&company_from_register(req)).await?;

        let hash = self.credentials.hash_password(&req.password)?;
        let account = account_from_register(req, company.id, hash);

        if let Err(e) = self.accounts.create(&account).await {
            tracing::error!(company_id = company.id, "account insert failed, removing company");
            self.companies.delete(company.id).await?;
            return Err(e);
        }

        tracing::info!(account_id = %account.id, company_id = company.id, "account registered");
        self.send_confirmation(&account).await
    }

    /// Invite a teammate into the inviter's company. The invitee lands as a
    /// Pending account with no password; the email carries both the
    /// confirmation link and a set-password link.
    pub async fn invite(&self, inviter_id: &str, req: &InviteRequest) -> ApiResult<()> {
        let inviter = self
            .accounts
            .find_by_id(inviter_id)
            .await?
            .filter(|a| !a.is_deleted)
            .ok_or_else(|| ApiError::Unauthorized("Unknown inviter".to_string()))?;

        let role = req.role.unwrap_or(AccountRole::User);
        if role != AccountRole::User && inviter.role != AccountRole::Owner {
            return Err(ApiError::Unauthorized(
                "Only owners can grant elevated roles".to_string(),
            ));
        }

        if self.accounts.email_exists(&req.email).await? {
            return Err(ApiError::Validation(
                "An account with this email already exists".to_string(),
            ));
        }

        let account = account_from_invite(req, inviter.company_id, role);
        self.accounts.create(&account).await?;

        let company = self
            .companies
            .find_by_id(inviter.company_id)
            .await?
            .ok_or_else(|| ApiError::Internal("Inviter company missing".to_string()))?;

        let confirm_token =
            purpose::encode(&self.credentials.generate_token(&account, TokenPurpose::EmailConfirmation)?);
        let password_token =
            purpose::encode(&self.credentials.generate_token(&account, TokenPurpose::PasswordReset)?);

        tracing::info!(account_id = %account.id, inviter_id = %inviter.id, "account invited");
        self.mailer
            .send_invitation_email(
                &account.email,
                &account.full_name(),
                &company.name,
                &confirm_token,
                &password_token,
            )
            .await
    }

    /// Re-send the confirmation link to a not-yet-confirmed account
    pub async fn resend_confirmation(&self, email: &str) -> ApiResult<()> {
        let account = self.find_live_account(email).await?;
        if account.email_confirmed {
            return Err(ApiError::AlreadyConfirmed);
        }

        self.send_confirmation(&account).await
    }

    /// Email a password-reset link. Only confirmed accounts qualify; an
    /// unconfirmed address has never been proven reachable.
    pub async fn forgot_password(&self, email: &str) -> ApiResult<()> {
        let account = self.find_live_account(email).await?;
        if !account.email_confirmed {
            return Err(ApiError::ConfirmationRequired);
        }

        let token =
            purpose::encode(&self.credentials.generate_token(&account, TokenPurpose::PasswordReset)?);
        self.mailer
            .send_password_reset_email(&account.email, &account.full_name(), &token)
            .await
    }

    /// Consume an emailed confirmation token and activate the account
    pub async fn confirm_email(&self, req: &ConfirmEmailRequest) -> ApiResult<()> {
        let mut account = self.find_live_account(&req.email).await?;
        if account.email_confirmed {
            return Err(ApiError::AlreadyConfirmed);
        }

        let raw = purpose::decode(&req.token)?;
        if !self
            .credentials
            .validate_and_consume(&account, TokenPurpose::EmailConfirmation, &raw)
        {
            return Err(ApiError::PurposeTokenInvalid);
        }

        account.confirm()?;
        self.accounts.save_confirmation(&account).await?;

        tracing::info!(account_id = %account.id, "email confirmed");
        Ok(())
    }

    /// Consume a reset token and replace the password of a confirmed account
    pub async fn reset_password(&self, req: &ResetPasswordRequest) -> ApiResult<()> {
        let account = self.find_live_account(&req.email).await?;
        if !account.email_confirmed {
            return Err(ApiError::ConfirmationRequired);
        }

        self.apply_new_password(&account, &req.token, &req.new_password)
            .await
    }

    /// Invitation variant of reset: the account may still be Pending, since
    /// the invitation email hands out both links at once.
    pub async fn set_password(&self, req: &ResetPasswordRequest) -> ApiResult<()> {
        let account = self.find_live_account(&req.email).await?;
        self.apply_new_password(&account, &req.token, &req.new_password)
            .await
    }

    async fn apply_new_password(
        &self,
        account: &Account,
        encoded_token: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        let raw = purpose::decode(encoded_token)?;
        if !self
            .credentials
            .validate_and_consume(account, TokenPurpose::PasswordReset, &raw)
        {
            return Err(ApiError::PurposeTokenInvalid);
        }

        let hash = self.credentials.hash_password(new_password)?;
        self.accounts.update_password_hash(&account.id, &hash).await?;

        tracing::info!(account_id = %account.id, "password updated");
        Ok(())
    }

    async fn send_confirmation(&self, account: &Account) -> ApiResult<()> {
        let token =
            purpose::encode(&self.credentials.generate_token(account, TokenPurpose::EmailConfirmation)?);
        self.mailer
            .send_confirmation_email(&account.email, &account.full_name(), &token)
            .await
    }

    async fn find_live_account(&self, email: &str) -> ApiResult<Account> {
        self.accounts
            .find_by_email(email)
            .await?
            .filter(|a| !a.is_deleted)
            .ok_or(ApiError::AccountNotFound)
    }
}
