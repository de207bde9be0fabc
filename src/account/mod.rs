/// Account state machine and wire DTOs
///
/// Status transitions: Pending -> Active through email confirmation only;
/// Active <-> Locked is an administrative action outside this subsystem and
/// there is no way out of Locked here.

mod store;

pub use store::{AccountStore, CompanyStore};

#[cfg(test)]
pub(crate) use store::setup_test_db;

use crate::{
    db::models::{Account, AccountRole, AccountStatus, Company},
    error::{ApiError, ApiResult},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

impl Account {
    /// Login-eligibility predicate: deleted, locked, and unconfirmed
    /// accounts never authenticate, regardless of password correctness.
    pub fn is_login_eligible(&self) -> bool {
        !self.is_deleted
            && self.status != AccountStatus::Locked
            && self.status != AccountStatus::Pending
            && self.email_confirmed
    }

    /// Pending -> Active transition. Confirming twice is an error, not a
    /// no-op; callers see `AlreadyConfirmed` on the second attempt.
    pub fn confirm(&mut self) -> ApiResult<()> {
        if self.email_confirmed {
            return Err(ApiError::AlreadyConfirmed);
        }

        self.email_confirmed = true;
        self.status = AccountStatus::Active;
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Registration request: a brand-new company plus its first (Owner) account
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 1, max = 150))]
    pub company_name: String,
    #[validate(length(min = 1, max = 20))]
    pub vat_number: String,
    #[validate(length(min = 1))]
    pub street_one: String,
    pub street_two: Option<String>,
    #[validate(length(min = 1))]
    pub country: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub state: String,
    #[validate(length(min = 1, max = 10))]
    pub zip: String,
}

/// Tenant-scoped invitation request; company is always inherited from the
/// inviter, never taken from the request body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub role: Option<AccountRole>,
}

/// Bare email request (resend-confirmation, forgot-password)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email)]
    pub email: String,
}

/// Email confirmation request
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmEmailRequest {
    pub email: String,
    pub token: String,
}

/// Password reset / invitation set-password request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(email)]
    pub email: String,
    pub token: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

/// Successful login/refresh response body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub account_id: String,
    pub full_name: String,
    pub role: AccountRole,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Account view for tenant-scoped listings; never exposes the hash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewAccount {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: AccountRole,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

// Explicit field mapping. Implicit DTO-to-entity copying is where mapping
// defects hide, so every conversion is spelled out and reviewable.

pub fn company_from_register(req: &RegisterRequest) -> Company {
    Company {
        id: 0, // assigned by the database
        name: req.company_name.clone(),
        vat_number: req.vat_number.clone(),
        street_one: req.street_one.clone(),
        street_two: req.street_two.clone(),
        country: req.country.clone(),
        city: req.city.clone(),
        state: req.state.clone(),
        zip: req.zip.clone(),
        is_deleted: false,
    }
}

pub fn account_from_register(
    req: &RegisterRequest,
    company_id: i64,
    password_hash: String,
) -> Account {
    Account {
        id: Uuid::new_v4().to_string(),
        email: req.email.to_lowercase(),
        first_name: req.first_name.clone(),
        last_name: req.last_name.clone(),
        password_hash,
        status: AccountStatus::Pending,
        role: AccountRole::Owner,
        company_id,
        email_confirmed: false,
        is_deleted: false,
        created_at: Utc::now(),
    }
}

pub fn account_from_invite(req: &InviteRequest, company_id: i64, role: AccountRole) -> Account {
    Account {
        id: Uuid::new_v4().to_string(),
        email: req.email.to_lowercase(),
        first_name: req.first_name.clone(),
        last_name: req.last_name.clone(),
        // No password until the invitee completes set-password
        password_hash: String::new(),
        status: AccountStatus::Pending,
        role,
        company_id,
        email_confirmed: false,
        is_deleted: false,
        created_at: Utc::now(),
    }
}

pub fn view_from_account(account: &Account) -> ViewAccount {
    ViewAccount {
        id: account.id.clone(),
        first_name: account.first_name.clone(),
        last_name: account.last_name.clone(),
        email: account.email.clone(),
        role: account.role,
        status: account.status,
        created_at: account.created_at,
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;

    pub fn account(email: &str, company_id: i64) -> Account {
        Account {
            id: Uuid::new_v4().to_string(),
            email: email.to_lowercase(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: String::new(),
            status: AccountStatus::Pending,
            role: AccountRole::User,
            company_id,
            email_confirmed: false,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    pub fn active_account(email: &str, company_id: i64) -> Account {
        let mut account = account(email, company_id);
        account.status = AccountStatus::Active;
        account.email_confirmed = true;
        account
    }

    pub fn company(name: &str) -> Company {
        Company {
            id: 0,
            name: name.to_string(),
            vat_number: "VAT-0001".to_string(),
            street_one: "1 Test St".to_string(),
            street_two: None,
            country: "US".to_string(),
            city: "Testville".to_string(),
            state: "TS".to_string(),
            zip: "00001".to_string(),
            is_deleted: false,
        }
    }
}
