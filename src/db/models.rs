/// Database records for accounts, companies, and refresh tokens
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account lifecycle status
///
/// Pending accounts have not confirmed their email; Locked accounts can
/// only be unlocked by administrative action outside this subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
pub enum AccountStatus {
    Pending = 0,
    Active = 1,
    Locked = 2,
}

/// Role inside a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
pub enum AccountRole {
    User = 0,
    Admin = 1,
    Owner = 2,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::User => "User",
            AccountRole::Admin => "Admin",
            AccountRole::Owner => "Owner",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "User" => Some(AccountRole::User),
            "Admin" => Some(AccountRole::Admin),
            "Owner" => Some(AccountRole::Owner),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account record in the database
///
/// Email is stored lowercase; uniqueness is case-insensitive. The password
/// hash is opaque to everything except the credential provider. Invited
/// accounts carry an empty hash until set-password completes.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub status: AccountStatus,
    pub role: AccountRole,
    pub company_id: i64,
    pub email_confirmed: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Company record; the tenant root
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub vat_number: String,
    pub street_one: String,
    pub street_two: Option<String>,
    pub country: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub is_deleted: bool,
}

/// Refresh token record; at most one row per account
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: String,
    pub token: String,
    pub account_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Derived predicate: expired once `now` reaches `expires_at`
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}
