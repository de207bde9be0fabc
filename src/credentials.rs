/// Credential provider: password hashing and purpose-bound one-time tokens
///
/// The rest of the system treats hashing and raw purpose-token crypto as a
/// collaborator behind this trait; orchestrators never see hash internals.
use crate::{
    db::models::Account,
    error::{ApiError, ApiResult},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// What a one-time token is allowed to do. A token minted for one purpose
/// never validates for the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    EmailConfirmation,
    PasswordReset,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::EmailConfirmation => "confirm_email",
            TokenPurpose::PasswordReset => "reset_password",
        }
    }

    fn lifetime(&self) -> Duration {
        match self {
            TokenPurpose::EmailConfirmation => Duration::hours(24),
            TokenPurpose::PasswordReset => Duration::hours(1),
        }
    }
}

/// Password verification and raw purpose-token generation/validation
pub trait CredentialProvider: Send + Sync {
    fn hash_password(&self, plaintext: &str) -> ApiResult<String>;

    /// Constant-time verification; returns no detail about why it failed
    fn verify_password(&self, account: &Account, plaintext: &str) -> bool;

    /// Mint a raw (pre-encoding) single-use token bound to (account, purpose)
    fn generate_token(&self, account: &Account, purpose: TokenPurpose) -> ApiResult<String>;

    /// Judge a raw token. Tokens are stateless: consumption happens because
    /// the field they protect changes once the action completes.
    fn validate_and_consume(&self, account: &Account, purpose: TokenPurpose, raw: &str) -> bool;
}

#[derive(Debug, Serialize, Deserialize)]
struct PurposeClaims {
    sub: String,
    purpose: String,
    /// Digest of the protected field; changing the field kills the token
    stamp: String,
    iat: i64,
    exp: i64,
}

/// Production credential provider: Argon2id hashes, HMAC-signed purpose
/// tokens carrying a security stamp over the protected account field.
pub struct IdentityCredentials {
    secret: String,
}

impl IdentityCredentials {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// The stamp binds a token to the current value of the field its action
    /// mutates: password hash for resets, confirmation flag for confirms.
    fn security_stamp(&self, account: &Account, purpose: TokenPurpose) -> String {
        let protected = match purpose {
            TokenPurpose::PasswordReset => account.password_hash.as_str(),
            TokenPurpose::EmailConfirmation => {
                if account.email_confirmed {
                    "1"
                } else {
                    "0"
                }
            }
        };

        let mut hasher = Sha256::new();
        hasher.update(account.id.as_bytes());
        hasher.update(purpose.as_str().as_bytes());
        hasher.update(protected.as_bytes());
        let digest = hasher.finalize();

        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl CredentialProvider for IdentityCredentials {
    fn hash_password(&self, plaintext: &str) -> ApiResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(hash.to_string())
    }

    fn verify_password(&self, account: &Account, plaintext: &str) -> bool {
        // Invited accounts carry an empty hash until set-password completes
        if account.password_hash.is_empty() {
            return false;
        }

        let Ok(parsed) = PasswordHash::new(&account.password_hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    fn generate_token(&self, account: &Account, purpose: TokenPurpose) -> ApiResult<String> {
        let now = Utc::now();
        let claims = PurposeClaims {
            sub: account.id.clone(),
            purpose: purpose.as_str().to_string(),
            stamp: self.security_stamp(account, purpose),
            iat: now.timestamp(),
            exp: (now + purpose.lifetime()).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))
    }

    fn validate_and_consume(&self, account: &Account, purpose: TokenPurpose, raw: &str) -> bool {
        let validation = Validation::new(Algorithm::HS256);

        let Ok(data) = decode::<PurposeClaims>(
            raw,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) else {
            return false;
        };

        data.claims.sub == account.id
            && data.claims.purpose == purpose.as_str()
            && data.claims.stamp == self.security_stamp(account, purpose)
    }
}
