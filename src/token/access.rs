/// Short-lived signed access tokens
///
/// Stateless and unrevocable before expiry by design; revocation is achieved
/// by not renewing through the refresh flow.
use crate::{
    config::AuthConfig,
    db::models::Account,
    error::{ApiError, ApiResult},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claim set carried by every access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Account id
    pub sub: String,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed token together with its expiry instant
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Builds and verifies HMAC-signed access tokens
#[derive(Clone)]
pub struct AccessTokenIssuer {
    signing_key: String,
    issuer: String,
    minutes: i64,
}

impl AccessTokenIssuer {
    pub fn new(auth: &AuthConfig) -> Self {
        Self {
            signing_key: auth.signing_key.clone(),
            issuer: auth.issuer.clone(),
            minutes: auth.access_token_minutes,
        }
    }

    /// Sign a token for the account. Expiry is issuance + configured
    /// minutes; the key comes from configuration and is never per-account.
    pub fn issue(&self, account: &Account) -> ApiResult<IssuedAccessToken> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.minutes);

        let claims = AccessClaims {
            sub: account.id.clone(),
            email: account.email.clone(),
            given_name: account.first_name.clone(),
            family_name: account.last_name.clone(),
            role: account.role.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(self.signing_key.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to sign access token: {}", e)))?;

        Ok(IssuedAccessToken { token, expires_at })
    }

    /// Strict verification: signature, expiry, issuer
    pub fn decode(&self, token: &str) -> ApiResult<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.set_issuer(&[&self.issuer]);

        self.decode_with(token, validation)
    }

    /// Verification for the refresh path: the bearer token may already have
    /// expired, but its signature and issuer must still hold.
    pub fn decode_expired_tolerant(&self, token: &str) -> ApiResult<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_exp = false;

        self.decode_with(token, validation)
    }

    fn decode_with(&self, token: &str, validation: Validation) -> ApiResult<AccessClaims> {
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.signing_key.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("access token rejected: {}", e);
            ApiError::TokenInvalidOrExpired
        })
    }
}
