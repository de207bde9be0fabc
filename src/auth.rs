/// Authentication extractors
use crate::{
    api::middleware::extract_bearer_token,
    context::AppContext,
    error::ApiError,
    token::AccessClaims,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Authenticated context - extracts and verifies the bearer token
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account_id: String,
    pub claims: AccessClaims,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let claims = state.access_tokens.decode(&token)?;
        let account_id = claims.sub.clone();

        Ok(AuthContext { account_id, claims })
    }
}

/// Refresh context - accepts an expired access token, since refresh is
/// exactly the moment the access token has run out. Only the signature and
/// issuer still have to hold; possession of the cookie does the rest.
#[derive(Debug, Clone)]
pub struct RefreshAuthContext {
    pub account_id: String,
}

#[async_trait]
impl FromRequestParts<AppContext> for RefreshAuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let claims = state.access_tokens.decode_expired_tolerant(&token)?;

        Ok(RefreshAuthContext {
            account_id: claims.sub,
        })
    }
}
