/// /auth/* endpoints: sessions and the emailed token flows
use crate::{
    account::{
        AuthenticatedUser, ConfirmEmailRequest, EmailRequest, LoginRequest, RegisterRequest,
        ResetPasswordRequest,
    },
    api::middleware,
    auth::RefreshAuthContext,
    context::AppContext,
    error::{ApiError, ApiResult},
    session::SessionTokens,
};
use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use validator::Validate;

/// Build authentication routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/logout", post(logout))
        .route("/auth/register", post(register))
        .route("/auth/confirm-email", post(confirm_email))
        .route("/auth/resend-confirm-email-link", post(resend_confirmation))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/set-password", post(set_password))
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

/// Body plus the Set-Cookie header carrying the rotated refresh token
fn session_response(tokens: SessionTokens) -> ApiResult<(HeaderMap, Json<AuthenticatedUser>)> {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, middleware::refresh_cookie_header(&tokens.refresh)?);
    Ok((headers, Json(tokens.user)))
}

/// Login endpoint
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(HeaderMap, Json<AuthenticatedUser>)> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let tokens = ctx.sessions.login(&req.email, &req.password).await?;
    session_response(tokens)
}

/// Exchange the refresh cookie plus an (expired-allowed) access token for a
/// fresh pair. Rotation means the presented cookie is dead afterwards.
async fn refresh_token(
    State(ctx): State<AppContext>,
    auth: RefreshAuthContext,
    headers: HeaderMap,
) -> ApiResult<(HeaderMap, Json<AuthenticatedUser>)> {
    let cookie =
        middleware::extract_refresh_cookie(&headers).ok_or(ApiError::TokenInvalidOrExpired)?;

    let tokens = ctx.sessions.refresh(&auth.account_id, &cookie).await?;
    session_response(tokens)
}

/// Logout clears the cookie; the stored refresh token is left to expire or
/// be overwritten by the next login.
async fn logout() -> (HeaderMap, Json<MessageResponse>) {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, middleware::clear_refresh_cookie_header());
    (headers, message("Logged out"))
}

/// Register a new company and its Owner account
async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    ctx.invitations.register(&req).await?;
    Ok(message("Account created, please confirm your email"))
}

/// Consume an emailed confirmation token
async fn confirm_email(
    State(ctx): State<AppContext>,
    Json(req): Json<ConfirmEmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    ctx.invitations.confirm_email(&req).await?;
    Ok(message("Email confirmed, you can now login"))
}

/// Re-send the confirmation link
async fn resend_confirmation(
    State(ctx): State<AppContext>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    ctx.invitations.resend_confirmation(&req.email).await?;
    Ok(message("Confirmation email sent"))
}

/// Email a password-reset link
async fn forgot_password(
    State(ctx): State<AppContext>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    ctx.invitations.forgot_password(&req.email).await?;
    Ok(message("Password reset email sent"))
}

/// Consume a reset token and change the password
async fn reset_password(
    State(ctx): State<AppContext>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    ctx.invitations.reset_password(&req).await?;
    Ok(message("Password updated, please login"))
}

/// Invitation variant: choose the first password for a pending account
async fn set_password(
    State(ctx): State<AppContext>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    ctx.invitations.set_password(&req).await?;
    Ok(message("Password set, please confirm your email and login"))
}
