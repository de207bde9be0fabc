/// /users endpoints: tenant-scoped listing, invitation, and removal
use crate::{
    account::{view_from_account, InviteRequest, ViewAccount},
    auth::AuthContext,
    context::AppContext,
    db::models::AccountRole,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use validator::Validate;

/// Build user routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/users", get(list_users).post(invite_user))
        .route("/users/:id", delete(delete_user))
}

/// List the accounts of the caller's company. The company filter comes from
/// the caller's own record, never from the request.
async fn list_users(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<ViewAccount>>> {
    let caller = resolve_caller(&ctx, &auth).await?;

    let accounts = ctx.accounts.list_by_company(caller.company_id).await?;
    Ok(Json(accounts.iter().map(view_from_account).collect()))
}

/// Invite a teammate into the caller's company
async fn invite_user(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(req): Json<InviteRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    ctx.invitations.invite(&auth.account_id, &req).await?;
    Ok(Json(serde_json::json!({ "message": "Invitation sent" })))
}

/// Soft-delete a teammate. The target is looked up inside the caller's own
/// company, so an id from another tenant comes back as not found.
async fn delete_user(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(user_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let caller = resolve_caller(&ctx, &auth).await?;

    if caller.role == AccountRole::User {
        return Err(ApiError::Unauthorized(
            "Only admins and owners can remove accounts".to_string(),
        ));
    }
    if caller.id == user_id {
        return Err(ApiError::Validation(
            "You cannot remove your own account".to_string(),
        ));
    }

    ctx.accounts.soft_delete(caller.company_id, &user_id).await?;
    Ok(Json(serde_json::json!({ "message": "Account removed" })))
}

async fn resolve_caller(
    ctx: &AppContext,
    auth: &AuthContext,
) -> ApiResult<crate::db::models::Account> {
    ctx.accounts
        .find_by_id(&auth.account_id)
        .await?
        .filter(|a| !a.is_deleted)
        .ok_or(ApiError::AccountNotFound)
}
