//! Admin handlers
//!
//! Every route here is behind the admin gate; the check lives in
//! [`AdminService`](passvault_core::AdminService).

use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use passvault_core::AdminDashboard;
use passvault_types::{Account, AccountId, Role, Tier};

use crate::auth::Principal;
use crate::error::{ApiError, ApiResult};
use crate::metrics::record_op_duration;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTierRequest {
    pub tier: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct SuspensionRequest {
    pub suspended: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/admin/init
///
/// Makes the caller the first admin. Refused once an admin exists, unless
/// the caller is one.
pub async fn init_admin(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<Account>> {
    let email = principal.email.clone().unwrap_or_default();
    let account = state.admin.init_admin(&principal.account_id, &email).await?;
    Ok(Json(account))
}

/// GET /api/v1/admin/accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<Vec<Account>>> {
    let accounts = state.admin.list_accounts(&principal.account_id).await?;
    Ok(Json(accounts))
}

/// GET /api/v1/admin/accounts/{id}
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    principal: Principal,
) -> ApiResult<Json<Account>> {
    let account = state
        .admin
        .get_account(&principal.account_id, &AccountId::new(id))
        .await?;
    Ok(Json(account))
}

/// PUT /api/v1/admin/accounts/{id}/tier
pub async fn update_tier(
    State(state): State<AppState>,
    Path(id): Path<String>,
    principal: Principal,
    Json(req): Json<UpdateTierRequest>,
) -> ApiResult<Json<Account>> {
    let start = Instant::now();

    let tier: Tier = req
        .tier
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid tier: {}", req.tier)))?;

    let result = state
        .admin
        .update_tier(&principal.account_id, &AccountId::new(id), tier, req.expires_at)
        .await;
    record_op_duration("admin_update_tier", start, &result);

    Ok(Json(result?))
}

/// PUT /api/v1/admin/accounts/{id}/role
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    principal: Principal,
    Json(req): Json<UpdateRoleRequest>,
) -> ApiResult<Json<Account>> {
    let role: Role = req
        .role
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid role: {}", req.role)))?;

    let account = state
        .admin
        .update_role(&principal.account_id, &AccountId::new(id), role)
        .await?;
    Ok(Json(account))
}

/// PUT /api/v1/admin/accounts/{id}/suspension
pub async fn set_suspension(
    State(state): State<AppState>,
    Path(id): Path<String>,
    principal: Principal,
    Json(req): Json<SuspensionRequest>,
) -> ApiResult<Json<Account>> {
    let account = state
        .admin
        .set_suspension(&principal.account_id, &AccountId::new(id), req.suspended)
        .await?;
    Ok(Json(account))
}

/// DELETE /api/v1/admin/accounts/{id}
pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    principal: Principal,
) -> ApiResult<StatusCode> {
    let start = Instant::now();
    let result = state
        .admin
        .delete_account(&principal.account_id, &AccountId::new(id))
        .await;
    record_op_duration("admin_delete_account", start, &result);

    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<AdminDashboard>> {
    let start = Instant::now();
    let result = state.admin.dashboard(&principal.account_id).await;
    record_op_duration("admin_dashboard", start, &result);

    Ok(Json(result?))
}
