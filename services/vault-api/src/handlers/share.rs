//! Password sharing handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use passvault_core::{NewShare, SharedItem};
use passvault_types::PasswordShare;

use crate::auth::Principal;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/v1/shares
///
/// Body names either `recipientEmail` (premium and up) or `teamId`
/// (business, team admins).
pub async fn create_share(
    State(state): State<AppState>,
    principal: Principal,
    Json(share): Json<NewShare>,
) -> ApiResult<(StatusCode, Json<PasswordShare>)> {
    let share = state.shares.share(&principal.account_id, share).await?;
    Ok((StatusCode::CREATED, Json(share)))
}

/// GET /api/v1/shares/received
pub async fn list_received_shares(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<Vec<SharedItem>>> {
    let shares = state.shares.received(&principal.account_id).await?;
    Ok(Json(shares))
}

/// GET /api/v1/shares/sent
pub async fn list_sent_shares(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<Vec<PasswordShare>>> {
    let shares = state.shares.sent(&principal.account_id).await?;
    Ok(Json(shares))
}

/// DELETE /api/v1/shares/{id}
pub async fn revoke_share(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> ApiResult<StatusCode> {
    state.shares.revoke(&principal.account_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
