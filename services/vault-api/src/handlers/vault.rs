//! Vault item handlers

use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use passvault_core::{CoreError, NewVaultItem};
use passvault_types::{VaultItem, VaultKind};

use crate::auth::Principal;
use crate::error::{ApiError, ApiResult};
use crate::metrics::{record_op_duration, QUOTA_REJECTIONS_TOTAL};
use crate::state::AppState;

fn parse_kind(kind: &str) -> Result<VaultKind, ApiError> {
    kind.parse().map_err(ApiError::BadRequest)
}

/// GET /api/v1/vault/{kind}
pub async fn list_items(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    principal: Principal,
) -> ApiResult<Json<Vec<VaultItem>>> {
    let kind = parse_kind(&kind)?;
    let items = state.vault.list(&principal.account_id, kind).await?;
    Ok(Json(items))
}

/// POST /api/v1/vault/{kind}
///
/// 403 with `QUOTA_EXCEEDED` once the plan's limit is reached.
pub async fn create_item(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    principal: Principal,
    Json(item): Json<NewVaultItem>,
) -> ApiResult<(StatusCode, Json<VaultItem>)> {
    let start = Instant::now();
    let kind = parse_kind(&kind)?;

    let result = state.vault.create(&principal.account_id, kind, item).await;
    record_op_duration("vault_create", start, &result);

    if let Err(CoreError::QuotaExceeded { .. }) = &result {
        metrics::counter!(QUOTA_REJECTIONS_TOTAL, "kind" => kind.collection()).increment(1);
    }

    Ok((StatusCode::CREATED, Json(result?)))
}

/// DELETE /api/v1/vault/{kind}/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    principal: Principal,
) -> ApiResult<StatusCode> {
    let kind = parse_kind(&kind)?;
    state.vault.delete(&principal.account_id, kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
