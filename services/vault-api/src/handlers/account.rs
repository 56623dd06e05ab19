//! Caller account handler

use axum::extract::State;
use axum::Json;

use passvault_types::Account;

use crate::auth::Principal;
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/v1/account
///
/// The caller's own account; created on the free plan if this is the
/// caller's first request.
pub async fn get_my_account(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<Account>> {
    let account = state.gate.account(&principal.account_id).await?;
    Ok(Json(account))
}
