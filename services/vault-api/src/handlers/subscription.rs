//! Subscription and entitlement handlers

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use passvault_types::{
    Capability, CapabilityParseError, Decision, FeatureSet, PaymentRecord, SubscriptionStatus, Tier,
    VaultKind,
};

use crate::auth::Principal;
use crate::error::{ApiError, ApiResult};
use crate::metrics::record_op_duration;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub tier: Tier,
    #[serde(flatten)]
    pub status: SubscriptionStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesResponse {
    pub tier: Tier,
    pub features: FeatureSet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityResponse {
    pub capability: Capability,
    pub allowed: bool,
    pub decision: Decision,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct QuotaQuery {
    #[serde(default)]
    pub current: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaResponse {
    pub kind: VaultKind,
    pub current: u64,
    /// `None` when unlimited
    pub limit: Option<u32>,
    pub can_add: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/subscription/status
pub async fn get_subscription_status(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<StatusResponse>> {
    let account = state.gate.account(&principal.account_id).await?;
    let status = state.gate.subscription_status(&principal.account_id).await;

    Ok(Json(StatusResponse {
        tier: account.subscription_tier,
        status,
    }))
}

/// GET /api/v1/subscription/features
pub async fn get_features(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<FeaturesResponse>> {
    let account = state.gate.account(&principal.account_id).await?;
    let tier = account.subscription_tier;

    Ok(Json(FeaturesResponse {
        tier,
        features: tier.features(),
    }))
}

/// GET /api/v1/subscription/features/{capability}
pub async fn check_feature(
    State(state): State<AppState>,
    Path(capability): Path<String>,
    principal: Principal,
) -> ApiResult<Json<CapabilityResponse>> {
    let capability: Capability = capability
        .parse()
        .map_err(|e: CapabilityParseError| ApiError::BadRequest(e.to_string()))?;

    let check = state.gate.check(&principal.account_id, capability).await;

    Ok(Json(CapabilityResponse {
        capability: check.capability,
        allowed: check.allowed,
        decision: check.decision,
        reason: check.reason,
    }))
}

/// GET /api/v1/subscription/history
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
    principal: Principal,
) -> ApiResult<Json<Vec<PaymentRecord>>> {
    let start = Instant::now();
    let result = state
        .billing
        .subscription_history(&principal.account_id, query.limit)
        .await;
    record_op_duration("subscription_history", start, &result);

    Ok(Json(result?))
}

/// GET /api/v1/subscription/quota/{kind}?current=N
///
/// Answers with the caller-supplied count; creation enforces its own count.
pub async fn check_quota(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<QuotaQuery>,
    principal: Principal,
) -> ApiResult<Json<QuotaResponse>> {
    let kind: VaultKind = kind.parse().map_err(ApiError::BadRequest)?;

    let quota = state.gate.quota(kind, &principal.account_id).await?;
    let can_add = match kind {
        VaultKind::Password => {
            state
                .gate
                .can_add_password(&principal.account_id, query.current)
                .await
        }
        VaultKind::PersonalInfo => {
            state
                .gate
                .can_add_personal_info(&principal.account_id, query.current)
                .await
        }
    };

    Ok(Json(QuotaResponse {
        kind,
        current: query.current,
        limit: quota.limit(),
        can_add,
    }))
}
