//! PayHere payment handlers

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Serialize;
use serde_json::Value;

use passvault_billing_core::{BillingError, CheckoutForm, CheckoutRequest, PayHereNotification};

use crate::auth::Principal;
use crate::error::ApiResult;
use crate::metrics::record_op_duration;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAccepted {
    pub status: &'static str,
    pub order_id: String,
    pub plan: String,
}

/// Webhook failure body, `{error, details}`
#[derive(Debug, Serialize)]
pub struct WebhookRejected {
    pub error: &'static str,
    pub details: String,
}

impl WebhookRejected {
    fn response(err: &BillingError) -> Response {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let details = if err.is_retryable() {
            tracing::error!(error = ?err, "Webhook processing failed");
            "Internal error".to_string()
        } else {
            tracing::warn!(error = %err, "Webhook rejected");
            err.to_string()
        };

        let body = Self {
            error: err.summary(),
            details,
        };
        (status, Json(body)).into_response()
    }
}

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

async fn read_notification(request: Request) -> Result<PayHereNotification, BillingError> {
    if is_form(&request) {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, &())
            .await
            .map_err(|e| BillingError::MalformedPayload(e.body_text()))?;
        PayHereNotification::from_form(pairs)
    } else {
        let body = Bytes::from_request(request, &())
            .await
            .map_err(|e| BillingError::MalformedPayload(e.body_text()))?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| BillingError::MalformedPayload(e.to_string()))?;
        PayHereNotification::from_value(value)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/payment/webhook
///
/// PayHere notify callback, JSON or form encoded. Authenticated by signature.
pub async fn payment_webhook(State(state): State<AppState>, request: Request) -> Response {
    let start = Instant::now();

    let result = match read_notification(request).await {
        Ok(notification) => state.billing.process_notification(notification).await,
        Err(e) => Err(e),
    };
    record_op_duration("payment_webhook", start, &result);

    match result {
        Ok(outcome) => Json(WebhookAccepted {
            status: "success",
            order_id: outcome.order_id,
            plan: outcome.plan.to_string(),
        })
        .into_response(),
        Err(e) => WebhookRejected::response(&e),
    }
}

/// POST /api/payment/create
///
/// Signed checkout form for the caller
pub async fn create_payment(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<Json<CheckoutForm>> {
    let start = Instant::now();

    let email = principal.email.clone().unwrap_or_default();
    let result = state
        .billing
        .create_checkout(&principal.account_id, &email, request);
    record_op_duration("create_payment", start, &result);

    Ok(Json(result?))
}
