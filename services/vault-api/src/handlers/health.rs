//! Service status endpoints
//!
//! `/health` answers from process state alone. `/ready` makes a round trip
//! to the record store and reports whether gateway credentials are set.
//! Missing credentials report `degraded` with a 200.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::config::StoreBackend;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    /// `ready`, `degraded` or `unavailable`
    pub status: &'static str,
    pub store: &'static str,
    pub store_reachable: bool,
    pub payments_configured: bool,
}

fn backend_name(backend: StoreBackend) -> &'static str {
    match backend {
        StoreBackend::Postgres => "postgres",
        StoreBackend::Memory => "memory",
    }
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        store: backend_name(state.config.store_backend),
    })
}

/// GET /ready
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let store_reachable = match state.repos.check_store().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Record store check failed");
            false
        }
    };
    let payments_configured = state.config.payhere.credentials().is_ok();

    let (code, status) = match (store_reachable, payments_configured) {
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        (true, false) => (StatusCode::OK, "degraded"),
        (true, true) => (StatusCode::OK, "ready"),
    };

    (
        code,
        Json(ReadyResponse {
            status,
            store: backend_name(state.config.store_backend),
            store_reachable,
            payments_configured,
        }),
    )
}
