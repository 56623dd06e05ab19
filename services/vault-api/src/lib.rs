//! Passvault Vault API
//!
//! HTTP service for the password vault's subscription layer.
//!
//! ## REST Endpoints
//!
//! - `POST /api/payment/webhook` - PayHere notify callback (signature authenticated)
//! - `POST /api/payment/create` - Signed PayHere checkout form
//! - `GET /api/v1/subscription/status` - Caller's subscription status
//! - `GET /api/v1/subscription/features` - Caller's tier and feature set
//! - `GET /api/v1/subscription/features/{capability}` - Single capability check
//! - `GET /api/v1/subscription/history` - Caller's payments
//! - `GET /api/v1/subscription/quota/{kind}` - Quota check with a caller count
//! - `GET|POST /api/v1/vault/{kind}`, `DELETE /api/v1/vault/{kind}/{id}` - Vault items
//! - `GET /api/v1/activity`, `GET /api/v1/activity/teams/{team_id}` - Activity logs
//! - `GET /api/v1/account` - Caller's account, provisioned on first request
//! - `GET|POST /api/v1/teams`, `GET|DELETE /api/v1/teams/{team_id}` - Teams
//! - `POST /api/v1/teams/{team_id}/members`, `DELETE .../members/{member_id}` - Membership
//! - `POST /api/v1/shares`, `GET /api/v1/shares/{received,sent}`, `DELETE /api/v1/shares/{id}` - Sharing
//! - `/api/v1/admin/*` - Admin bootstrap, account management and dashboard
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness
//! - `GET /ready` - Store reachability and gateway configuration
//! - `GET /metrics` - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod state;

use axum::routing::{delete, get, post, put};
use axum::Router;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use crate::config::{Config, ConfigError, StoreBackend};
pub use crate::state::AppState;

use crate::handlers::{health, ready};
use crate::metrics::{describe_metrics, LATENCY_BUCKETS, OPERATION_DURATION_SECONDS};

/// Build the HTTP router
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    let subscription = Router::new()
        .route("/status", get(handlers::get_subscription_status))
        .route("/features", get(handlers::get_features))
        .route("/features/{capability}", get(handlers::check_feature))
        .route("/history", get(handlers::get_history))
        .route("/quota/{kind}", get(handlers::check_quota));

    let admin = Router::new()
        .route("/init", post(handlers::init_admin))
        .route("/accounts", get(handlers::list_accounts))
        .route(
            "/accounts/{id}",
            get(handlers::get_account).delete(handlers::delete_account),
        )
        .route("/accounts/{id}/tier", put(handlers::update_tier))
        .route("/accounts/{id}/role", put(handlers::update_role))
        .route("/accounts/{id}/suspension", put(handlers::set_suspension))
        .route("/dashboard", get(handlers::get_dashboard));

    let api_v1 = Router::new()
        .nest("/subscription", subscription)
        .nest("/admin", admin)
        .route("/account", get(handlers::get_my_account))
        .route(
            "/vault/{kind}",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route("/vault/{kind}/{id}", delete(handlers::delete_item))
        .route("/activity", get(handlers::list_activity))
        .route("/activity/teams/{team_id}", get(handlers::list_team_activity))
        .route("/teams", get(handlers::list_teams).post(handlers::create_team))
        .route(
            "/teams/{team_id}",
            get(handlers::get_team).delete(handlers::delete_team),
        )
        .route("/teams/{team_id}/members", post(handlers::add_team_member))
        .route(
            "/teams/{team_id}/members/{member_id}",
            delete(handlers::remove_team_member),
        )
        .route("/shares", post(handlers::create_share))
        .route("/shares/received", get(handlers::list_received_shares))
        .route("/shares/sent", get(handlers::list_sent_shares))
        .route("/shares/{id}", delete(handlers::revoke_share));

    // Gateway callback plus checkout
    let payment = Router::new()
        .route("/webhook", post(handlers::payment_webhook))
        .route("/create", post(handlers::create_payment));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .nest("/api/v1", api_v1)
        .nest("/api/payment", payment)
        .layer(middleware)
        .merge(health_routes)
        .merge(metrics_route)
        .with_state(state)
}

/// Install the Prometheus recorder
pub fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(OPERATION_DURATION_SECONDS.to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()?;

    describe_metrics();

    Ok(handle)
}
