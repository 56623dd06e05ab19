//! Router tests over the in-memory store

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use passvault_billing_core::signature::notification_signature;
use passvault_billing_core::{Credentials, PayHereConfig};
use passvault_db::memory::MemoryStore;
use passvault_db::{AccountRepository, PaymentRepository, PoolOptions, Repositories};
use vault_api::auth::Claims;
use vault_api::{build_router, AppState, Config, StoreBackend};

const JWT_SECRET: &str = "test-jwt-secret";
const MERCHANT_ID: &str = "1211149";
const MERCHANT_SECRET: &str = "merchant-secret";

// ============================================================================
// Fixtures
// ============================================================================

fn config(payhere: PayHereConfig) -> Config {
    Config {
        http_port: 0,
        store_backend: StoreBackend::Memory,
        database_url: None,
        pool: PoolOptions::default(),
        request_timeout: Duration::from_secs(5),
        metrics_enabled: false,
        jwt_secret: JWT_SECRET.to_string(),
        payhere,
    }
}

fn payhere() -> PayHereConfig {
    PayHereConfig::new("LKR").with_credentials(MERCHANT_ID, MERCHANT_SECRET)
}

/// Store seeded with a free user, a premium user and a suspended free admin
fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_account(MemoryStore::account_row("acct123", "free@example.com", "user", "free"));
    store.insert_account(MemoryStore::account_row("prem1", "prem@example.com", "user", "premium"));
    let mut admin = MemoryStore::account_row("admin1", "admin@example.com", "admin", "free");
    admin.is_suspended = true;
    store.insert_account(admin);
    store
}

fn app_with(store: MemoryStore, payhere: PayHereConfig) -> (Router, Repositories) {
    let repos = Repositories::from_memory(store);
    let state = AppState::new(repos.clone(), config(payhere));
    (build_router(state, None), repos)
}

fn app() -> (Router, Repositories) {
    app_with(seeded_store(), payhere())
}

fn token(sub: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        email: Some(format!("{sub}@example.com")),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn get(uri: &str, sub: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token(sub)))
        .body(Body::empty())
        .unwrap()
}

fn send_json(method: Method, uri: &str, sub: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(sub) = sub {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(sub)));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn webhook_body(order_id: &str, amount: &str, currency: &str, status: &str, plan: &str) -> Value {
    let creds = Credentials {
        merchant_id: MERCHANT_ID,
        merchant_secret: MERCHANT_SECRET,
    };
    json!({
        "merchant_id": MERCHANT_ID,
        "order_id": order_id,
        "payment_id": "320025071234",
        "payhere_amount": amount,
        "payhere_currency": currency,
        "status_code": status,
        "md5sig": notification_signature(creds, order_id, amount, currency, status),
        "custom_1": plan,
        "custom_2": order_id,
    })
}

// ============================================================================
// Health and auth
// ============================================================================

#[tokio::test]
async fn test_health_and_ready() {
    let (app, _) = app();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");

    let request = Request::builder().uri("/ready").body(Body::empty()).unwrap();
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["storeReachable"], true);
    assert_eq!(body["paymentsConfigured"], true);
}

#[tokio::test]
async fn test_ready_is_degraded_without_gateway_credentials() {
    let (app, _) = app_with(seeded_store(), PayHereConfig::new("LKR"));

    let request = Request::builder().uri("/ready").body(Body::empty()).unwrap();
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["storeReachable"], true);
    assert_eq!(body["paymentsConfigured"], false);
}

#[tokio::test]
async fn test_missing_or_bad_token_is_401() {
    let (app, _) = app();

    let request = Request::builder()
        .uri("/api/v1/subscription/status")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let request = Request::builder()
        .uri("/api/v1/subscription/status")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Webhook
// ============================================================================

#[tokio::test]
async fn test_webhook_activates_premium() {
    let (app, repos) = app();
    let body = webhook_body("ORDER_acct123_1700000000", "2500.00", "LKR", "2", "Premium");

    let (status, response) = call(&app, send_json(Method::POST, "/api/payment/webhook", None, &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "success");
    assert_eq!(response["orderId"], "ORDER_acct123_1700000000");
    assert_eq!(response["plan"], "premium");

    let (status, sub) = call(&app, get("/api/v1/subscription/status", "acct123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sub["tier"], "premium");
    assert_eq!(sub["isActive"], true);
    assert_eq!(sub["daysUntilExpiration"], 30);

    let (_, history) = call(&app, get("/api/v1/subscription/history", "acct123")).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["status"], "succeeded");

    // Redelivery is acknowledged without a second payment
    let (status, _) = call(&app, send_json(Method::POST, "/api/payment/webhook", None, &body)).await;
    assert_eq!(status, StatusCode::OK);
    let payments = repos.payments.list_by_user("acct123", 10).await.unwrap();
    assert_eq!(payments.len(), 1);
}

#[tokio::test]
async fn test_webhook_accepts_form_encoding() {
    let (app, repos) = app();
    let body = webhook_body("ORDER_acct123_1700000001", "9000.00", "USD", "2", "business");

    let form = body
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| format!("{k}={}", v.as_str().unwrap()))
        .collect::<Vec<_>>()
        .join("&");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/payment/webhook")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();

    let (status, response) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["plan"], "business");

    let account = repos.accounts.find_by_id("acct123").await.unwrap().unwrap();
    assert_eq!(account.subscription_tier, "business");
}

#[tokio::test]
async fn test_webhook_bad_signature_changes_nothing() {
    let (app, repos) = app();
    let mut body = webhook_body("ORDER_acct123_1700000000", "2500.00", "LKR", "2", "Premium");
    body["md5sig"] = json!("DEADBEEF");

    let (status, response) = call(&app, send_json(Method::POST, "/api/payment/webhook", None, &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Invalid signature");

    let account = repos.accounts.find_by_id("acct123").await.unwrap().unwrap();
    assert_eq!(account.subscription_tier, "free");
    assert!(account.subscription_expires_at.is_none());
    assert!(repos.payments.list_by_user("acct123", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_webhook_error_statuses() {
    let (app, _) = app();

    let failed = webhook_body("ORDER_acct123_1", "10.00", "LKR", "-2", "premium");
    let (status, response) = call(&app, send_json(Method::POST, "/api/payment/webhook", None, &failed)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Payment failed");

    let bad_order = webhook_body("bogus", "10.00", "LKR", "2", "premium");
    let (status, response) = call(&app, send_json(Method::POST, "/api/payment/webhook", None, &bad_order)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Invalid order ID format");

    let unknown = webhook_body("ORDER_ghost_1", "10.00", "LKR", "2", "premium");
    let (status, _) = call(&app, send_json(Method::POST, "/api/payment/webhook", None, &unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/payment/webhook")
        .body(Body::from("not json"))
        .unwrap();
    let (status, response) = call(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Malformed notification");
}

#[tokio::test]
async fn test_webhook_without_credentials_is_500() {
    let (app, _) = app_with(seeded_store(), PayHereConfig::new("LKR"));
    let body = webhook_body("ORDER_acct123_1700000000", "2500.00", "LKR", "2", "Premium");

    let (status, _) = call(&app, send_json(Method::POST, "/api/payment/webhook", None, &body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_create_payment_form() {
    let (app, _) = app();
    let request = json!({
        "plan": "premium",
        "amount": "2500",
        "origin": "https://vault.example.com",
        "firstName": "Ada",
        "lastName": "Lovelace",
    });

    let (status, form) = call(&app, send_json(Method::POST, "/api/payment/create", Some("acct123"), &request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(form["merchant_id"], MERCHANT_ID);
    assert_eq!(form["amount"], "2500.00");
    assert_eq!(form["currency"], "LKR");
    assert_eq!(form["email"], "acct123@example.com");
    assert!(form["order_id"].as_str().unwrap().starts_with("ORDER_acct123_"));
    assert_eq!(form["hash"].as_str().unwrap().len(), 32);

    let free = json!({ "plan": "free", "amount": "1", "origin": "https://vault.example.com" });
    let (status, body) = call(&app, send_json(Method::POST, "/api/payment/create", Some("acct123"), &free)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UNSUPPORTED_PLAN");
}

// ============================================================================
// Entitlements and vault
// ============================================================================

#[tokio::test]
async fn test_feature_checks() {
    let (app, _) = app();

    let (status, body) = call(&app, get("/api/v1/subscription/features/hasExport", "acct123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], false);
    assert!(body["reason"].as_str().unwrap().contains("premium"));

    let (_, body) = call(&app, get("/api/v1/subscription/features/hasExport", "prem1")).await;
    assert_eq!(body["allowed"], true);

    let (status, _) = call(&app, get("/api/v1/subscription/features/teleport", "prem1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = call(&app, get("/api/v1/subscription/features", "acct123")).await;
    assert_eq!(body["tier"], "free");
    assert_eq!(body["features"]["hasTeamFeatures"], false);
}

#[tokio::test]
async fn test_quota_query_uses_caller_count() {
    let (app, _) = app();

    let (_, body) = call(&app, get("/api/v1/subscription/quota/passwords?current=3", "acct123")).await;
    assert_eq!(body["canAdd"], false);
    assert_eq!(body["limit"], 3);

    let (_, body) = call(&app, get("/api/v1/subscription/quota/passwords?current=2", "acct123")).await;
    assert_eq!(body["canAdd"], true);

    let (_, body) = call(&app, get("/api/v1/subscription/quota/personal-info?current=500", "prem1")).await;
    assert_eq!(body["canAdd"], true);
    assert!(body["limit"].is_null());
}

#[tokio::test]
async fn test_vault_create_enforces_quota() {
    let (app, _) = app();
    let item = json!({ "label": "bank", "payload": "ciphertext" });

    for _ in 0..3 {
        let (status, _) = call(&app, send_json(Method::POST, "/api/v1/vault/passwords", Some("acct123"), &item)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = call(&app, send_json(Method::POST, "/api/v1/vault/passwords", Some("acct123"), &item)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "QUOTA_EXCEEDED");

    let (_, items) = call(&app, get("/api/v1/vault/passwords", "acct123")).await;
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 3);

    let id = items[0]["id"].as_str().unwrap();
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/v1/vault/passwords/{id}"))
        .header(header::AUTHORIZATION, format!("Bearer {}", token("acct123")))
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&app, send_json(Method::POST, "/api/v1/vault/passwords", Some("acct123"), &item)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_team_item_requires_business() {
    let (app, _) = app();
    let item = json!({ "label": "shared", "payload": "ciphertext", "teamId": "team-1" });

    let (status, body) = call(&app, send_json(Method::POST, "/api/v1/vault/passwords", Some("prem1"), &item)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "UPGRADE_REQUIRED");
}

#[tokio::test]
async fn test_activity_is_empty_without_plan_feature() {
    let (app, _) = app();
    let item = json!({ "label": "bank", "payload": "ciphertext" });

    call(&app, send_json(Method::POST, "/api/v1/vault/passwords", Some("acct123"), &item)).await;
    let (_, logs) = call(&app, get("/api/v1/activity", "acct123")).await;
    assert!(logs.as_array().unwrap().is_empty());

    call(&app, send_json(Method::POST, "/api/v1/vault/passwords", Some("prem1"), &item)).await;
    let (_, logs) = call(&app, get("/api/v1/activity?actions=password_create", "prem1")).await;
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["action"], "password_create");

    let (status, _) = call(&app, get("/api/v1/activity?actions=teleport", "prem1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fresh_principal_is_provisioned_as_free() {
    let (app, repos) = app();
    let item = json!({ "label": "bank", "payload": "ciphertext" });

    let (status, _) = call(&app, send_json(Method::POST, "/api/v1/vault/passwords", Some("newbie"), &item)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, get("/api/v1/subscription/quota/passwords?current=0", "newbie")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["canAdd"], true);
    assert_eq!(body["limit"], 3);

    let (status, account) = call(&app, get("/api/v1/account", "newbie")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["subscriptionTier"], "free");
    assert_eq!(account["email"], "newbie@example.com");

    // The first payment finds the provisioned account
    let body = webhook_body("ORDER_newbie_1700000000", "2500.00", "LKR", "2", "premium");
    let (status, response) = call(&app, send_json(Method::POST, "/api/payment/webhook", None, &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["plan"], "premium");

    let account = repos.accounts.find_by_id("newbie").await.unwrap().unwrap();
    assert_eq!(account.subscription_tier, "premium");
}

// ============================================================================
// Teams and sharing
// ============================================================================

fn store_with_business() -> MemoryStore {
    let store = seeded_store();
    store.insert_account(MemoryStore::account_row("biz1", "biz@example.com", "user", "business"));
    store
}

#[tokio::test]
async fn test_team_logs_are_members_only() {
    let (app, _) = app_with(store_with_business(), payhere());

    let (status, team) = call(&app, send_json(Method::POST, "/api/v1/teams", Some("biz1"), &json!({ "name": "Acme" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let team_id = team["id"].as_str().unwrap().to_string();
    assert_eq!(team["members"][0]["role"], "owner");

    let item = json!({ "label": "shared", "payload": "ciphertext", "teamId": team_id });
    let (status, _) = call(&app, send_json(Method::POST, "/api/v1/vault/passwords", Some("biz1"), &item)).await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/v1/activity/teams/{team_id}");
    let (status, body) = call(&app, get(&uri, "prem1")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "ACCESS_DENIED");

    let (status, logs) = call(&app, get(&uri, "biz1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!logs.as_array().unwrap().is_empty());

    let (status, body) = call(&app, get("/api/v1/teams/nope", "biz1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TEAM_NOT_FOUND");
}

#[tokio::test]
async fn test_team_membership_routes() {
    let (app, _) = app_with(store_with_business(), payhere());

    let (_, team) = call(&app, send_json(Method::POST, "/api/v1/teams", Some("biz1"), &json!({ "name": "Acme" }))).await;
    let team_id = team["id"].as_str().unwrap().to_string();
    let members_uri = format!("/api/v1/teams/{team_id}/members");

    let bad_role = json!({ "email": "prem@example.com", "role": "overlord" });
    let (status, _) = call(&app, send_json(Method::POST, &members_uri, Some("biz1"), &bad_role)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let add = json!({ "email": "prem@example.com" });
    let (status, team) = call(&app, send_json(Method::POST, &members_uri, Some("biz1"), &add)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(team["members"].as_array().unwrap().len(), 2);

    let (status, body) = call(&app, send_json(Method::POST, &members_uri, Some("biz1"), &add)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (_, teams) = call(&app, get("/api/v1/teams", "prem1")).await;
    assert_eq!(teams.as_array().unwrap().len(), 1);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("{members_uri}/prem1"))
        .header(header::AUTHORIZATION, format!("Bearer {}", token("prem1")))
        .body(Body::empty())
        .unwrap();
    let (status, team) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(team["members"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_sharing_routes() {
    let (app, _) = app();
    let item = json!({ "label": "wifi", "payload": "ciphertext" });

    let (_, own) = call(&app, send_json(Method::POST, "/api/v1/vault/passwords", Some("acct123"), &item)).await;
    let share = json!({ "passwordId": own["id"], "recipientEmail": "prem@example.com" });
    let (status, body) = call(&app, send_json(Method::POST, "/api/v1/shares", Some("acct123"), &share)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "UPGRADE_REQUIRED");

    let (_, password) = call(&app, send_json(Method::POST, "/api/v1/vault/passwords", Some("prem1"), &item)).await;
    let share = json!({ "passwordId": password["id"], "recipientEmail": "free@example.com" });
    let (status, created) = call(&app, send_json(Method::POST, "/api/v1/shares", Some("prem1"), &share)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["sharedWith"], "acct123");
    assert_eq!(created["permission"], "read");

    let (_, received) = call(&app, get("/api/v1/shares/received", "acct123")).await;
    let received = received.as_array().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["item"]["id"], password["id"]);

    let (_, sent) = call(&app, get("/api/v1/shares/sent", "prem1")).await;
    assert_eq!(sent.as_array().unwrap().len(), 1);

    let share_id = created["id"].as_str().unwrap();
    let revoke = |sub: &str| {
        Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/v1/shares/{share_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {}", token(sub)))
            .body(Body::empty())
            .unwrap()
    };
    let (status, _) = call(&app, revoke("acct123")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, revoke("prem1")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, received) = call(&app, get("/api/v1/shares/received", "acct123")).await;
    assert!(received.as_array().unwrap().is_empty());
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let (app, _) = app();

    for uri in ["/api/v1/admin/dashboard", "/api/v1/admin/accounts"] {
        let (status, body) = call(&app, get(uri, "prem1")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "Admin access required");
    }
}

#[tokio::test]
async fn test_suspended_admin_keeps_dashboard() {
    let (app, _) = app();

    let (status, body) = call(&app, get("/api/v1/admin/dashboard", "admin1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accountStats"]["totalAccounts"], 3);
    assert_eq!(body["accountStats"]["adminAccounts"], 1);
}

#[tokio::test]
async fn test_admin_manages_accounts() {
    let (app, repos) = app();

    let tier = json!({ "tier": "business" });
    let (status, account) = call(&app, send_json(Method::PUT, "/api/v1/admin/accounts/acct123/tier", Some("admin1"), &tier)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["subscriptionTier"], "business");
    assert!(account["subscriptionExpiresAt"].is_string());

    let bad = json!({ "tier": "platinum" });
    let (status, _) = call(&app, send_json(Method::PUT, "/api/v1/admin/accounts/acct123/tier", Some("admin1"), &bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let suspend = json!({ "suspended": true });
    let (status, account) = call(&app, send_json(Method::PUT, "/api/v1/admin/accounts/prem1/suspension", Some("admin1"), &suspend)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["isSuspended"], true);

    let (_, body) = call(&app, get("/api/v1/subscription/features/hasExport", "prem1")).await;
    assert_eq!(body["allowed"], false);
    assert_eq!(body["reason"], "Account is suspended");

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/v1/admin/accounts/prem1")
        .header(header::AUTHORIZATION, format!("Bearer {}", token("admin1")))
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(repos.accounts.find_by_id("prem1").await.unwrap().is_none());

    let (status, _) = call(&app, get("/api/v1/admin/accounts/prem1", "admin1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_init_bootstrap() {
    let (app, repos) = app_with(MemoryStore::new(), payhere());

    let (status, account) = call(&app, send_json(Method::POST, "/api/v1/admin/init", Some("first"), &json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["role"], "admin");
    assert_eq!(account["subscriptionTier"], "business");
    assert!(repos.accounts.any_admin().await.unwrap());

    let (status, body) = call(&app, send_json(Method::POST, "/api/v1/admin/init", Some("second"), &json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Cannot initialize admin: Admin already exists");

    let (status, _) = call(&app, send_json(Method::POST, "/api/v1/admin/init", Some("first"), &json!({}))).await;
    assert_eq!(status, StatusCode::OK);
}
