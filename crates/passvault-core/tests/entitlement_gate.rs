//! Entitlement gate and quota tests over the in-memory store

use chrono::{Duration, Utc};
use passvault_core::{CoreError, EntitlementGate, NewVaultItem, VaultService};
use passvault_db::memory::MemoryStore;
use passvault_db::Repositories;
use passvault_types::{AccountId, Capability, Quota, VaultKind};

// ============================================================================
// Fixtures
// ============================================================================

fn seed(store: &MemoryStore, id: &str, role: &str, tier: &str, suspended: bool) -> AccountId {
    let mut row = MemoryStore::account_row(id, &format!("{id}@example.com"), role, tier);
    row.is_suspended = suspended;
    store.insert_account(row);
    AccountId::new(id)
}

fn setup() -> (MemoryStore, Repositories, EntitlementGate) {
    let store = MemoryStore::new();
    let repos = Repositories::from_memory(store.clone());
    let gate = EntitlementGate::from_repositories(&repos);
    (store, repos, gate)
}

fn item(label: &str) -> NewVaultItem {
    NewVaultItem {
        label: label.to_string(),
        payload: "ciphertext".to_string(),
        team_id: None,
    }
}

// ============================================================================
// hasFeature
// ============================================================================

#[tokio::test]
async fn test_admin_on_free_suspended_keeps_admin_dashboard() {
    let (store, _, gate) = setup();
    let admin = seed(&store, "admin1", "admin", "free", true);

    assert!(gate.has_feature(&admin, Capability::AdminDashboard).await);
    for cap in Capability::ALL {
        assert!(gate.has_feature(&admin, cap).await);
    }
}

#[tokio::test]
async fn test_suspended_business_user_denied_everything() {
    let (store, _, gate) = setup();
    let user = seed(&store, "u1", "user", "business", true);

    for cap in Capability::ALL {
        let check = gate.check(&user, cap).await;
        assert!(!check.allowed, "{cap} should be denied");
        assert_eq!(check.reason.as_deref(), Some("Account is suspended"));
    }
}

#[tokio::test]
async fn test_unknown_account_denied_features_but_gets_free_quota() {
    let (_, _, gate) = setup();
    let ghost = AccountId::new("ghost");

    assert!(!gate.has_feature(&ghost, Capability::HasExport).await);

    assert_eq!(gate.quota(VaultKind::Password, &ghost).await.unwrap(), Quota::Limited(3));
    assert_eq!(gate.quota(VaultKind::PersonalInfo, &ghost).await.unwrap(), Quota::Limited(1));
    assert!(gate.can_add_password(&ghost, 0).await);
    assert!(gate.can_add_password(&ghost, 2).await);
    assert!(!gate.can_add_password(&ghost, 3).await);
    assert!(gate.can_add_password_counted(&ghost).await);
}

#[tokio::test]
async fn test_require_maps_denials() {
    let (store, _, gate) = setup();
    let free = seed(&store, "u1", "user", "free", false);

    match gate.require(&free, Capability::HasExport).await {
        Err(CoreError::UpgradeRequired(msg)) => assert!(msg.contains("premium")),
        other => panic!("expected upgrade required, got {other:?}"),
    }
    match gate.require(&free, Capability::AdminDashboard).await {
        Err(CoreError::AccessDenied(msg)) => assert_eq!(msg, "Admin access required"),
        other => panic!("expected access denied, got {other:?}"),
    }
}

#[tokio::test]
async fn test_tier_change_visible_on_next_check() {
    let (store, repos, gate) = setup();
    let user = seed(&store, "u1", "user", "free", false);
    assert!(!gate.has_feature(&user, Capability::CanSharePasswords).await);

    repos
        .accounts
        .update_subscription("u1", "premium", Some(Utc::now() + Duration::days(30)))
        .await
        .unwrap();

    assert!(gate.has_feature(&user, Capability::CanSharePasswords).await);
}

// ============================================================================
// Subscription status
// ============================================================================

#[tokio::test]
async fn test_subscription_status_for_account_and_unknown() {
    let (store, repos, gate) = setup();
    let user = seed(&store, "u1", "user", "premium", false);
    let now = Utc::now();
    repos
        .accounts
        .update_subscription("u1", "premium", Some(now + Duration::hours(36)))
        .await
        .unwrap();

    let status = gate.subscription_status_at(&user, now).await;
    assert!(status.is_active);
    assert_eq!(status.days_until_expiration, Some(2));

    let unknown = gate.subscription_status(&AccountId::new("ghost")).await;
    assert!(unknown.is_active);
    assert!(!unknown.is_suspended);
    assert_eq!(unknown.days_until_expiration, None);
}

// ============================================================================
// Quotas
// ============================================================================

#[tokio::test]
async fn test_free_account_with_three_passwords_cannot_add() {
    let (store, _, gate) = setup();
    let user = seed(&store, "u1", "user", "free", false);

    assert!(gate.can_add_password(&user, 2).await);
    assert!(!gate.can_add_password(&user, 3).await);
    assert!(gate.can_add_personal_info(&user, 0).await);
    assert!(!gate.can_add_personal_info(&user, 1).await);
    assert_eq!(gate.quota(VaultKind::Password, &user).await.unwrap(), Quota::Limited(3));
}

#[tokio::test]
async fn test_premium_quotas() {
    let (store, _, gate) = setup();
    let user = seed(&store, "u1", "user", "premium", false);

    assert!(gate.can_add_password(&user, 1_000_000).await);
    assert!(gate.can_add_personal_info(&user, 49).await);
    assert!(!gate.can_add_personal_info(&user, 50).await);
}

#[tokio::test]
async fn test_counted_quota_ignores_caller_claims() {
    let (store, repos, gate) = setup();
    let user = seed(&store, "u1", "user", "free", false);
    let vault = VaultService::new(&repos);

    for i in 0..3 {
        vault.create(&user, VaultKind::Password, item(&format!("site{i}"))).await.unwrap();
    }

    // a client claiming zero items is still refused by the counted check
    assert!(gate.can_add_password(&user, 0).await);
    assert!(!gate.can_add_password_counted(&user).await);
    assert!(gate.can_add_personal_info_counted(&user).await);

    match vault.create(&user, VaultKind::Password, item("site3")).await {
        Err(CoreError::QuotaExceeded { kind, limit }) => {
            assert_eq!(kind, VaultKind::Password);
            assert_eq!(limit, 3);
        }
        other => panic!("expected quota exceeded, got {other:?}"),
    }
    assert_eq!(vault.list(&user, VaultKind::Password).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_concurrent_creates_never_exceed_quota() {
    let (store, repos, _) = setup();
    let user = seed(&store, "u1", "user", "free", false);
    let vault = VaultService::new(&repos);

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let vault = vault.clone();
            let user = user.clone();
            tokio::spawn(async move { vault.create(&user, VaultKind::Password, item(&format!("s{i}"))).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            created += 1;
        }
    }
    assert_eq!(created, 3);
}

#[tokio::test]
async fn test_suspended_user_cannot_create_items() {
    let (store, repos, _) = setup();
    let user = seed(&store, "u1", "user", "premium", true);
    let vault = VaultService::new(&repos);

    let err = vault.create(&user, VaultKind::Password, item("bank")).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_team_items_need_team_features() {
    let (store, repos, _) = setup();
    let premium = seed(&store, "u1", "user", "premium", false);
    let business = seed(&store, "u2", "user", "business", false);
    let vault = VaultService::new(&repos);

    let mut team_item = item("shared");
    team_item.team_id = Some("team-1".to_string());

    assert!(matches!(
        vault.create(&premium, VaultKind::Password, team_item.clone()).await,
        Err(CoreError::UpgradeRequired(_))
    ));
    let created = vault.create(&business, VaultKind::Password, team_item).await.unwrap();
    assert_eq!(created.team_id.as_deref(), Some("team-1"));
}

#[tokio::test]
async fn test_delete_only_own_items() {
    let (store, repos, _) = setup();
    let owner = seed(&store, "u1", "user", "free", false);
    let other = seed(&store, "u2", "user", "free", false);
    let vault = VaultService::new(&repos);

    let created = vault.create(&owner, VaultKind::PersonalInfo, item("passport")).await.unwrap();
    assert!(matches!(
        vault.delete(&other, VaultKind::PersonalInfo, created.id).await,
        Err(CoreError::ItemNotFound)
    ));
    vault.delete(&owner, VaultKind::PersonalInfo, created.id).await.unwrap();
    assert!(vault.list(&owner, VaultKind::PersonalInfo).await.unwrap().is_empty());
}
