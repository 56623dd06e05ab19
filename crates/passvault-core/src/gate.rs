//! Entitlement gate and quota checks
//!
//! Every privileged operation asks the gate before mutating or revealing
//! state. The decision order is fixed:
//!
//! 1. admin or super admin role: allowed, even when suspended or expired
//! 2. suspended account: denied
//! 3. otherwise the tier catalog decides
//!
//! The tier is read from the record store on every check; nothing is cached,
//! so a webhook or admin change is visible to the very next request.
//! Lookups that fail deny access (fail closed) and are logged at `warn`.
//! Subscription status lookups fail open because they are display only.
//! For quotas, an account with no record yet is a free account.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use passvault_db::{AccountRepository, Repositories, VaultItemRepository};
use passvault_types::{
    Account, AccountId, Capability, Decision, EntitlementCheck, Quota, SubscriptionStatus, Tier,
    VaultKind,
};

use crate::CoreError;

/// Counter of denied entitlement checks, labelled by capability
pub const ENTITLEMENT_DENIALS_TOTAL: &str = "vault_entitlement_denials_total";

/// Decide a capability for an already-loaded account
pub fn evaluate(account: &Account, capability: Capability) -> EntitlementCheck {
    if account.role.is_admin() {
        return EntitlementCheck::allow(capability, Decision::AdminOverride);
    }
    if account.is_suspended {
        return EntitlementCheck::deny(capability, Decision::Suspended);
    }
    if account.subscription_tier.features().allows(capability) {
        EntitlementCheck::allow(capability, Decision::TierGrant)
    } else {
        EntitlementCheck::deny(capability, Decision::NotInTier)
    }
}

/// Entitlement gate over the account and vault item stores
pub struct EntitlementGate<A: ?Sized = dyn AccountRepository, V: ?Sized = dyn VaultItemRepository> {
    accounts: Arc<A>,
    vault: Arc<V>,
}

impl<A: ?Sized, V: ?Sized> Clone for EntitlementGate<A, V> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            vault: Arc::clone(&self.vault),
        }
    }
}

impl EntitlementGate {
    /// Gate over a repository bundle
    pub fn from_repositories(repos: &Repositories) -> Self {
        Self::new(Arc::clone(&repos.accounts), Arc::clone(&repos.vault))
    }
}

impl<A, V> EntitlementGate<A, V>
where
    A: AccountRepository + ?Sized,
    V: VaultItemRepository + ?Sized,
{
    /// Create a new gate
    pub fn new(accounts: Arc<A>, vault: Arc<V>) -> Self {
        Self { accounts, vault }
    }

    /// Load an account, erroring if it does not exist
    pub async fn account(&self, id: &AccountId) -> Result<Account, CoreError> {
        self.accounts
            .find_by_id(id.as_str())
            .await?
            .map(|row| row.into_account())
            .ok_or_else(|| CoreError::AccountNotFound(id.to_string()))
    }

    /// Structured entitlement check. Never errors; lookup failures deny.
    #[instrument(skip(self), fields(account_id = %principal))]
    pub async fn check(&self, principal: &AccountId, capability: Capability) -> EntitlementCheck {
        let check = match self.accounts.find_by_id(principal.as_str()).await {
            Ok(Some(row)) => evaluate(&row.into_account(), capability),
            Ok(None) => {
                warn!(capability = %capability, "Entitlement check for unknown account, denying");
                EntitlementCheck::deny(capability, Decision::Unavailable)
            }
            Err(e) => {
                warn!(capability = %capability, error = %e, "Entitlement lookup failed, denying");
                EntitlementCheck::deny(capability, Decision::Unavailable)
            }
        };

        if check.allowed {
            debug!(capability = %capability, decision = ?check.decision, "Entitlement granted");
        } else {
            debug!(capability = %capability, decision = ?check.decision, "Entitlement denied");
            metrics::counter!(ENTITLEMENT_DENIALS_TOTAL, "capability" => capability.as_str())
                .increment(1);
        }

        check
    }

    /// Whether the principal may use a capability
    pub async fn has_feature(&self, principal: &AccountId, capability: Capability) -> bool {
        self.check(principal, capability).await.allowed
    }

    /// Like [`check`](Self::check), but denial becomes an error
    ///
    /// Admin dashboard denials always read "Admin access required"; plan
    /// denials become [`CoreError::UpgradeRequired`].
    pub async fn require(&self, principal: &AccountId, capability: Capability) -> Result<(), CoreError> {
        let check = self.check(principal, capability).await;
        if check.allowed {
            return Ok(());
        }

        let reason = check.reason.unwrap_or_default();
        Err(match (capability, check.decision) {
            (Capability::AdminDashboard, _) => {
                CoreError::AccessDenied("Admin access required".to_string())
            }
            (_, Decision::NotInTier) => CoreError::UpgradeRequired(reason),
            _ => CoreError::AccessDenied(reason),
        })
    }

    /// Subscription status at `now`; unknown accounts read as active
    pub async fn subscription_status_at(
        &self,
        principal: &AccountId,
        now: DateTime<Utc>,
    ) -> SubscriptionStatus {
        match self.accounts.find_by_id(principal.as_str()).await {
            Ok(Some(row)) => row.into_account().status_at(now),
            Ok(None) => SubscriptionStatus::unknown(),
            Err(e) => {
                warn!(account_id = %principal, error = %e, "Subscription status lookup failed");
                SubscriptionStatus::unknown()
            }
        }
    }

    /// Subscription status right now
    pub async fn subscription_status(&self, principal: &AccountId) -> SubscriptionStatus {
        self.subscription_status_at(principal, Utc::now()).await
    }

    // ========================================================================
    // Quotas
    // ========================================================================

    /// Quota for a vault item kind under the account's tier
    ///
    /// A principal without an account record gets the free quota; a failed
    /// lookup is an error.
    pub async fn quota(&self, kind: VaultKind, principal: &AccountId) -> Result<Quota, CoreError> {
        let tier = match self.accounts.find_by_id(principal.as_str()).await? {
            Some(row) => row.tier(),
            None => {
                debug!(account_id = %principal, "No account record, using free quota");
                Tier::Free
            }
        };
        Ok(tier.features().quota_for(kind))
    }

    /// Whether one more item fits, given the caller's own count
    pub async fn can_add(&self, kind: VaultKind, principal: &AccountId, current: u64) -> bool {
        match self.quota(kind, principal).await {
            Ok(quota) => quota.allows(current),
            Err(e) => {
                warn!(account_id = %principal, kind = %kind, error = %e, "Quota lookup failed, denying");
                false
            }
        }
    }

    /// Whether one more item fits, counting owned items in the store
    pub async fn can_add_counted(&self, kind: VaultKind, principal: &AccountId) -> bool {
        let quota = match self.quota(kind, principal).await {
            Ok(quota) => quota,
            Err(e) => {
                warn!(account_id = %principal, kind = %kind, error = %e, "Quota lookup failed, denying");
                return false;
            }
        };

        if quota == Quota::Unlimited {
            return true;
        }

        match self.vault.count_by_user(kind, principal.as_str()).await {
            Ok(count) => quota.allows(u64::try_from(count).unwrap_or(0)),
            Err(e) => {
                warn!(account_id = %principal, kind = %kind, error = %e, "Item count failed, denying");
                false
            }
        }
    }

    pub async fn can_add_password(&self, principal: &AccountId, current: u64) -> bool {
        self.can_add(VaultKind::Password, principal, current).await
    }

    pub async fn can_add_personal_info(&self, principal: &AccountId, current: u64) -> bool {
        self.can_add(VaultKind::PersonalInfo, principal, current).await
    }

    pub async fn can_add_password_counted(&self, principal: &AccountId) -> bool {
        self.can_add_counted(VaultKind::Password, principal).await
    }

    pub async fn can_add_personal_info_counted(&self, principal: &AccountId) -> bool {
        self.can_add_counted(VaultKind::PersonalInfo, principal).await
    }
}

impl<A: ?Sized, V: ?Sized> std::fmt::Debug for EntitlementGate<A, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementGate").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passvault_types::Role;

    fn account(role: Role, tier: Tier, suspended: bool) -> Account {
        let mut account = Account::new(AccountId::new("acct123"), "a@example.com");
        account.role = role;
        account.subscription_tier = tier;
        account.is_suspended = suspended;
        account
    }

    #[test]
    fn test_admin_overrides_suspension_and_tier() {
        let admin = account(Role::Admin, Tier::Free, true);
        for cap in Capability::ALL {
            let check = evaluate(&admin, cap);
            assert!(check.allowed, "{cap} should be allowed for admin");
            assert_eq!(check.decision, Decision::AdminOverride);
        }
    }

    #[test]
    fn test_suspended_user_denied_everything() {
        let user = account(Role::User, Tier::Business, true);
        for cap in Capability::ALL {
            let check = evaluate(&user, cap);
            assert!(!check.allowed);
            assert_eq!(check.decision, Decision::Suspended);
        }
    }

    #[test]
    fn test_tier_decides_for_active_user() {
        let premium = account(Role::User, Tier::Premium, false);
        assert!(evaluate(&premium, Capability::CanSharePasswords).allowed);
        let denied = evaluate(&premium, Capability::HasTeamFeatures);
        assert!(!denied.allowed);
        assert_eq!(denied.decision, Decision::NotInTier);
        assert!(denied.reason.unwrap().contains("business"));
    }

    #[test]
    fn test_expired_paid_tier_still_grants() {
        let mut premium = account(Role::User, Tier::Premium, false);
        premium.subscription_expires_at = Some(Utc::now() - chrono::Duration::days(3));
        assert!(!premium.status().is_active);
        assert!(evaluate(&premium, Capability::HasExport).allowed);
    }
}
