//! Admin service
//!
//! Account administration behind the `adminDashboard` capability, plus the
//! first-admin bootstrap.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use passvault_db::{CreateAccount, Repositories};
use passvault_types::{
    period_end_from, Account, AccountId, ActivityLog, Capability, LogAction, Role, Tier, VaultKind,
};

use crate::{ActivityService, CoreError, EntitlementGate};

/// Number of entries in the dashboard's recent activity list
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Days ahead that count as "expiring soon" on the dashboard
pub const EXPIRING_WITHIN_DAYS: i64 = 7;

/// Subscription counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStats {
    pub active_subscriptions: u64,
    pub expiring_subscriptions: u64,
    pub suspended_accounts: u64,
}

/// Account counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStats {
    pub total_accounts: u64,
    pub admin_accounts: u64,
    pub accounts_created_this_month: u64,
}

/// Vault counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordStats {
    pub total_passwords: i64,
    pub passwords_created_this_month: i64,
}

/// Activity counters for the current month
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub total_activities: i64,
    pub activities_this_month: u64,
    pub activity_breakdown: BTreeMap<String, u64>,
}

/// Admin dashboard data
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub subscription_stats: SubscriptionStats,
    pub account_stats: AccountStats,
    pub password_stats: PasswordStats,
    pub activity_stats: ActivityStats,
    pub recent_activity: Vec<ActivityLog>,
}

/// First instant of the calendar month containing `now` (UTC)
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Subscription counters over a set of accounts
///
/// Free accounts count as active unless suspended; paid accounts also need
/// an expiration in the future.
pub fn subscription_stats(accounts: &[Account], now: DateTime<Utc>) -> SubscriptionStats {
    let mut stats = SubscriptionStats::default();
    for account in accounts {
        let status = account.status_at(now);
        let active = if account.subscription_tier.is_paid() {
            status.is_active && account.subscription_expires_at.is_some()
        } else {
            !account.is_suspended
        };
        if active {
            stats.active_subscriptions += 1;
        }
        if account.subscription_tier.is_paid() && status.expires_within(EXPIRING_WITHIN_DAYS) {
            stats.expiring_subscriptions += 1;
        }
        if account.is_suspended {
            stats.suspended_accounts += 1;
        }
    }
    stats
}

/// Admin service
#[derive(Clone)]
pub struct AdminService {
    repos: Repositories,
    gate: EntitlementGate,
    activity: ActivityService,
}

impl AdminService {
    pub fn new(repos: Repositories) -> Self {
        Self {
            gate: EntitlementGate::from_repositories(&repos),
            activity: ActivityService::new(&repos),
            repos,
        }
    }

    async fn require_admin(&self, admin: &AccountId) -> Result<(), CoreError> {
        self.gate.require(admin, Capability::AdminDashboard).await
    }

    /// Record an admin action. Failures are logged, never returned.
    async fn log(&self, subject: &AccountId, action: LogAction, details: serde_json::Value) {
        if let Err(e) = self.activity.record(subject, action, details, None).await {
            warn!(error = %e, action = %action, "Failed to record admin activity");
        }
    }

    /// All accounts, newest first
    pub async fn list_accounts(&self, admin: &AccountId) -> Result<Vec<Account>, CoreError> {
        self.require_admin(admin).await?;
        let rows = self.repos.accounts.list().await?;
        Ok(rows.into_iter().map(|r| r.into_account()).collect())
    }

    /// A single account
    pub async fn get_account(&self, admin: &AccountId, id: &AccountId) -> Result<Account, CoreError> {
        self.require_admin(admin).await?;
        self.gate.account(id).await
    }

    /// Move an account to a tier
    ///
    /// Paid tiers expire at `expires_at`, or one subscription period from now
    /// when not given. Moving to free clears the expiration.
    #[instrument(skip(self), fields(admin_id = %admin, account_id = %id))]
    pub async fn update_tier(
        &self,
        admin: &AccountId,
        id: &AccountId,
        tier: Tier,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Account, CoreError> {
        self.require_admin(admin).await?;

        let expires_at = if tier.is_paid() {
            Some(expires_at.unwrap_or_else(|| period_end_from(Utc::now())))
        } else {
            None
        };

        if !self
            .repos
            .accounts
            .update_subscription(id.as_str(), tier.as_str(), expires_at)
            .await?
        {
            return Err(CoreError::AccountNotFound(id.to_string()));
        }

        self.log(
            id,
            LogAction::SubscriptionUpdated,
            json!({
                "updatedBy": admin,
                "newSubscription": tier,
                "expiresAt": expires_at,
            }),
        )
        .await;

        info!(tier = %tier, expires_at = ?expires_at, "Subscription updated by admin");
        self.gate.account(id).await
    }

    /// Change an account's role
    #[instrument(skip(self), fields(admin_id = %admin, account_id = %id))]
    pub async fn update_role(
        &self,
        admin: &AccountId,
        id: &AccountId,
        role: Role,
    ) -> Result<Account, CoreError> {
        self.require_admin(admin).await?;

        if !self.repos.accounts.update_role(id.as_str(), role.as_str()).await? {
            return Err(CoreError::AccountNotFound(id.to_string()));
        }

        self.log(id, LogAction::RoleUpdated, json!({ "updatedBy": admin, "newRole": role }))
            .await;

        info!(role = %role, "Role updated by admin");
        self.gate.account(id).await
    }

    /// Suspend or unsuspend an account
    #[instrument(skip(self), fields(admin_id = %admin, account_id = %id))]
    pub async fn set_suspension(
        &self,
        admin: &AccountId,
        id: &AccountId,
        suspended: bool,
    ) -> Result<Account, CoreError> {
        self.require_admin(admin).await?;

        if !self
            .repos
            .accounts
            .set_suspended(id.as_str(), suspended, Some(admin.as_str()))
            .await?
        {
            return Err(CoreError::AccountNotFound(id.to_string()));
        }

        let action = if suspended {
            LogAction::AccountSuspended
        } else {
            LogAction::AccountUnsuspended
        };
        self.log(id, action, json!({ "updatedBy": admin })).await;

        info!(suspended, "Suspension changed by admin");
        self.gate.account(id).await
    }

    /// Delete an account with its passwords, personal info and payments
    #[instrument(skip(self), fields(admin_id = %admin, account_id = %id))]
    pub async fn delete_account(&self, admin: &AccountId, id: &AccountId) -> Result<(), CoreError> {
        self.require_admin(admin).await?;

        if !self.repos.accounts.delete_cascade(id.as_str()).await? {
            return Err(CoreError::AccountNotFound(id.to_string()));
        }

        info!("Account deleted by admin");
        Ok(())
    }

    /// Dashboard counters as of `now`
    pub async fn dashboard_at(
        &self,
        admin: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<AdminDashboard, CoreError> {
        self.require_admin(admin).await?;

        let month_start = start_of_month(now);

        let accounts: Vec<Account> = self
            .repos
            .accounts
            .list()
            .await?
            .into_iter()
            .map(|r| r.into_account())
            .collect();

        let account_stats = AccountStats {
            total_accounts: accounts.len() as u64,
            admin_accounts: accounts.iter().filter(|a| a.role.is_admin()).count() as u64,
            accounts_created_this_month: accounts
                .iter()
                .filter(|a| a.created_at >= month_start)
                .count() as u64,
        };

        let password_stats = PasswordStats {
            total_passwords: self.repos.vault.count_all(VaultKind::Password).await?,
            passwords_created_this_month: self
                .repos
                .vault
                .count_created_since(VaultKind::Password, month_start)
                .await?,
        };

        let recent: Vec<ActivityLog> = self
            .repos
            .activity
            .list_since(month_start)
            .await?
            .into_iter()
            .filter_map(|r| r.into_log())
            .collect();

        let mut activity_breakdown = BTreeMap::new();
        for log in &recent {
            *activity_breakdown.entry(log.action.as_str().to_string()).or_insert(0) += 1;
        }

        let activity_stats = ActivityStats {
            total_activities: self.repos.activity.count_all().await?,
            activities_this_month: recent.len() as u64,
            activity_breakdown,
        };

        Ok(AdminDashboard {
            subscription_stats: subscription_stats(&accounts, now),
            account_stats,
            password_stats,
            activity_stats,
            recent_activity: recent.into_iter().take(RECENT_ACTIVITY_LIMIT).collect(),
        })
    }

    /// Dashboard counters right now
    pub async fn dashboard(&self, admin: &AccountId) -> Result<AdminDashboard, CoreError> {
        self.dashboard_at(admin, Utc::now()).await
    }

    /// Bootstrap the first admin
    ///
    /// When no admin exists the caller becomes an admin on the business
    /// tier, creating the account if needed. An existing admin calling again
    /// is moved back onto business. Anyone else is refused.
    #[instrument(skip(self, email), fields(account_id = %principal))]
    pub async fn init_admin(&self, principal: &AccountId, email: &str) -> Result<Account, CoreError> {
        let claim = CreateAccount {
            id: principal.to_string(),
            email: email.to_string(),
            role: Role::Admin.as_str().to_string(),
            tier: Tier::Business.as_str().to_string(),
        };

        if let Some(row) = self.repos.accounts.promote_first_admin(claim).await? {
            info!("First admin initialized on business plan");
            return Ok(row.into_account());
        }

        let existing = self.repos.accounts.find_by_id(principal.as_str()).await?;
        match existing.map(|r| r.into_account()) {
            Some(account) if account.role.is_admin() => {
                self.repos
                    .accounts
                    .update_subscription(
                        principal.as_str(),
                        Tier::Business.as_str(),
                        account.subscription_expires_at,
                    )
                    .await?;
                info!("Existing admin re-initialized on business plan");
                self.gate.account(principal).await
            }
            _ => {
                warn!("Admin initialization refused, an admin already exists");
                Err(CoreError::AccessDenied(
                    "Cannot initialize admin: Admin already exists".to_string(),
                ))
            }
        }
    }
}

impl std::fmt::Debug for AdminService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminService").finish()
    }
}
