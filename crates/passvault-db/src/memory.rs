//! In-memory record store
//!
//! Backs every repository trait with DashMaps. Compound operations (payment
//! apply, quota-checked insert, first-admin claim, cascade deletes) take a
//! store-wide write lock so they behave like the PostgreSQL transactions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use passvault_types::{ActivityQuery, LogAction, VaultKind};

use crate::error::{DbError, DbResult};
use crate::models::{
    AccountRow, ActivityLogRow, PaymentRow, ShareRow, TeamMemberRow, TeamRow, VaultItemRow,
};
use crate::repo::{
    AccountRepository, ActivityLogRepository, ApplyOutcome, CreateAccount, CreateActivityLog,
    CreatePayment, CreateShare, CreateTeam, CreateTeamMember, CreateVaultItem, PaymentRepository,
    ShareRepository, TeamRepository, VaultItemRepository,
};

#[derive(Default)]
struct Inner {
    accounts: DashMap<String, AccountRow>,
    /// Keyed by order id
    payments: DashMap<String, PaymentRow>,
    passwords: DashMap<Uuid, VaultItemRow>,
    personal_info: DashMap<Uuid, VaultItemRow>,
    activity: DashMap<Uuid, ActivityLogRow>,
    teams: DashMap<String, TeamRow>,
    /// Keyed by (team id, account id)
    team_members: DashMap<(String, String), TeamMemberRow>,
    shares: DashMap<Uuid, ShareRow>,
    write_lock: Mutex<()>,
}

/// Shared in-memory store; clones see the same data
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account row directly
    pub fn insert_account(&self, row: AccountRow) {
        self.inner.accounts.insert(row.id.clone(), row);
    }

    /// Build an account row with defaults for seeding
    pub fn account_row(id: &str, email: &str, role: &str, tier: &str) -> AccountRow {
        let now = Utc::now();
        AccountRow {
            id: id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            subscription_tier: tier.to_string(),
            subscription_expires_at: None,
            subscription_updated_at: None,
            is_suspended: false,
            suspended_at: None,
            suspended_by: None,
            last_payment: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of recorded payments
    pub fn payment_count(&self) -> usize {
        self.inner.payments.len()
    }

    fn items(&self, kind: VaultKind) -> &DashMap<Uuid, VaultItemRow> {
        match kind {
            VaultKind::Password => &self.inner.passwords,
            VaultKind::PersonalInfo => &self.inner.personal_info,
        }
    }

    fn owned_count(&self, kind: VaultKind, user_id: &str) -> i64 {
        self.items(kind)
            .iter()
            .filter(|r| r.value().user_id == user_id)
            .count() as i64
    }

    fn is_admin_role(role: &str) -> bool {
        matches!(role, "admin" | "super_admin")
    }

    fn drop_team(&self, team_id: &str) -> bool {
        self.inner.team_members.retain(|(team, _), _| team != team_id);
        self.inner.shares.retain(|_, r| r.team_id.as_deref() != Some(team_id));
        self.inner.teams.remove(team_id).is_some()
    }

    fn touch_team(&self, team_id: &str) {
        if let Some(mut team) = self.inner.teams.get_mut(team_id) {
            team.updated_at = Utc::now();
        }
    }

    fn list_shares(&self, scope: impl Fn(&ShareRow) -> bool) -> Vec<ShareRow> {
        let rows = self
            .inner
            .shares
            .iter()
            .filter(|r| scope(r.value()))
            .map(|r| r.value().clone())
            .collect();
        newest_first(rows, |r: &ShareRow| r.created_at)
    }
}

fn newest_first<T>(mut rows: Vec<T>, key: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    rows.sort_by_key(|r| std::cmp::Reverse(key(r)));
    rows
}

// ============================================================================
// Accounts
// ============================================================================

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<AccountRow>> {
        Ok(self.inner.accounts.get(id).map(|r| r.value().clone()))
    }

    async fn list(&self) -> DbResult<Vec<AccountRow>> {
        let rows = self.inner.accounts.iter().map(|r| r.value().clone()).collect();
        Ok(newest_first(rows, |r: &AccountRow| r.created_at))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<AccountRow>> {
        Ok(self
            .inner
            .accounts
            .iter()
            .filter(|r| r.value().email == email)
            .map(|r| r.value().clone())
            .min_by_key(|r| r.created_at))
    }

    async fn create(&self, account: CreateAccount) -> DbResult<AccountRow> {
        match self.inner.accounts.entry(account.id.clone()) {
            Entry::Occupied(_) => Err(DbError::Conflict(format!("account {}", account.id))),
            Entry::Vacant(slot) => {
                let row = Self::account_row(&account.id, &account.email, &account.role, &account.tier);
                slot.insert(row.clone());
                Ok(row)
            }
        }
    }

    async fn create_if_missing(&self, account: CreateAccount) -> DbResult<AccountRow> {
        let row = self
            .inner
            .accounts
            .entry(account.id.clone())
            .or_insert_with(|| Self::account_row(&account.id, &account.email, &account.role, &account.tier));
        Ok(row.value().clone())
    }

    async fn update_subscription(
        &self,
        id: &str,
        tier: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> DbResult<bool> {
        let Some(mut row) = self.inner.accounts.get_mut(id) else {
            return Ok(false);
        };
        let now = Utc::now();
        row.subscription_tier = tier.to_string();
        row.subscription_expires_at = expires_at;
        row.subscription_updated_at = Some(now);
        row.updated_at = now;
        Ok(true)
    }

    async fn update_role(&self, id: &str, role: &str) -> DbResult<bool> {
        let Some(mut row) = self.inner.accounts.get_mut(id) else {
            return Ok(false);
        };
        row.role = role.to_string();
        row.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_suspended(&self, id: &str, suspended: bool, by: Option<&str>) -> DbResult<bool> {
        let Some(mut row) = self.inner.accounts.get_mut(id) else {
            return Ok(false);
        };
        let now = Utc::now();
        row.is_suspended = suspended;
        row.suspended_at = suspended.then_some(now);
        row.suspended_by = if suspended { by.map(str::to_string) } else { None };
        row.updated_at = now;
        Ok(true)
    }

    async fn any_admin(&self) -> DbResult<bool> {
        Ok(self
            .inner
            .accounts
            .iter()
            .any(|r| Self::is_admin_role(&r.value().role)))
    }

    async fn promote_first_admin(&self, account: CreateAccount) -> DbResult<Option<AccountRow>> {
        let _guard = self.inner.write_lock.lock().await;

        if self.any_admin().await? {
            return Ok(None);
        }

        let now = Utc::now();
        let mut entry = self
            .inner
            .accounts
            .entry(account.id.clone())
            .or_insert_with(|| Self::account_row(&account.id, &account.email, &account.role, &account.tier));
        entry.role = account.role;
        entry.subscription_tier = account.tier;
        entry.subscription_updated_at = Some(now);
        entry.updated_at = now;
        Ok(Some(entry.value().clone()))
    }

    async fn delete_cascade(&self, id: &str) -> DbResult<bool> {
        let _guard = self.inner.write_lock.lock().await;

        self.inner.passwords.retain(|_, r| r.user_id != id);
        self.inner.personal_info.retain(|_, r| r.user_id != id);
        self.inner.payments.retain(|_, r| r.user_id != id);

        let owned_teams: Vec<String> = self
            .inner
            .teams
            .iter()
            .filter(|t| t.value().owner_id == id)
            .map(|t| t.key().clone())
            .collect();
        for team_id in &owned_teams {
            self.drop_team(team_id);
        }
        self.inner.team_members.retain(|(_, account), _| account != id);

        let passwords = &self.inner.passwords;
        self.inner.shares.retain(|_, r| {
            r.shared_by != id
                && r.shared_with.as_deref() != Some(id)
                && passwords.contains_key(&r.password_id)
        });

        Ok(self.inner.accounts.remove(id).is_some())
    }
}

// ============================================================================
// Payments
// ============================================================================

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn find_by_order_id(&self, order_id: &str) -> DbResult<Option<PaymentRow>> {
        Ok(self.inner.payments.get(order_id).map(|r| r.value().clone()))
    }

    async fn list_by_user(&self, user_id: &str, limit: i64) -> DbResult<Vec<PaymentRow>> {
        let rows = self
            .inner
            .payments
            .iter()
            .filter(|r| r.value().user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        let mut rows = newest_first(rows, |r: &PaymentRow| r.created_at);
        rows.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn apply_payment(
        &self,
        payment: CreatePayment,
        expires_at: DateTime<Utc>,
    ) -> DbResult<ApplyOutcome> {
        let _guard = self.inner.write_lock.lock().await;

        if !self.inner.accounts.contains_key(&payment.user_id) {
            return Ok(ApplyOutcome::AccountMissing);
        }

        let row = match self.inner.payments.entry(payment.order_id.clone()) {
            Entry::Occupied(_) => return Ok(ApplyOutcome::Duplicate),
            Entry::Vacant(slot) => {
                let row = payment.to_row();
                slot.insert(row.clone());
                row
            }
        };

        let snapshot = serde_json::to_value(payment.last_payment())?;
        if let Some(mut account) = self.inner.accounts.get_mut(&payment.user_id) {
            let now = Utc::now();
            account.subscription_tier = payment.plan.clone();
            account.subscription_expires_at = Some(expires_at);
            account.last_payment = Some(snapshot);
            account.subscription_updated_at = Some(now);
            account.updated_at = now;
        }

        Ok(ApplyOutcome::Applied(row))
    }
}

// ============================================================================
// Vault items
// ============================================================================

#[async_trait]
impl VaultItemRepository for MemoryStore {
    async fn count_by_user(&self, kind: VaultKind, user_id: &str) -> DbResult<i64> {
        Ok(self.owned_count(kind, user_id))
    }

    async fn find_by_id(&self, kind: VaultKind, id: Uuid) -> DbResult<Option<VaultItemRow>> {
        Ok(self.items(kind).get(&id).map(|r| r.value().clone()))
    }

    async fn list_by_user(&self, kind: VaultKind, user_id: &str) -> DbResult<Vec<VaultItemRow>> {
        let rows = self
            .items(kind)
            .iter()
            .filter(|r| r.value().user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        Ok(newest_first(rows, |r: &VaultItemRow| r.created_at))
    }

    async fn create_within_quota(
        &self,
        kind: VaultKind,
        item: CreateVaultItem,
        limit: Option<i64>,
    ) -> DbResult<Option<VaultItemRow>> {
        let _guard = self.inner.write_lock.lock().await;

        if let Some(limit) = limit {
            if self.owned_count(kind, &item.user_id) >= limit {
                return Ok(None);
            }
        }

        let row = VaultItemRow {
            id: item.id,
            user_id: item.user_id,
            label: item.label,
            payload: item.payload,
            team_id: item.team_id,
            created_at: Utc::now(),
        };
        self.items(kind).insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn delete(&self, kind: VaultKind, user_id: &str, id: Uuid) -> DbResult<bool> {
        let _guard = self.inner.write_lock.lock().await;

        let removed = self
            .items(kind)
            .remove_if(&id, |_, r| r.user_id == user_id)
            .is_some();
        if removed && kind == VaultKind::Password {
            self.inner.shares.retain(|_, r| r.password_id != id);
        }
        Ok(removed)
    }

    async fn count_all(&self, kind: VaultKind) -> DbResult<i64> {
        Ok(self.items(kind).len() as i64)
    }

    async fn count_created_since(&self, kind: VaultKind, since: DateTime<Utc>) -> DbResult<i64> {
        Ok(self
            .items(kind)
            .iter()
            .filter(|r| r.value().created_at >= since)
            .count() as i64)
    }
}

// ============================================================================
// Activity logs
// ============================================================================

impl MemoryStore {
    fn query_logs(
        &self,
        scope: impl Fn(&ActivityLogRow) -> bool,
        query: &ActivityQuery,
    ) -> Vec<ActivityLogRow> {
        let rows = self
            .inner
            .activity
            .iter()
            .map(|r| r.value().clone())
            .filter(|r| scope(r))
            .filter(|r| query.start.map_or(true, |start| r.timestamp >= start))
            .filter(|r| query.end.map_or(true, |end| r.timestamp <= end))
            .filter(|r| {
                query.actions.is_empty()
                    || r.action
                        .parse::<LogAction>()
                        .is_ok_and(|a| query.actions.contains(&a))
            })
            .filter(|r| {
                query
                    .team_id
                    .as_ref()
                    .map_or(true, |team| r.team_id.as_ref() == Some(team))
            })
            .collect();
        let mut rows = newest_first(rows, |r: &ActivityLogRow| r.timestamp);
        rows.truncate(usize::try_from(query.effective_limit()).unwrap_or(usize::MAX));
        rows
    }
}

#[async_trait]
impl ActivityLogRepository for MemoryStore {
    async fn append(&self, entry: CreateActivityLog) -> DbResult<ActivityLogRow> {
        let row = ActivityLogRow {
            id: entry.id,
            user_id: entry.user_id,
            team_id: entry.team_id,
            action: entry.action,
            details: entry.details,
            timestamp: Utc::now(),
        };
        self.inner.activity.insert(row.id, row.clone());
        Ok(row)
    }

    async fn query_by_user(&self, user_id: &str, query: &ActivityQuery) -> DbResult<Vec<ActivityLogRow>> {
        Ok(self.query_logs(|r| r.user_id == user_id, query))
    }

    async fn query_by_team(&self, team_id: &str, query: &ActivityQuery) -> DbResult<Vec<ActivityLogRow>> {
        Ok(self.query_logs(|r| r.team_id.as_deref() == Some(team_id), query))
    }

    async fn list_since(&self, since: DateTime<Utc>) -> DbResult<Vec<ActivityLogRow>> {
        let rows = self
            .inner
            .activity
            .iter()
            .filter(|r| r.value().timestamp >= since)
            .map(|r| r.value().clone())
            .collect();
        Ok(newest_first(rows, |r: &ActivityLogRow| r.timestamp))
    }

    async fn count_all(&self) -> DbResult<i64> {
        Ok(self.inner.activity.len() as i64)
    }
}

// ============================================================================
// Teams
// ============================================================================

#[async_trait]
impl TeamRepository for MemoryStore {
    async fn create(&self, team: CreateTeam) -> DbResult<TeamRow> {
        let _guard = self.inner.write_lock.lock().await;

        let now = Utc::now();
        let row = match self.inner.teams.entry(team.id.clone()) {
            Entry::Occupied(_) => return Err(DbError::Conflict(format!("team {}", team.id))),
            Entry::Vacant(slot) => {
                let row = TeamRow {
                    id: team.id.clone(),
                    name: team.name,
                    owner_id: team.owner_id.clone(),
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(row.clone());
                row
            }
        };

        self.inner.team_members.insert(
            (team.id.clone(), team.owner_id.clone()),
            TeamMemberRow {
                team_id: team.id,
                account_id: team.owner_id.clone(),
                email: team.owner_email,
                role: "owner".to_string(),
                added_by: team.owner_id,
                joined_at: now,
            },
        );

        Ok(row)
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<TeamRow>> {
        Ok(self.inner.teams.get(id).map(|r| r.value().clone()))
    }

    async fn members(&self, team_id: &str) -> DbResult<Vec<TeamMemberRow>> {
        let mut rows: Vec<TeamMemberRow> = self
            .inner
            .team_members
            .iter()
            .filter(|r| r.value().team_id == team_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| r.joined_at);
        Ok(rows)
    }

    async fn find_member(&self, team_id: &str, account_id: &str) -> DbResult<Option<TeamMemberRow>> {
        Ok(self
            .inner
            .team_members
            .get(&(team_id.to_string(), account_id.to_string()))
            .map(|r| r.value().clone()))
    }

    async fn list_for_member(&self, account_id: &str) -> DbResult<Vec<TeamRow>> {
        let rows = self
            .inner
            .team_members
            .iter()
            .filter(|r| r.value().account_id == account_id)
            .filter_map(|r| self.inner.teams.get(&r.value().team_id).map(|t| t.value().clone()))
            .collect();
        Ok(newest_first(rows, |r: &TeamRow| r.created_at))
    }

    async fn add_member(&self, member: CreateTeamMember) -> DbResult<bool> {
        let _guard = self.inner.write_lock.lock().await;

        if !self.inner.teams.contains_key(&member.team_id) {
            return Ok(false);
        }

        let key = (member.team_id.clone(), member.account_id.clone());
        let added = match self.inner.team_members.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(TeamMemberRow {
                    team_id: member.team_id.clone(),
                    account_id: member.account_id,
                    email: member.email,
                    role: member.role,
                    added_by: member.added_by,
                    joined_at: Utc::now(),
                });
                true
            }
        };
        if added {
            self.touch_team(&member.team_id);
        }
        Ok(added)
    }

    async fn remove_member(&self, team_id: &str, account_id: &str) -> DbResult<bool> {
        let removed = self
            .inner
            .team_members
            .remove(&(team_id.to_string(), account_id.to_string()))
            .is_some();
        if removed {
            self.touch_team(team_id);
        }
        Ok(removed)
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        let _guard = self.inner.write_lock.lock().await;
        Ok(self.drop_team(id))
    }
}

// ============================================================================
// Password shares
// ============================================================================

#[async_trait]
impl ShareRepository for MemoryStore {
    async fn create(&self, share: CreateShare) -> DbResult<ShareRow> {
        let row = ShareRow {
            id: share.id,
            password_id: share.password_id,
            shared_by: share.shared_by,
            shared_with: share.shared_with,
            team_id: share.team_id,
            permission: share.permission,
            expires_at: share.expires_at,
            created_at: Utc::now(),
        };
        self.inner.shares.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ShareRow>> {
        Ok(self.inner.shares.get(&id).map(|r| r.value().clone()))
    }

    async fn list_shared_with(&self, account_id: &str) -> DbResult<Vec<ShareRow>> {
        Ok(self.list_shares(|r| r.shared_with.as_deref() == Some(account_id)))
    }

    async fn list_by_team(&self, team_id: &str) -> DbResult<Vec<ShareRow>> {
        Ok(self.list_shares(|r| r.team_id.as_deref() == Some(team_id)))
    }

    async fn list_by_owner(&self, account_id: &str) -> DbResult<Vec<ShareRow>> {
        Ok(self.list_shares(|r| r.shared_by == account_id))
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        Ok(self.inner.shares.remove(&id).is_some())
    }
}
