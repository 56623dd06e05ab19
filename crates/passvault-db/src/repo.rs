//! Repository traits
//!
//! Define async repository interfaces for record store operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use passvault_types::{ActivityQuery, LastPayment, VaultKind};

use crate::error::DbResult;
use crate::models::*;

/// Account repository trait
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by ID
    async fn find_by_id(&self, id: &str) -> DbResult<Option<AccountRow>>;

    /// List all accounts, newest first
    async fn list(&self) -> DbResult<Vec<AccountRow>>;

    /// Find an account by email, matched exactly
    async fn find_by_email(&self, email: &str) -> DbResult<Option<AccountRow>>;

    /// Create a new account
    async fn create(&self, account: CreateAccount) -> DbResult<AccountRow>;

    /// Create the account unless one with this id exists, and return the
    /// stored row either way. Never touches an existing row.
    async fn create_if_missing(&self, account: CreateAccount) -> DbResult<AccountRow>;

    /// Set tier and expiration. Returns false if the account does not exist.
    async fn update_subscription(
        &self,
        id: &str,
        tier: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> DbResult<bool>;

    /// Set role. Returns false if the account does not exist.
    async fn update_role(&self, id: &str, role: &str) -> DbResult<bool>;

    /// Suspend or unsuspend. `by` is recorded on suspend and cleared on unsuspend.
    async fn set_suspended(&self, id: &str, suspended: bool, by: Option<&str>) -> DbResult<bool>;

    /// Whether any admin or super admin exists
    async fn any_admin(&self) -> DbResult<bool>;

    /// Make this principal an admin on the business tier, creating the account
    /// if needed, but only if no admin exists yet. Returns `None` otherwise.
    async fn promote_first_admin(&self, account: CreateAccount) -> DbResult<Option<AccountRow>>;

    /// Delete the account with its passwords, personal info and payments, in
    /// one transaction. Returns false if the account does not exist.
    async fn delete_cascade(&self, id: &str) -> DbResult<bool>;
}

/// Create account input
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub id: String,
    pub email: String,
    pub role: String,
    pub tier: String,
}

/// Payment repository trait
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Find a payment by merchant order id
    async fn find_by_order_id(&self, order_id: &str) -> DbResult<Option<PaymentRow>>;

    /// Payments for an account, newest first
    async fn list_by_user(&self, user_id: &str, limit: i64) -> DbResult<Vec<PaymentRow>>;

    /// Record a payment and move the account onto its plan, atomically.
    ///
    /// The insert is conditional on no payment with the same order id
    /// existing; when one does, nothing is written.
    async fn apply_payment(
        &self,
        payment: CreatePayment,
        expires_at: DateTime<Utc>,
    ) -> DbResult<ApplyOutcome>;
}

/// Create payment input
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub id: Uuid,
    pub user_id: String,
    pub plan: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub order_id: String,
    pub payment_reference: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl CreatePayment {
    /// Snapshot stored on the account
    pub fn last_payment(&self) -> LastPayment {
        LastPayment {
            amount_minor: self.amount_minor,
            currency: self.currency.clone(),
            paid_at: self.created_at,
            payment_reference: self.payment_reference.clone(),
            order_id: self.order_id.clone(),
        }
    }

    /// Row as it will be stored
    pub fn to_row(&self) -> PaymentRow {
        PaymentRow {
            id: self.id,
            user_id: self.user_id.clone(),
            plan: self.plan.clone(),
            amount_minor: self.amount_minor,
            currency: self.currency.clone(),
            status: self.status.clone(),
            order_id: self.order_id.clone(),
            payment_reference: self.payment_reference.clone(),
            metadata: self.metadata.clone(),
            created_at: self.created_at,
        }
    }
}

/// Result of [`PaymentRepository::apply_payment`]
#[derive(Debug, Clone)]
pub enum ApplyOutcome {
    /// Payment recorded and account updated
    Applied(PaymentRow),
    /// A payment with this order id was already recorded; nothing written
    Duplicate,
    /// The account disappeared; nothing written
    AccountMissing,
}

/// Vault item repository trait
#[async_trait]
pub trait VaultItemRepository: Send + Sync {
    /// Number of items of this kind owned by the account
    async fn count_by_user(&self, kind: VaultKind, user_id: &str) -> DbResult<i64>;

    /// A single item by id, whoever owns it
    async fn find_by_id(&self, kind: VaultKind, id: Uuid) -> DbResult<Option<VaultItemRow>>;

    /// Items of this kind owned by the account, newest first
    async fn list_by_user(&self, kind: VaultKind, user_id: &str) -> DbResult<Vec<VaultItemRow>>;

    /// Insert an item unless the owner already holds `limit` items of this
    /// kind. The count and insert are serialized per owner. `None` = no limit.
    async fn create_within_quota(
        &self,
        kind: VaultKind,
        item: CreateVaultItem,
        limit: Option<i64>,
    ) -> DbResult<Option<VaultItemRow>>;

    /// Delete an owned item and any shares of it. Returns false if no such item.
    async fn delete(&self, kind: VaultKind, user_id: &str, id: Uuid) -> DbResult<bool>;

    /// Total items of this kind
    async fn count_all(&self, kind: VaultKind) -> DbResult<i64>;

    /// Items of this kind created at or after `since`
    async fn count_created_since(&self, kind: VaultKind, since: DateTime<Utc>) -> DbResult<i64>;
}

/// Create vault item input
#[derive(Debug, Clone)]
pub struct CreateVaultItem {
    pub id: Uuid,
    pub user_id: String,
    pub label: String,
    pub payload: String,
    pub team_id: Option<String>,
}

/// Activity log repository trait
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Append an entry
    async fn append(&self, entry: CreateActivityLog) -> DbResult<ActivityLogRow>;

    /// Entries for an account, newest first
    async fn query_by_user(&self, user_id: &str, query: &ActivityQuery) -> DbResult<Vec<ActivityLogRow>>;

    /// Entries for a team, newest first
    async fn query_by_team(&self, team_id: &str, query: &ActivityQuery) -> DbResult<Vec<ActivityLogRow>>;

    /// All entries at or after `since`, newest first
    async fn list_since(&self, since: DateTime<Utc>) -> DbResult<Vec<ActivityLogRow>>;

    /// Total entries
    async fn count_all(&self) -> DbResult<i64>;
}

/// Create activity log input
#[derive(Debug, Clone)]
pub struct CreateActivityLog {
    pub id: Uuid,
    pub user_id: String,
    pub team_id: Option<String>,
    pub action: String,
    pub details: serde_json::Value,
}

/// Team repository trait
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Create a team with its owner as the first member
    async fn create(&self, team: CreateTeam) -> DbResult<TeamRow>;

    /// Find a team by id
    async fn find_by_id(&self, id: &str) -> DbResult<Option<TeamRow>>;

    /// Members of a team, oldest first
    async fn members(&self, team_id: &str) -> DbResult<Vec<TeamMemberRow>>;

    /// One membership, if the account belongs to the team
    async fn find_member(&self, team_id: &str, account_id: &str) -> DbResult<Option<TeamMemberRow>>;

    /// Teams the account belongs to, newest first
    async fn list_for_member(&self, account_id: &str) -> DbResult<Vec<TeamRow>>;

    /// Add a member. Returns false if the account is already a member.
    async fn add_member(&self, member: CreateTeamMember) -> DbResult<bool>;

    /// Remove a member. Returns false if the account was not a member.
    async fn remove_member(&self, team_id: &str, account_id: &str) -> DbResult<bool>;

    /// Delete a team with its memberships and team shares
    async fn delete(&self, id: &str) -> DbResult<bool>;
}

/// Create team input
#[derive(Debug, Clone)]
pub struct CreateTeam {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub owner_email: String,
}

/// Add team member input
#[derive(Debug, Clone)]
pub struct CreateTeamMember {
    pub team_id: String,
    pub account_id: String,
    pub email: String,
    pub role: String,
    pub added_by: String,
}

/// Password share repository trait
#[async_trait]
pub trait ShareRepository: Send + Sync {
    /// Record a share
    async fn create(&self, share: CreateShare) -> DbResult<ShareRow>;

    /// Find a share by id
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ShareRow>>;

    /// Shares addressed directly to the account, newest first
    async fn list_shared_with(&self, account_id: &str) -> DbResult<Vec<ShareRow>>;

    /// Shares addressed to a team, newest first
    async fn list_by_team(&self, team_id: &str) -> DbResult<Vec<ShareRow>>;

    /// Shares the account created, newest first
    async fn list_by_owner(&self, account_id: &str) -> DbResult<Vec<ShareRow>>;

    /// Delete a share. Returns false if no such share.
    async fn delete(&self, id: Uuid) -> DbResult<bool>;
}

/// Create share input
#[derive(Debug, Clone)]
pub struct CreateShare {
    pub id: Uuid,
    pub password_id: Uuid,
    pub shared_by: String,
    pub shared_with: Option<String>,
    pub team_id: Option<String>,
    pub permission: String,
    pub expires_at: Option<DateTime<Utc>>,
}
