//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.
//! Conversions into `passvault-types` domain types live here too; they never
//! fail on bad enum strings and instead fall back to the safe default.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use passvault_types::{
    Account, AccountId, ActivityLog, LastPayment, LogAction, PasswordShare, PaymentId,
    PaymentRecord, PaymentStatus, Role, SharePermission, Team, TeamMember, TeamRole, Tier,
    VaultItem, VaultKind,
};

/// Account row from the database
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: String,
    pub email: String,
    pub role: String,
    pub subscription_tier: String,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub subscription_updated_at: Option<DateTime<Utc>>,
    pub is_suspended: bool,
    pub suspended_at: Option<DateTime<Utc>>,
    pub suspended_by: Option<String>,
    pub last_payment: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payment row from the database
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
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

/// Vault item row (same shape in `passwords` and `personal_info`)
#[derive(Debug, Clone, FromRow)]
pub struct VaultItemRow {
    pub id: Uuid,
    pub user_id: String,
    pub label: String,
    pub payload: String,
    pub team_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Activity log row from the database
#[derive(Debug, Clone, FromRow)]
pub struct ActivityLogRow {
    pub id: Uuid,
    pub user_id: String,
    pub team_id: Option<String>,
    pub action: String,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Team row from the database
#[derive(Debug, Clone, FromRow)]
pub struct TeamRow {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Team membership row
#[derive(Debug, Clone, FromRow)]
pub struct TeamMemberRow {
    pub team_id: String,
    pub account_id: String,
    pub email: String,
    pub role: String,
    pub added_by: String,
    pub joined_at: DateTime<Utc>,
}

/// Password share row
#[derive(Debug, Clone, FromRow)]
pub struct ShareRow {
    pub id: Uuid,
    pub password_id: Uuid,
    pub shared_by: String,
    pub shared_with: Option<String>,
    pub team_id: Option<String>,
    pub permission: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AccountRow {
    /// Tier, falling back to free when the stored value is missing or malformed
    pub fn tier(&self) -> Tier {
        self.subscription_tier.parse().unwrap_or_else(|_| {
            tracing::warn!(
                account_id = %self.id,
                stored_tier = %self.subscription_tier,
                "Unrecognized subscription tier, treating as free"
            );
            Tier::Free
        })
    }

    /// Role, falling back to user when the stored value is malformed
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_else(|_| {
            tracing::warn!(
                account_id = %self.id,
                stored_role = %self.role,
                "Unrecognized role, treating as user"
            );
            Role::User
        })
    }

    /// Convert to the domain account
    pub fn into_account(self) -> Account {
        let tier = self.tier();
        let role = self.role();
        let last_payment = self
            .last_payment
            .and_then(|v| serde_json::from_value::<LastPayment>(v).ok());
        Account {
            id: AccountId(self.id),
            email: self.email,
            role,
            subscription_tier: tier,
            subscription_expires_at: self.subscription_expires_at,
            subscription_updated_at: self.subscription_updated_at,
            is_suspended: self.is_suspended,
            suspended_at: self.suspended_at,
            suspended_by: self.suspended_by.map(AccountId),
            last_payment,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl PaymentRow {
    /// Convert to the domain payment record
    pub fn into_record(self) -> PaymentRecord {
        let plan = self.plan.parse().unwrap_or_else(|_| {
            tracing::warn!(payment_id = %self.id, plan = %self.plan, "Unrecognized payment plan");
            Tier::Free
        });
        let status = self.status.parse().unwrap_or_else(|_| {
            tracing::warn!(payment_id = %self.id, status = %self.status, "Unrecognized payment status");
            PaymentStatus::Pending
        });
        PaymentRecord {
            id: PaymentId(self.id),
            user_id: AccountId(self.user_id),
            plan,
            amount_minor: self.amount_minor,
            currency: self.currency,
            status,
            created_at: self.created_at,
            order_id: self.order_id,
            payment_reference: self.payment_reference,
            metadata: self.metadata,
        }
    }
}

impl VaultItemRow {
    /// Convert to the domain vault item
    pub fn into_item(self, kind: VaultKind) -> VaultItem {
        VaultItem {
            id: self.id,
            user_id: AccountId(self.user_id),
            kind,
            label: self.label,
            payload: self.payload,
            team_id: self.team_id,
            created_at: self.created_at,
        }
    }
}

impl ActivityLogRow {
    /// Convert to the domain log entry; entries with unknown actions are skipped
    pub fn into_log(self) -> Option<ActivityLog> {
        let action: LogAction = match self.action.parse() {
            Ok(action) => action,
            Err(_) => {
                tracing::warn!(log_id = %self.id, action = %self.action, "Skipping log with unknown action");
                return None;
            }
        };
        Some(ActivityLog {
            id: self.id,
            user_id: AccountId(self.user_id),
            team_id: self.team_id,
            action,
            details: self.details,
            timestamp: self.timestamp,
        })
    }
}

impl TeamRow {
    /// Convert to the domain team with its members
    pub fn into_team(self, members: Vec<TeamMemberRow>) -> Team {
        Team {
            id: self.id,
            name: self.name,
            owner_id: AccountId(self.owner_id),
            members: members.into_iter().map(TeamMemberRow::into_member).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl TeamMemberRow {
    /// Role, falling back to plain member when malformed
    pub fn role(&self) -> TeamRole {
        self.role.parse().unwrap_or_else(|_| {
            tracing::warn!(
                team_id = %self.team_id,
                account_id = %self.account_id,
                stored_role = %self.role,
                "Unrecognized team role, treating as member"
            );
            TeamRole::Member
        })
    }

    pub fn into_member(self) -> TeamMember {
        TeamMember {
            role: self.role(),
            account_id: AccountId(self.account_id),
            email: self.email,
            added_by: AccountId(self.added_by),
            joined_at: self.joined_at,
        }
    }
}

impl ShareRow {
    /// Convert to the domain share; a malformed permission reads as `read`
    pub fn into_share(self) -> PasswordShare {
        let permission = self.permission.parse().unwrap_or(SharePermission::Read);
        PasswordShare {
            id: self.id,
            password_id: self.password_id,
            shared_by: AccountId(self.shared_by),
            shared_with: self.shared_with.map(AccountId),
            team_id: self.team_id,
            permission,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tier: &str, role: &str) -> AccountRow {
        AccountRow {
            id: "acct123".into(),
            email: "a@example.com".into(),
            role: role.into(),
            subscription_tier: tier.into(),
            subscription_expires_at: None,
            subscription_updated_at: None,
            is_suspended: false,
            suspended_at: None,
            suspended_by: None,
            last_payment: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_malformed_tier_falls_back_to_free() {
        assert_eq!(row("gold", "user").tier(), Tier::Free);
        assert_eq!(row("", "user").tier(), Tier::Free);
        assert_eq!(row("Premium", "user").tier(), Tier::Premium);
    }

    #[test]
    fn test_malformed_role_falls_back_to_user() {
        assert_eq!(row("free", "root").role(), Role::User);
        assert_eq!(row("free", "superAdmin").role(), Role::SuperAdmin);
    }

    #[test]
    fn test_into_account_ignores_unreadable_last_payment() {
        let mut r = row("business", "admin");
        r.last_payment = Some(serde_json::json!({"nonsense": true}));
        let account = r.into_account();
        assert_eq!(account.subscription_tier, Tier::Business);
        assert_eq!(account.role, Role::Admin);
        assert!(account.last_payment.is_none());
    }

    #[test]
    fn test_team_member_role_falls_back_to_member() {
        let row = TeamMemberRow {
            team_id: "team-1".into(),
            account_id: "u1".into(),
            email: "u1@example.com".into(),
            role: "overlord".into(),
            added_by: "owner".into(),
            joined_at: Utc::now(),
        };
        assert_eq!(row.into_member().role, TeamRole::Member);
    }
}
