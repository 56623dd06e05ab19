//! Account types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{SubscriptionStatus, Tier};

/// Unique account identifier, owned by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    /// Create an account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular user
    #[default]
    User,
    /// Administrator
    Admin,
    /// Super administrator
    #[serde(alias = "superAdmin")]
    SuperAdmin,
}

impl Role {
    /// Admin and super admin bypass every entitlement check
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Wire name of this role
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}

/// Error parsing a role string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

/// Snapshot of the most recent successful payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastPayment {
    /// Amount in minor currency units
    pub amount_minor: i64,
    pub currency: String,
    pub paid_at: DateTime<Utc>,
    /// Gateway payment id
    pub payment_reference: Option<String>,
    pub order_id: String,
}

/// An account, one per principal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub role: Role,
    pub subscription_tier: Tier,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub subscription_updated_at: Option<DateTime<Utc>>,
    pub is_suspended: bool,
    pub suspended_at: Option<DateTime<Utc>>,
    pub suspended_by: Option<AccountId>,
    pub last_payment: Option<LastPayment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// A fresh free-tier user account
    pub fn new(id: AccountId, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: email.into(),
            role: Role::User,
            subscription_tier: Tier::Free,
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

    /// Subscription status at `now`
    pub fn status_at(&self, now: DateTime<Utc>) -> SubscriptionStatus {
        SubscriptionStatus::evaluate(self.is_suspended, self.subscription_expires_at, now)
    }

    /// Subscription status right now
    pub fn status(&self) -> SubscriptionStatus {
        self.status_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("superAdmin".parse::<Role>(), Ok(Role::SuperAdmin));
        assert_eq!("super_admin".parse::<Role>(), Ok(Role::SuperAdmin));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_accepts_camel_alias() {
        let role: Role = serde_json::from_str("\"superAdmin\"").unwrap();
        assert_eq!(role, Role::SuperAdmin);
        assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), "\"super_admin\"");
    }

    #[test]
    fn test_new_account_is_free_user() {
        let account = Account::new(AccountId::from("acct123"), "a@example.com");
        assert_eq!(account.role, Role::User);
        assert_eq!(account.subscription_tier, Tier::Free);
        assert!(account.status().is_active);
    }
}
