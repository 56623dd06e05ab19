//! Activity log types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AccountId;

/// Logged action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    PasswordCreate,
    PasswordUpdate,
    PasswordDelete,
    PasswordShare,
    PersonalInfoCreate,
    PersonalInfoDelete,
    TeamCreate,
    TeamUpdate,
    TeamDelete,
    MemberAdd,
    MemberRemove,
    Login,
    Logout,
    SettingsUpdate,
    SubscriptionUpdated,
    AccountSuspended,
    AccountUnsuspended,
    RoleUpdated,
}

impl LogAction {
    /// Wire name of this action
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PasswordCreate => "password_create",
            Self::PasswordUpdate => "password_update",
            Self::PasswordDelete => "password_delete",
            Self::PasswordShare => "password_share",
            Self::PersonalInfoCreate => "personal_info_create",
            Self::PersonalInfoDelete => "personal_info_delete",
            Self::TeamCreate => "team_create",
            Self::TeamUpdate => "team_update",
            Self::TeamDelete => "team_delete",
            Self::MemberAdd => "member_add",
            Self::MemberRemove => "member_remove",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::SettingsUpdate => "settings_update",
            Self::SubscriptionUpdated => "subscription_updated",
            Self::AccountSuspended => "account_suspended",
            Self::AccountUnsuspended => "account_unsuspended",
            Self::RoleUpdated => "role_updated",
        }
    }

    /// Admin actions are always recorded, regardless of the subject's tier
    pub const fn is_administrative(&self) -> bool {
        matches!(
            self,
            Self::SubscriptionUpdated
                | Self::AccountSuspended
                | Self::AccountUnsuspended
                | Self::RoleUpdated
        )
    }
}

impl std::fmt::Display for LogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_string()))
            .map_err(|_| format!("unknown activity action: {s}"))
    }
}

/// One activity log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: AccountId,
    pub team_id: Option<String>,
    pub action: LogAction,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Filter for activity log queries
#[derive(Debug, Clone, Default)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub actions: Vec<LogAction>,
    pub team_id: Option<String>,
}

impl ActivityQuery {
    /// Default number of entries returned
    pub const DEFAULT_LIMIT: i64 = 100;
    /// Hard ceiling on entries returned
    pub const MAX_LIMIT: i64 = 500;

    /// Effective limit after defaults and clamping
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    /// Whether an entry satisfies every filter except the limit
    pub fn matches(&self, log: &ActivityLog) -> bool {
        self.start.map_or(true, |start| log.timestamp >= start)
            && self.end.map_or(true, |end| log.timestamp <= end)
            && (self.actions.is_empty() || self.actions.contains(&log.action))
            && self
                .team_id
                .as_ref()
                .map_or(true, |team| log.team_id.as_ref() == Some(team))
    }
}
