//! Team and password sharing types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AccountId;

/// Role of a member within a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    /// Created the team; cannot be removed
    Owner,
    /// May add and remove members and share on the team's behalf
    Admin,
    #[default]
    Member,
}

impl TeamRole {
    /// Owners and admins manage membership
    pub const fn can_manage(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl std::fmt::Display for TeamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TeamRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(format!("unknown team role: {other}")),
        }
    }
}

/// One member of a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub account_id: AccountId,
    pub email: String,
    pub role: TeamRole,
    pub added_by: AccountId,
    pub joined_at: DateTime<Utc>,
}

/// A team of accounts sharing vault items and activity logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub owner_id: AccountId,
    pub members: Vec<TeamMember>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    /// Membership entry for an account, if any
    pub fn member(&self, id: &AccountId) -> Option<&TeamMember> {
        self.members.iter().find(|m| &m.account_id == id)
    }

    pub fn is_member(&self, id: &AccountId) -> bool {
        self.member(id).is_some()
    }

    /// Whether the account may change membership
    pub fn can_manage(&self, id: &AccountId) -> bool {
        &self.owner_id == id || self.member(id).is_some_and(|m| m.role.can_manage())
    }
}

/// Access granted by a share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharePermission {
    #[default]
    Read,
    Write,
}

impl SharePermission {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl std::str::FromStr for SharePermission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            other => Err(format!("unknown share permission: {other}")),
        }
    }
}

/// A password shared with one account or with a whole team
///
/// Exactly one of `shared_with` and `team_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordShare {
    pub id: Uuid,
    pub password_id: Uuid,
    pub shared_by: AccountId,
    pub shared_with: Option<AccountId>,
    pub team_id: Option<String>,
    pub permission: SharePermission,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordShare {
    /// Expired shares grant nothing
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires| expires > now)
    }
}
