//! Vault item types (passwords and personal info)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AccountId;

/// Kind of vault item; each kind has its own quota and collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VaultKind {
    Password,
    PersonalInfo,
}

impl VaultKind {
    /// Storage collection for this kind
    pub const fn collection(&self) -> &'static str {
        match self {
            Self::Password => "passwords",
            Self::PersonalInfo => "personal_info",
        }
    }

    /// Path segment used by the HTTP API
    pub const fn path_segment(&self) -> &'static str {
        match self {
            Self::Password => "passwords",
            Self::PersonalInfo => "personal-info",
        }
    }
}

impl std::fmt::Display for VaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl std::str::FromStr for VaultKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passwords" | "password" => Ok(Self::Password),
            "personal-info" | "personal_info" | "personalInfo" => Ok(Self::PersonalInfo),
            other => Err(format!("unknown vault item kind: {other}")),
        }
    }
}

/// A stored vault item. The payload is encrypted client-side and opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultItem {
    pub id: Uuid,
    pub user_id: AccountId,
    pub kind: VaultKind,
    pub label: String,
    pub payload: String,
    pub team_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
