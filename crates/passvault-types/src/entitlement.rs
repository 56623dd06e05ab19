//! Capability and entitlement check types

use serde::{Deserialize, Serialize};

use crate::Tier;

/// Boolean capabilities a tier may grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// Share passwords with other users
    CanSharePasswords,
    /// Teams and team members
    HasTeamFeatures,
    /// Activity log recording and reads
    HasActivityLogs,
    /// Custom fields on vault items
    HasCustomFields,
    /// Data export
    HasExport,
    /// Programmatic API access
    HasApiAccess,
    /// Custom branding
    HasCustomBranding,
    /// Priority support tickets
    HasPrioritySupport,
    /// Admin dashboard and account administration
    AdminDashboard,
    /// Advanced (vs. basic) encryption strength
    HasAdvancedEncryption,
}

impl Capability {
    /// Every capability
    pub const ALL: [Capability; 10] = [
        Self::CanSharePasswords,
        Self::HasTeamFeatures,
        Self::HasActivityLogs,
        Self::HasCustomFields,
        Self::HasExport,
        Self::HasApiAccess,
        Self::HasCustomBranding,
        Self::HasPrioritySupport,
        Self::AdminDashboard,
        Self::HasAdvancedEncryption,
    ];

    /// Wire name (camelCase)
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CanSharePasswords => "canSharePasswords",
            Self::HasTeamFeatures => "hasTeamFeatures",
            Self::HasActivityLogs => "hasActivityLogs",
            Self::HasCustomFields => "hasCustomFields",
            Self::HasExport => "hasExport",
            Self::HasApiAccess => "hasApiAccess",
            Self::HasCustomBranding => "hasCustomBranding",
            Self::HasPrioritySupport => "hasPrioritySupport",
            Self::AdminDashboard => "adminDashboard",
            Self::HasAdvancedEncryption => "hasAdvancedEncryption",
        }
    }

    /// Cheapest tier that grants this capability
    pub fn min_tier(&self) -> Tier {
        Tier::ALL
            .into_iter()
            .find(|tier| tier.features().allows(*self))
            .unwrap_or(Tier::Business)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = CapabilityParseError;

    /// Accepts the camelCase wire name or its snake_case form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.chars().filter(|c| *c != '_').collect::<String>().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|cap| cap.as_str().to_lowercase() == normalized)
            .ok_or_else(|| CapabilityParseError(s.to_string()))
    }
}

/// Error parsing a capability name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capability: {0}")]
pub struct CapabilityParseError(pub String);

/// Why the gate reached its decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Admin or super admin role bypass
    AdminOverride,
    /// The account's tier grants the capability
    TierGrant,
    /// The account is suspended
    Suspended,
    /// The account's tier does not include the capability
    NotInTier,
    /// The account could not be read
    Unavailable,
}

/// Entitlement check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitlementCheck {
    /// Capability that was checked
    pub capability: Capability,
    /// Whether access is allowed
    pub allowed: bool,
    /// How the decision was reached
    pub decision: Decision,
    /// Reason if denied
    pub reason: Option<String>,
}

impl EntitlementCheck {
    /// Allowed check
    pub fn allow(capability: Capability, decision: Decision) -> Self {
        Self {
            capability,
            allowed: true,
            decision,
            reason: None,
        }
    }

    /// Denied check with a user-facing reason
    pub fn deny(capability: Capability, decision: Decision) -> Self {
        let reason = match decision {
            Decision::Suspended => "Account is suspended".to_string(),
            Decision::Unavailable => "Subscription could not be verified".to_string(),
            _ if capability == Capability::AdminDashboard => "Admin access required".to_string(),
            _ => format!(
                "Upgrade required: '{capability}' requires the {} plan or higher",
                capability.min_tier()
            ),
        };
        Self {
            capability,
            allowed: false,
            decision,
            reason: Some(reason),
        }
    }
}
