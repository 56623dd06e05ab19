//! Subscription tiers and the tier catalog

use serde::{Deserialize, Serialize};

use crate::Capability;

/// Subscription tier levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Free tier - 3 passwords, 1 personal info record
    #[default]
    Free,
    /// Premium tier - unlimited passwords, sharing, activity logs
    Premium,
    /// Business tier - everything, including teams and the admin dashboard
    Business,
}

impl Tier {
    /// All tiers, cheapest first
    pub const ALL: [Tier; 3] = [Tier::Free, Tier::Premium, Tier::Business];

    /// Whether this tier is paid (and therefore carries an expiration)
    pub const fn is_paid(&self) -> bool {
        !matches!(self, Self::Free)
    }

    /// Get the feature set for this tier
    pub const fn features(&self) -> FeatureSet {
        features_for(*self)
    }

    /// Human readable plan name, as shown on checkout items
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Premium => "Premium",
            Self::Business => "Business",
        }
    }

    /// Wire name of this tier
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
            Self::Business => "business",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "premium" => Ok(Self::Premium),
            "business" => Ok(Self::Business),
            _ => Err(TierParseError(s.to_string())),
        }
    }
}

/// Error parsing a tier string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tier: {0}")]
pub struct TierParseError(pub String);

/// A count ceiling. `Unlimited` is a distinct value, never a large number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum Quota {
    /// At most this many records
    Limited(u32),
    /// No ceiling
    Unlimited,
}

impl Quota {
    /// Whether one more record may be added when `current` already exist
    pub const fn allows(&self, current: u64) -> bool {
        match self {
            Self::Limited(limit) => current < *limit as u64,
            Self::Unlimited => true,
        }
    }

    /// Numeric limit, `None` when unlimited
    pub const fn limit(&self) -> Option<u32> {
        match self {
            Self::Limited(limit) => Some(*limit),
            Self::Unlimited => None,
        }
    }
}

/// Capability flags and quotas granted by a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    pub max_passwords: Quota,
    pub max_personal_infos: Quota,
    pub can_share_passwords: bool,
    pub has_team_features: bool,
    pub has_activity_logs: bool,
    pub has_custom_fields: bool,
    pub has_export: bool,
    pub has_api_access: bool,
    pub has_custom_branding: bool,
    pub has_priority_support: bool,
    pub admin_dashboard: bool,
    pub has_advanced_encryption: bool,
}

impl FeatureSet {
    /// Look up a single capability flag
    pub const fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::CanSharePasswords => self.can_share_passwords,
            Capability::HasTeamFeatures => self.has_team_features,
            Capability::HasActivityLogs => self.has_activity_logs,
            Capability::HasCustomFields => self.has_custom_fields,
            Capability::HasExport => self.has_export,
            Capability::HasApiAccess => self.has_api_access,
            Capability::HasCustomBranding => self.has_custom_branding,
            Capability::HasPrioritySupport => self.has_priority_support,
            Capability::AdminDashboard => self.admin_dashboard,
            Capability::HasAdvancedEncryption => self.has_advanced_encryption,
        }
    }

    /// Quota for a vault item kind
    pub const fn quota_for(&self, kind: crate::VaultKind) -> Quota {
        match kind {
            crate::VaultKind::Password => self.max_passwords,
            crate::VaultKind::PersonalInfo => self.max_personal_infos,
        }
    }
}

/// The tier catalog. Total over [`Tier`]; callers normalise unknown input to
/// [`Tier::Free`] before calling.
pub const fn features_for(tier: Tier) -> FeatureSet {
    match tier {
        Tier::Free => FeatureSet {
            max_passwords: Quota::Limited(3),
            max_personal_infos: Quota::Limited(1),
            can_share_passwords: false,
            has_team_features: false,
            has_activity_logs: false,
            has_custom_fields: false,
            has_export: false,
            has_api_access: false,
            has_custom_branding: false,
            has_priority_support: false,
            admin_dashboard: false,
            has_advanced_encryption: false,
        },
        Tier::Premium => FeatureSet {
            max_passwords: Quota::Unlimited,
            max_personal_infos: Quota::Limited(50),
            can_share_passwords: true,
            has_team_features: false,
            has_activity_logs: true,
            has_custom_fields: true,
            has_export: true,
            has_api_access: false,
            has_custom_branding: false,
            has_priority_support: true,
            admin_dashboard: false,
            has_advanced_encryption: true,
        },
        Tier::Business => FeatureSet {
            max_passwords: Quota::Unlimited,
            max_personal_infos: Quota::Unlimited,
            can_share_passwords: true,
            has_team_features: true,
            has_activity_logs: true,
            has_custom_fields: true,
            has_export: true,
            has_api_access: true,
            has_custom_branding: true,
            has_priority_support: true,
            admin_dashboard: true,
            has_advanced_encryption: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parse_is_case_insensitive() {
        assert_eq!("Premium".parse::<Tier>(), Ok(Tier::Premium));
        assert_eq!("BUSINESS".parse::<Tier>(), Ok(Tier::Business));
        assert_eq!(" free ".parse::<Tier>(), Ok(Tier::Free));
        assert!("enterprise".parse::<Tier>().is_err());
        assert!("".parse::<Tier>().is_err());
    }

    #[test]
    fn test_free_quotas() {
        let free = features_for(Tier::Free);
        assert_eq!(free.max_passwords, Quota::Limited(3));
        assert_eq!(free.max_personal_infos, Quota::Limited(1));
        assert!(free.max_passwords.allows(2));
        assert!(!free.max_passwords.allows(3));
    }

    #[test]
    fn test_unlimited_never_overflows() {
        assert!(Quota::Unlimited.allows(u64::MAX));
        assert_eq!(Quota::Unlimited.limit(), None);
        assert!(!Quota::Limited(u32::MAX).allows(u64::from(u32::MAX)));
    }

    #[test]
    fn test_team_and_admin_are_business_only() {
        for tier in [Tier::Free, Tier::Premium] {
            assert!(!tier.features().has_team_features);
            assert!(!tier.features().admin_dashboard);
        }
        assert!(Tier::Business.features().has_team_features);
        assert!(Tier::Business.features().admin_dashboard);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for tier in Tier::ALL {
            assert_eq!(tier.to_string().parse::<Tier>(), Ok(tier));
        }
    }
}
