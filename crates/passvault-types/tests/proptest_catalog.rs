//! Property-based tests for the tier catalog and status evaluator
//!
//! These tests verify:
//! - The catalog is total and deterministic
//! - Business grants every premium capability
//! - Quotas never shrink with a more expensive tier
//! - Expiration arithmetic is a calendar-day ceiling with an exclusive boundary

use chrono::{Duration, TimeZone, Utc};
use passvault_types::{features_for, Capability, Quota, SubscriptionStatus, Tier};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_tier() -> impl Strategy<Value = Tier> {
    prop_oneof![Just(Tier::Free), Just(Tier::Premium), Just(Tier::Business)]
}

fn arb_capability() -> impl Strategy<Value = Capability> {
    proptest::sample::select(Capability::ALL.to_vec())
}

fn quota_rank(quota: Quota) -> u64 {
    match quota {
        Quota::Limited(n) => u64::from(n),
        Quota::Unlimited => u64::MAX,
    }
}

// ============================================================================
// Catalog Properties
// ============================================================================

proptest! {
    /// Property: the catalog is a pure function of the tier
    #[test]
    fn prop_catalog_is_deterministic(tier in arb_tier()) {
        prop_assert_eq!(features_for(tier), features_for(tier));
        prop_assert_eq!(tier.features(), features_for(tier));
    }

    /// Property: every premium capability is also granted by business
    #[test]
    fn prop_business_includes_premium(cap in arb_capability()) {
        if features_for(Tier::Premium).allows(cap) {
            prop_assert!(features_for(Tier::Business).allows(cap));
        }
    }

    /// Property: free grants nothing that premium lacks
    #[test]
    fn prop_premium_includes_free(cap in arb_capability()) {
        if features_for(Tier::Free).allows(cap) {
            prop_assert!(features_for(Tier::Premium).allows(cap));
        }
    }

    /// Property: a capability's minimum tier actually grants it
    #[test]
    fn prop_min_tier_grants(cap in arb_capability()) {
        prop_assert!(cap.min_tier().features().allows(cap));
    }

    /// Property: capability names parse back to themselves
    #[test]
    fn prop_capability_name_round_trip(cap in arb_capability()) {
        prop_assert_eq!(cap.as_str().parse::<Capability>().unwrap(), cap);
    }

    /// Property: a limited quota admits exactly the counts below its limit
    #[test]
    fn prop_limited_quota_boundary(limit in 0u32..10_000, current in 0u64..20_000) {
        prop_assert_eq!(Quota::Limited(limit).allows(current), current < u64::from(limit));
    }
}

#[test]
fn test_team_and_admin_are_business_only() {
    for cap in [Capability::HasTeamFeatures, Capability::AdminDashboard] {
        assert!(!features_for(Tier::Free).allows(cap));
        assert!(!features_for(Tier::Premium).allows(cap));
        assert!(features_for(Tier::Business).allows(cap));
    }
}

#[test]
fn test_quotas_grow_with_tier() {
    let ranks: Vec<_> = Tier::ALL
        .iter()
        .map(|t| {
            let f = t.features();
            (quota_rank(f.max_passwords), quota_rank(f.max_personal_infos))
        })
        .collect();
    for pair in ranks.windows(2) {
        assert!(pair[0].0 <= pair[1].0);
        assert!(pair[0].1 <= pair[1].1);
    }
}

// ============================================================================
// Status Evaluator Properties
// ============================================================================

proptest! {
    /// Property: suspension always deactivates, with or without expiration
    #[test]
    fn prop_suspended_is_never_active(offset_secs in -10_000_000i64..10_000_000, has_exp: bool) {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let exp = has_exp.then(|| now + Duration::seconds(offset_secs));
        let status = SubscriptionStatus::evaluate(true, exp, now);
        prop_assert!(!status.is_active);
        prop_assert!(status.is_suspended);
    }

    /// Property: any future expiration is at least one day away and active
    #[test]
    fn prop_future_expiration_is_active(offset_ms in 1i64..(400 * 86_400_000)) {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let status = SubscriptionStatus::evaluate(false, Some(now + Duration::milliseconds(offset_ms)), now);
        let days = status.days_until_expiration.unwrap();
        prop_assert!(days >= 1);
        prop_assert!(status.is_active);
        // ceiling: days - 1 < offset / day <= days
        prop_assert!((days - 1) * 86_400_000 < offset_ms);
        prop_assert!(offset_ms <= days * 86_400_000);
    }

    /// Property: an expiration at or before now is inactive
    #[test]
    fn prop_past_expiration_is_inactive(offset_ms in 0i64..(400 * 86_400_000)) {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let status = SubscriptionStatus::evaluate(false, Some(now - Duration::milliseconds(offset_ms)), now);
        prop_assert!(!status.is_active);
        prop_assert!(status.days_until_expiration.unwrap() <= 0);
    }
}
