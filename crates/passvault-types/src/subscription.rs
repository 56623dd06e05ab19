//! Subscription status types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Length of a paid period granted by one payment or an admin tier change
pub const SUBSCRIPTION_PERIOD_DAYS: i64 = 30;

/// Expiration for a period starting at `now`
pub fn period_end_from(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(SUBSCRIPTION_PERIOD_DAYS)
}

/// Derived subscription status. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub is_active: bool,
    pub is_suspended: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub days_until_expiration: Option<i64>,
}

impl SubscriptionStatus {
    /// Compute status from an account's suspension flag and expiration.
    ///
    /// Days are a calendar-day ceiling: 30.1 days left reports 31, exactly
    /// 30.0 reports 30. Zero or fewer days left is inactive.
    pub fn evaluate(
        is_suspended: bool,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let Some(expires_at) = expires_at else {
            return Self {
                is_active: !is_suspended,
                is_suspended,
                expires_at: None,
                days_until_expiration: None,
            };
        };

        let days = ceil_days((expires_at - now).num_milliseconds());

        Self {
            is_active: days > 0 && !is_suspended,
            is_suspended,
            expires_at: Some(expires_at),
            days_until_expiration: Some(days),
        }
    }

    /// Status shown when account data is missing or unreadable
    pub const fn unknown() -> Self {
        Self {
            is_active: true,
            is_suspended: false,
            expires_at: None,
            days_until_expiration: None,
        }
    }

    /// Paid subscription expiring within `days` (but not yet expired)
    pub fn expires_within(&self, days: i64) -> bool {
        matches!(self.days_until_expiration, Some(d) if d > 0 && d <= days)
    }
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Ceiling division of milliseconds into days, correct for negative spans
fn ceil_days(millis: i64) -> i64 {
    let days = millis / MILLIS_PER_DAY;
    if millis % MILLIS_PER_DAY > 0 {
        days + 1
    } else {
        days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_expiration_follows_suspension() {
        let now = Utc::now();
        let status = SubscriptionStatus::evaluate(false, None, now);
        assert!(status.is_active);
        assert_eq!(status.days_until_expiration, None);

        let status = SubscriptionStatus::evaluate(true, None, now);
        assert!(!status.is_active);
        assert!(status.is_suspended);
    }

    #[test]
    fn test_expiring_exactly_now_is_inactive() {
        let now = Utc::now();
        let status = SubscriptionStatus::evaluate(false, Some(now), now);
        assert_eq!(status.days_until_expiration, Some(0));
        assert!(!status.is_active);
    }

    #[test]
    fn test_one_second_left_is_one_day() {
        let now = Utc::now();
        let status = SubscriptionStatus::evaluate(false, Some(now + Duration::seconds(1)), now);
        assert_eq!(status.days_until_expiration, Some(1));
        assert!(status.is_active);
    }

    #[test]
    fn test_ceiling_not_floor() {
        let now = Utc::now();
        let exact = now + Duration::days(30);
        assert_eq!(
            SubscriptionStatus::evaluate(false, Some(exact), now).days_until_expiration,
            Some(30)
        );

        let a_bit_more = exact + Duration::hours(3);
        assert_eq!(
            SubscriptionStatus::evaluate(false, Some(a_bit_more), now).days_until_expiration,
            Some(31)
        );
    }

    #[test]
    fn test_past_expiration() {
        let now = Utc::now();
        let status = SubscriptionStatus::evaluate(false, Some(now - Duration::hours(36)), now);
        assert_eq!(status.days_until_expiration, Some(-1));
        assert!(!status.is_active);

        let status = SubscriptionStatus::evaluate(false, Some(now - Duration::hours(12)), now);
        assert_eq!(status.days_until_expiration, Some(0));
        assert!(!status.is_active);
    }

    #[test]
    fn test_suspension_overrides_remaining_time() {
        let now = Utc::now();
        let status = SubscriptionStatus::evaluate(true, Some(now + Duration::days(10)), now);
        assert!(!status.is_active);
        assert_eq!(status.days_until_expiration, Some(10));
    }

    #[test]
    fn test_expires_within() {
        let now = Utc::now();
        let soon = SubscriptionStatus::evaluate(false, Some(now + Duration::days(3)), now);
        assert!(soon.expires_within(7));
        let later = SubscriptionStatus::evaluate(false, Some(now + Duration::days(20)), now);
        assert!(!later.expires_within(7));
        let gone = SubscriptionStatus::evaluate(false, Some(now - Duration::days(1)), now);
        assert!(!gone.expires_within(7));
    }
}
