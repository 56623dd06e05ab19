//! Merchant order ids: `PREFIX_accountId_timestamp`

use chrono::{DateTime, Utc};

use passvault_types::AccountId;

use crate::BillingError;

/// Prefix used for orders created by checkout
pub const ORDER_PREFIX: &str = "ORDER";

/// A parsed merchant order id
///
/// The account id is everything between the first and the last underscore,
/// so account ids may themselves contain underscores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderId {
    pub prefix: String,
    pub account_id: AccountId,
    pub timestamp: String,
}

impl OrderId {
    /// New checkout order for an account at `now`
    pub fn generate(account_id: &AccountId, now: DateTime<Utc>) -> Self {
        Self {
            prefix: ORDER_PREFIX.to_string(),
            account_id: account_id.clone(),
            timestamp: now.timestamp_millis().to_string(),
        }
    }

    /// Parse an order id, returning `None` when it is not well formed
    pub fn parse(s: &str) -> Option<Self> {
        let (prefix, rest) = s.split_once('_')?;
        let (account_id, timestamp) = rest.rsplit_once('_')?;
        if prefix.is_empty()
            || account_id.is_empty()
            || timestamp.is_empty()
            || !timestamp.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        Some(Self {
            prefix: prefix.to_string(),
            account_id: AccountId::new(account_id),
            timestamp: timestamp.to_string(),
        })
    }
}

impl std::str::FromStr for OrderId {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| BillingError::InvalidOrderFormat(s.to_string()))
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}", self.prefix, self.account_id, self.timestamp)
    }
}
