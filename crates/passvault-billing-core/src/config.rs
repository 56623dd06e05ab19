//! PayHere configuration

use crate::BillingError;

/// Currencies the merchant account accepts
pub const SUPPORTED_CURRENCIES: [&str; 2] = ["LKR", "USD"];

/// Whether a currency code is accepted (exact, upper case)
pub fn is_supported_currency(currency: &str) -> bool {
    SUPPORTED_CURRENCIES.contains(&currency)
}

/// PayHere merchant configuration
///
/// Credentials are optional so the service can start without them; every
/// operation that needs them fails with [`BillingError::Configuration`].
#[derive(Clone)]
pub struct PayHereConfig {
    /// Merchant id
    pub merchant_id: Option<String>,
    /// Merchant secret
    pub merchant_secret: Option<String>,
    /// Currency used when checkout does not name one
    pub default_currency: String,
}

/// Borrowed, present credentials
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub merchant_id: &'a str,
    pub merchant_secret: &'a str,
}

impl PayHereConfig {
    /// Config without credentials
    pub fn new(default_currency: impl Into<String>) -> Self {
        Self {
            merchant_id: None,
            merchant_secret: None,
            default_currency: default_currency.into(),
        }
    }

    /// Set merchant credentials
    pub fn with_credentials(
        mut self,
        merchant_id: impl Into<String>,
        merchant_secret: impl Into<String>,
    ) -> Self {
        self.merchant_id = Some(merchant_id.into());
        self.merchant_secret = Some(merchant_secret.into());
        self
    }

    /// Credentials, or a configuration error when either is missing or blank
    pub fn credentials(&self) -> Result<Credentials<'_>, BillingError> {
        let merchant_id = self.merchant_id.as_deref().filter(|s| !s.trim().is_empty());
        let merchant_secret = self.merchant_secret.as_deref().filter(|s| !s.trim().is_empty());
        match (merchant_id, merchant_secret) {
            (Some(merchant_id), Some(merchant_secret)) => Ok(Credentials {
                merchant_id,
                merchant_secret,
            }),
            _ => Err(BillingError::Configuration(
                "PayHere credentials are not configured".to_string(),
            )),
        }
    }
}

impl Default for PayHereConfig {
    fn default() -> Self {
        Self::new("LKR")
    }
}

impl std::fmt::Debug for PayHereConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayHereConfig")
            .field("merchant_id", &self.merchant_id)
            .field("merchant_secret", &self.merchant_secret.as_ref().map(|_| "[REDACTED]"))
            .field("default_currency", &self.default_currency)
            .finish()
    }
}
