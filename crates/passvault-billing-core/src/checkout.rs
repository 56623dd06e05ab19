//! PayHere checkout form creation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use passvault_types::{format_minor_units, parse_minor_units, AccountId, Tier};

use crate::config::is_supported_currency;
use crate::signature::checkout_hash;
use crate::{BillingError, OrderId, PayHereConfig};

/// PayHere merchant category for digital goods and software
pub const BUSINESS_CATEGORY: &str = "4707";

/// Checkout request from the client
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub plan: String,
    /// Decimal amount, e.g. `"2500"` or `"2500.00"`
    pub amount: String,
    #[serde(default)]
    pub currency: Option<String>,
    /// Site origin the gateway redirects back to, e.g. `https://vault.example.com`
    pub origin: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

/// Fields posted to the PayHere checkout page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutForm {
    pub merchant_id: String,
    pub return_url: String,
    pub cancel_url: String,
    pub notify_url: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub order_id: String,
    pub items: String,
    pub currency: String,
    pub amount: String,
    pub business_category: String,
    pub platform: String,
    pub custom_1: String,
    pub custom_2: String,
    pub hash: String,
}

/// Build a signed checkout form for an account
///
/// `fallback_email` is used when the request does not carry one.
pub fn build_checkout_form(
    config: &PayHereConfig,
    account_id: &AccountId,
    fallback_email: &str,
    request: CheckoutRequest,
    now: DateTime<Utc>,
) -> Result<CheckoutForm, BillingError> {
    let credentials = config.credentials()?;

    let plan = request.plan.trim().to_lowercase();
    let tier = match plan.parse::<Tier>() {
        Ok(tier) if tier.is_paid() => tier,
        _ => return Err(BillingError::UnsupportedPlan(plan)),
    };

    let currency = request
        .currency
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| config.default_currency.clone());
    if !is_supported_currency(&currency) {
        return Err(BillingError::UnsupportedCurrency(currency));
    }

    let amount_minor = parse_minor_units(request.amount.trim())
        .filter(|&minor| minor > 0)
        .ok_or_else(|| BillingError::InvalidAmount(request.amount.clone()))?;
    let amount = format_minor_units(amount_minor);

    let origin = request.origin.trim_end_matches('/');
    let order_id = OrderId::generate(account_id, now).to_string();
    let hash = checkout_hash(credentials, &order_id, &amount, &currency);

    Ok(CheckoutForm {
        merchant_id: credentials.merchant_id.to_string(),
        return_url: format!("{origin}/dashboard/subscription/success"),
        cancel_url: format!("{origin}/dashboard/subscription"),
        notify_url: format!("{origin}/api/payment/webhook"),
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email.unwrap_or_else(|| fallback_email.to_string()),
        phone: request.phone,
        address: request.address,
        city: request.city,
        country: request.country,
        items: format!("{} Plan Subscription", tier.display_name()),
        currency,
        amount,
        business_category: BUSINESS_CATEGORY.to_string(),
        platform: "web".to_string(),
        custom_1: tier.as_str().to_string(),
        custom_2: order_id.clone(),
        order_id,
        hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(plan: &str, amount: &str) -> CheckoutRequest {
        CheckoutRequest {
            plan: plan.to_string(),
            amount: amount.to_string(),
            currency: None,
            origin: "https://vault.example.com/".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: None,
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            country: String::new(),
        }
    }

    fn config() -> PayHereConfig {
        PayHereConfig::new("LKR").with_credentials("1211149", "secret")
    }

    #[test]
    fn test_form_fields() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let form = build_checkout_form(
            &config(),
            &AccountId::new("acct123"),
            "ada@example.com",
            request("Premium", "2500"),
            now,
        )
        .unwrap();

        assert_eq!(form.order_id, "ORDER_acct123_1700000000000");
        assert_eq!(form.custom_2, form.order_id);
        assert_eq!(form.custom_1, "premium");
        assert_eq!(form.items, "Premium Plan Subscription");
        assert_eq!(form.amount, "2500.00");
        assert_eq!(form.currency, "LKR");
        assert_eq!(form.email, "ada@example.com");
        assert_eq!(form.return_url, "https://vault.example.com/dashboard/subscription/success");
        assert_eq!(form.notify_url, "https://vault.example.com/api/payment/webhook");
        assert_eq!(
            form.hash,
            checkout_hash(config().credentials().unwrap(), &form.order_id, "2500.00", "LKR")
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        let now = Utc::now();
        let id = AccountId::new("acct123");
        assert!(matches!(
            build_checkout_form(&config(), &id, "a@b.c", request("free", "10"), now),
            Err(BillingError::UnsupportedPlan(_))
        ));
        assert!(matches!(
            build_checkout_form(&config(), &id, "a@b.c", request("premium", "abc"), now),
            Err(BillingError::InvalidAmount(_))
        ));
        assert!(matches!(
            build_checkout_form(&config(), &id, "a@b.c", request("premium", "0"), now),
            Err(BillingError::InvalidAmount(_))
        ));
        let mut eur = request("premium", "10");
        eur.currency = Some("eur".to_string());
        assert!(matches!(
            build_checkout_form(&config(), &id, "a@b.c", eur, now),
            Err(BillingError::UnsupportedCurrency(_))
        ));
        assert!(matches!(
            build_checkout_form(&PayHereConfig::default(), &id, "a@b.c", request("premium", "10"), now),
            Err(BillingError::Configuration(_))
        ));
    }
}
