//! PayHere webhook reconciliation
//!
//! A notification moves through these stages:
//!
//! 1. credentials present, else `Configuration`
//! 2. signature verified against the merchant secret
//! 3. currency, status, order id, plan, amount and account validated
//! 4. payment record and account transition applied in one transaction,
//!    keyed by order id so redeliveries are harmless
//!
//! Nothing is written unless every earlier stage passed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use passvault_db::{AccountRepository, ApplyOutcome, CreatePayment, PaymentRepository};
use passvault_types::{parse_minor_units, period_end_from, AccountId, PaymentStatus, Tier};

use crate::config::is_supported_currency;
use crate::signature::{notification_signature, signatures_match};
use crate::{BillingError, OrderId, PayHereConfig, PayHereNotification};

/// Counter of processed webhooks, labelled by outcome
pub const WEBHOOKS_PROCESSED_TOTAL: &str = "vault_webhooks_processed_total";

/// PayHere status code for a successful payment
pub const STATUS_SUCCESS: &str = "2";

/// Result of a processed notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookOutcome {
    pub order_id: String,
    pub plan: Tier,
    pub account_id: AccountId,
    /// Expiration after the notification; unchanged on a duplicate
    pub expires_at: Option<DateTime<Utc>>,
    /// The order had already been applied; nothing was written
    pub duplicate: bool,
}

/// A notification that passed validation
#[derive(Debug)]
struct Validated {
    order_id: String,
    account_id: AccountId,
    plan: Tier,
    amount_minor: i64,
}

/// Plan from `custom_1`; blank means premium
fn parse_plan(custom_1: Option<&str>, order_id: &str) -> Result<Tier, BillingError> {
    let plan = custom_1.map(str::trim).unwrap_or_default().to_lowercase();
    if plan.is_empty() {
        warn!(order_id, "Notification carries no plan, defaulting to premium");
        return Ok(Tier::Premium);
    }
    match plan.parse::<Tier>() {
        Ok(tier) if tier.is_paid() => Ok(tier),
        _ => Err(BillingError::UnsupportedPlan(plan)),
    }
}

/// Webhook reconciler
#[derive(Clone)]
pub struct WebhookReconciler {
    config: PayHereConfig,
    accounts: Arc<dyn AccountRepository>,
    payments: Arc<dyn PaymentRepository>,
}

impl WebhookReconciler {
    /// Create a new reconciler
    pub fn new(
        config: PayHereConfig,
        accounts: Arc<dyn AccountRepository>,
        payments: Arc<dyn PaymentRepository>,
    ) -> Self {
        Self {
            config,
            accounts,
            payments,
        }
    }

    /// Process a notification, recording the outcome metric
    pub async fn process(&self, notification: PayHereNotification) -> Result<WebhookOutcome, BillingError> {
        self.process_at(notification, Utc::now()).await
    }

    /// Process a notification as of `now`
    #[instrument(skip(self, notification, now), fields(order_id = %notification.order_id))]
    pub async fn process_at(
        &self,
        notification: PayHereNotification,
        now: DateTime<Utc>,
    ) -> Result<WebhookOutcome, BillingError> {
        let result = self.reconcile(notification, now).await;

        let status = match &result {
            Ok(outcome) if outcome.duplicate => "duplicate",
            Ok(_) => "applied",
            Err(e) => e.error_code(),
        };
        metrics::counter!(WEBHOOKS_PROCESSED_TOTAL, "status" => status).increment(1);

        result
    }

    async fn reconcile(
        &self,
        notification: PayHereNotification,
        now: DateTime<Utc>,
    ) -> Result<WebhookOutcome, BillingError> {
        self.verify(&notification)?;
        let validated = self.validate(&notification).await?;
        self.apply(notification, validated, now).await
    }

    /// Check the notification signature
    pub fn verify(&self, notification: &PayHereNotification) -> Result<(), BillingError> {
        let credentials = self.config.credentials().map_err(|e| {
            error!("PayHere credentials are not configured");
            e
        })?;

        let expected = notification_signature(
            credentials,
            &notification.order_id,
            &notification.payhere_amount,
            &notification.payhere_currency,
            &notification.status_code,
        );

        if !signatures_match(&expected, &notification.md5sig) {
            warn!("Webhook signature verification failed");
            return Err(BillingError::InvalidSignature);
        }

        Ok(())
    }

    async fn validate(&self, notification: &PayHereNotification) -> Result<Validated, BillingError> {
        if !is_supported_currency(&notification.payhere_currency) {
            warn!(currency = %notification.payhere_currency, "Unsupported currency");
            return Err(BillingError::UnsupportedCurrency(
                notification.payhere_currency.clone(),
            ));
        }

        if notification.status_code != STATUS_SUCCESS {
            warn!(
                status_code = %notification.status_code,
                status_message = ?notification.status_message,
                "Payment not successful"
            );
            return Err(BillingError::PaymentNotSuccessful {
                status_code: notification.status_code.clone(),
            });
        }

        let order: OrderId = notification.order_id.parse()?;
        let plan = parse_plan(notification.custom_1.as_deref(), &notification.order_id)?;

        let amount_minor = parse_minor_units(&notification.payhere_amount)
            .ok_or_else(|| BillingError::InvalidAmount(notification.payhere_amount.clone()))?;

        if self
            .accounts
            .find_by_id(order.account_id.as_str())
            .await?
            .is_none()
        {
            warn!(account_id = %order.account_id, "Notification for unknown account");
            return Err(BillingError::AccountNotFound(order.account_id.to_string()));
        }

        Ok(Validated {
            order_id: notification.order_id.clone(),
            account_id: order.account_id,
            plan,
            amount_minor,
        })
    }

    async fn apply(
        &self,
        notification: PayHereNotification,
        validated: Validated,
        now: DateTime<Utc>,
    ) -> Result<WebhookOutcome, BillingError> {
        let expires_at = period_end_from(now);

        let payment = CreatePayment {
            id: Uuid::new_v4(),
            user_id: validated.account_id.to_string(),
            plan: validated.plan.as_str().to_string(),
            amount_minor: validated.amount_minor,
            currency: notification.payhere_currency,
            status: PaymentStatus::Succeeded.as_str().to_string(),
            order_id: validated.order_id.clone(),
            payment_reference: notification.payment_id,
            metadata: serde_json::Value::Object(notification.raw),
            created_at: now,
        };

        match self.payments.apply_payment(payment, expires_at).await? {
            ApplyOutcome::Applied(row) => {
                info!(
                    account_id = %validated.account_id,
                    plan = %validated.plan,
                    payment_id = %row.id,
                    expires_at = %expires_at,
                    "Subscription activated from payment"
                );
                Ok(WebhookOutcome {
                    order_id: validated.order_id,
                    plan: validated.plan,
                    account_id: validated.account_id,
                    expires_at: Some(expires_at),
                    duplicate: false,
                })
            }
            ApplyOutcome::Duplicate => {
                debug!(account_id = %validated.account_id, "Order already applied, ignoring redelivery");
                // custom_1 is outside the signature; report what was recorded
                let plan = match self.payments.find_by_order_id(&validated.order_id).await? {
                    Some(row) => row.into_record().plan,
                    None => {
                        warn!(order_id = %validated.order_id, "Recorded payment vanished, reporting notified plan");
                        validated.plan
                    }
                };
                let current = self
                    .accounts
                    .find_by_id(validated.account_id.as_str())
                    .await?
                    .and_then(|row| row.subscription_expires_at);
                Ok(WebhookOutcome {
                    order_id: validated.order_id,
                    plan,
                    account_id: validated.account_id,
                    expires_at: current,
                    duplicate: true,
                })
            }
            ApplyOutcome::AccountMissing => {
                warn!(account_id = %validated.account_id, "Account removed before payment could be applied");
                Err(BillingError::AccountNotFound(validated.account_id.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for WebhookReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookReconciler")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan() {
        assert_eq!(parse_plan(Some("Premium"), "o").unwrap(), Tier::Premium);
        assert_eq!(parse_plan(Some(" BUSINESS "), "o").unwrap(), Tier::Business);
        assert_eq!(parse_plan(None, "o").unwrap(), Tier::Premium);
        assert_eq!(parse_plan(Some("  "), "o").unwrap(), Tier::Premium);
        assert!(matches!(parse_plan(Some("free"), "o"), Err(BillingError::UnsupportedPlan(_))));
        assert!(matches!(parse_plan(Some("gold"), "o"), Err(BillingError::UnsupportedPlan(_))));
    }
}
