//! Billing service - ties together checkout, webhook reconciliation and history

use std::sync::Arc;

use chrono::Utc;

use passvault_db::{PaymentRepository, Repositories};
use passvault_types::{AccountId, PaymentRecord};

use crate::checkout::{build_checkout_form, CheckoutForm, CheckoutRequest};
use crate::{BillingError, PayHereConfig, PayHereNotification, WebhookOutcome, WebhookReconciler};

/// Default number of payments returned by history queries
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Billing service
#[derive(Clone)]
pub struct BillingService {
    config: PayHereConfig,
    payments: Arc<dyn PaymentRepository>,
    reconciler: WebhookReconciler,
}

impl BillingService {
    /// Create a new billing service
    pub fn new(repos: &Repositories, config: PayHereConfig) -> Self {
        Self {
            reconciler: WebhookReconciler::new(
                config.clone(),
                Arc::clone(&repos.accounts),
                Arc::clone(&repos.payments),
            ),
            payments: Arc::clone(&repos.payments),
            config,
        }
    }

    /// Signed checkout form for the caller
    pub fn create_checkout(
        &self,
        account_id: &AccountId,
        email: &str,
        request: CheckoutRequest,
    ) -> Result<CheckoutForm, BillingError> {
        build_checkout_form(&self.config, account_id, email, request, Utc::now())
    }

    /// Verify, validate and apply a gateway notification
    pub async fn process_notification(
        &self,
        notification: PayHereNotification,
    ) -> Result<WebhookOutcome, BillingError> {
        self.reconciler.process(notification).await
    }

    /// An account's payments, newest first
    pub async fn subscription_history(
        &self,
        account_id: &AccountId,
        limit: Option<i64>,
    ) -> Result<Vec<PaymentRecord>, BillingError> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, 500);
        let rows = self.payments.list_by_user(account_id.as_str(), limit).await?;
        Ok(rows.into_iter().map(|r| r.into_record()).collect())
    }
}

impl std::fmt::Debug for BillingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingService")
            .field("config", &self.config)
            .finish()
    }
}
