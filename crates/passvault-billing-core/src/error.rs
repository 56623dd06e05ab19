//! Billing errors

use thiserror::Error;

/// Billing errors
#[derive(Error, Debug)]
pub enum BillingError {
    /// Merchant credentials missing
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Notification signature does not match
    #[error("invalid signature")]
    InvalidSignature,

    /// Currency not accepted
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// Gateway reported a non-success status
    #[error("payment not successful (status code {status_code})")]
    PaymentNotSuccessful {
        /// Gateway status code
        status_code: String,
    },

    /// Order id is not `PREFIX_accountId_timestamp`
    #[error("invalid order id format: {0}")]
    InvalidOrderFormat(String),

    /// Plan is not a paid tier
    #[error("unsupported plan: {0}")]
    UnsupportedPlan(String),

    /// Amount is not a non-negative decimal with at most two places
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Body could not be read as a notification
    #[error("malformed notification: {0}")]
    MalformedPayload(String),

    /// Account named by the order does not exist
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] passvault_db::DbError),
}

impl BillingError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration(_) | Self::Database(_) => 500,
            Self::AccountNotFound(_) => 404,
            _ => 400,
        }
    }

    /// Get error code for API responses and metric labels
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::UnsupportedCurrency(_) => "UNSUPPORTED_CURRENCY",
            Self::PaymentNotSuccessful { .. } => "PAYMENT_NOT_SUCCESSFUL",
            Self::InvalidOrderFormat(_) => "INVALID_ORDER_FORMAT",
            Self::UnsupportedPlan(_) => "UNSUPPORTED_PLAN",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Short, client-facing summary
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "PayHere credentials are not configured",
            Self::InvalidSignature => "Invalid signature",
            Self::UnsupportedCurrency(_) => "Unsupported currency",
            Self::PaymentNotSuccessful { .. } => "Payment failed",
            Self::InvalidOrderFormat(_) => "Invalid order ID format",
            Self::UnsupportedPlan(_) => "Unsupported plan",
            Self::InvalidAmount(_) => "Invalid amount",
            Self::MalformedPayload(_) => "Malformed notification",
            Self::AccountNotFound(_) => "Account not found",
            Self::Database(_) => "Webhook processing failed",
        }
    }

    /// Only store failures are worth a gateway retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(BillingError::InvalidSignature.status_code(), 400);
        assert_eq!(BillingError::UnsupportedPlan("gold".into()).status_code(), 400);
        assert_eq!(BillingError::AccountNotFound("x".into()).status_code(), 404);
        assert_eq!(BillingError::Configuration("x".into()).status_code(), 500);
    }

    #[test]
    fn test_only_store_failures_retry() {
        assert!(!BillingError::InvalidSignature.is_retryable());
        assert!(!BillingError::Configuration("x".into()).is_retryable());
        assert!(BillingError::Database(passvault_db::DbError::Conflict("x".into())).is_retryable());
    }
}
