//! Core errors

use passvault_types::{Quota, VaultKind};
use thiserror::Error;

/// Errors from the entitlement-gated services
#[derive(Error, Debug)]
pub enum CoreError {
    /// Account not found
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// Vault item not found
    #[error("item not found")]
    ItemNotFound,

    /// Team not found
    #[error("team not found: {0}")]
    TeamNotFound(String),

    /// Password share not found
    #[error("share not found")]
    ShareNotFound,

    /// The record already exists
    #[error("{0}")]
    Conflict(String),

    /// Caller lacks the role or standing for this operation
    #[error("{0}")]
    AccessDenied(String),

    /// Capability not included in the caller's plan
    #[error("{0}")]
    UpgradeRequired(String),

    /// Owned-record quota reached
    #[error("{kind} limit of {limit} reached for the current plan")]
    QuotaExceeded { kind: VaultKind, limit: u32 },

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Database error
    #[error("database error: {0}")]
    Database(String),
}

impl CoreError {
    /// Quota error for a limited quota; unlimited quotas never exceed
    pub fn quota_exceeded(kind: VaultKind, quota: Quota) -> Self {
        Self::QuotaExceeded {
            kind,
            limit: quota.limit().unwrap_or(u32::MAX),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::AccountNotFound(_)
            | Self::ItemNotFound
            | Self::TeamNotFound(_)
            | Self::ShareNotFound => 404,
            Self::Conflict(_) => 409,
            Self::AccessDenied(_) | Self::UpgradeRequired(_) | Self::QuotaExceeded { .. } => 403,
            Self::InvalidInput(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::ItemNotFound => "ITEM_NOT_FOUND",
            Self::TeamNotFound(_) => "TEAM_NOT_FOUND",
            Self::ShareNotFound => "SHARE_NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::AccessDenied(_) => "ACCESS_DENIED",
            Self::UpgradeRequired(_) => "UPGRADE_REQUIRED",
            Self::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<passvault_db::DbError> for CoreError {
    fn from(err: passvault_db::DbError) -> Self {
        tracing::error!("Database error: {}", err);
        Self::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(CoreError::AccountNotFound("x".into()).status_code(), 404);
        assert_eq!(CoreError::UpgradeRequired("x".into()).status_code(), 403);
        assert_eq!(
            CoreError::quota_exceeded(VaultKind::Password, Quota::Limited(3)).status_code(),
            403
        );
        assert_eq!(CoreError::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(CoreError::TeamNotFound("t".into()).status_code(), 404);
        assert_eq!(CoreError::Conflict("x".into()).status_code(), 409);
        assert_eq!(CoreError::Database("x".into()).status_code(), 500);
    }

    #[test]
    fn test_quota_message_names_limit() {
        let err = CoreError::quota_exceeded(VaultKind::Password, Quota::Limited(3));
        assert_eq!(err.to_string(), "passwords limit of 3 reached for the current plan");
    }
}
