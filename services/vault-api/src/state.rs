//! Application state for the Vault API service.

use std::sync::Arc;

use jsonwebtoken::DecodingKey;

use passvault_billing_core::BillingService;
use passvault_core::{
    AccountService, ActivityService, AdminService, EntitlementGate, ShareService, TeamService,
    VaultService,
};
use passvault_db::Repositories;

use crate::config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Entitlement gate (features, quotas, subscription status)
    pub gate: EntitlementGate,
    /// First-request account provisioning
    pub accounts: AccountService,
    /// Admin operations and dashboard
    pub admin: AdminService,
    /// Passwords and personal info
    pub vault: VaultService,
    /// Activity logs
    pub activity: ActivityService,
    /// Teams and membership
    pub teams: TeamService,
    /// Password sharing
    pub shares: ShareService,
    /// Checkout, webhooks and payment history
    pub billing: BillingService,
    /// Bearer token key
    pub jwt_key: Arc<DecodingKey>,
    /// Record store, for readiness checks
    pub repos: Repositories,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(repos: Repositories, config: Config) -> Self {
        Self {
            gate: EntitlementGate::from_repositories(&repos),
            accounts: AccountService::new(&repos),
            vault: VaultService::new(&repos),
            activity: ActivityService::new(&repos),
            teams: TeamService::new(&repos),
            shares: ShareService::new(&repos),
            billing: BillingService::new(&repos, config.payhere.clone()),
            admin: AdminService::new(repos.clone()),
            jwt_key: Arc::new(DecodingKey::from_secret(config.jwt_secret.as_bytes())),
            repos,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
