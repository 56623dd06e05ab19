//! Account provisioning
//!
//! Identity lives with the token issuer; the first authenticated request
//! from a principal creates its account as a free user.

use std::sync::Arc;

use tracing::{info, instrument};

use passvault_db::{AccountRepository, CreateAccount, Repositories};
use passvault_types::{Account, AccountId, Role, Tier};

use crate::CoreError;

/// Account provisioning service
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
}

impl AccountService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            accounts: Arc::clone(&repos.accounts),
        }
    }

    /// The principal's account, created as a free user if it has none
    ///
    /// Idempotent: concurrent first requests end up with one account, and an
    /// existing account is returned untouched.
    #[instrument(skip(self, email), fields(account_id = %principal))]
    pub async fn provision(&self, principal: &AccountId, email: Option<&str>) -> Result<Account, CoreError> {
        if let Some(row) = self.accounts.find_by_id(principal.as_str()).await? {
            return Ok(row.into_account());
        }

        let row = self
            .accounts
            .create_if_missing(CreateAccount {
                id: principal.to_string(),
                email: email.map(str::trim).unwrap_or_default().to_string(),
                role: Role::User.as_str().to_string(),
                tier: Tier::Free.as_str().to_string(),
            })
            .await?;

        info!("Account provisioned on free plan");
        Ok(row.into_account())
    }
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService").finish()
    }
}
