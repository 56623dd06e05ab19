//! Vault item service (passwords and personal info)
//!
//! Creation is gated on the server-side count of owned items, checked and
//! inserted atomically by the store. Team items need `hasTeamFeatures` and
//! membership of the team.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use passvault_db::{CreateVaultItem, Repositories, TeamRepository, VaultItemRepository};
use passvault_types::{AccountId, Capability, LogAction, VaultItem, VaultKind};

use crate::{require_membership, ActivityService, CoreError, EntitlementGate};

/// New vault item input
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVaultItem {
    pub label: String,
    /// Client-encrypted payload, stored as given
    pub payload: String,
    #[serde(default)]
    pub team_id: Option<String>,
}

const fn created_action(kind: VaultKind) -> LogAction {
    match kind {
        VaultKind::Password => LogAction::PasswordCreate,
        VaultKind::PersonalInfo => LogAction::PersonalInfoCreate,
    }
}

const fn deleted_action(kind: VaultKind) -> LogAction {
    match kind {
        VaultKind::Password => LogAction::PasswordDelete,
        VaultKind::PersonalInfo => LogAction::PersonalInfoDelete,
    }
}

/// Vault item service
#[derive(Clone)]
pub struct VaultService {
    vault: Arc<dyn VaultItemRepository>,
    teams: Arc<dyn TeamRepository>,
    gate: EntitlementGate,
    activity: ActivityService,
}

impl VaultService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            vault: Arc::clone(&repos.vault),
            teams: Arc::clone(&repos.teams),
            gate: EntitlementGate::from_repositories(repos),
            activity: ActivityService::new(repos),
        }
    }

    /// Items the caller owns, newest first
    pub async fn list(&self, principal: &AccountId, kind: VaultKind) -> Result<Vec<VaultItem>, CoreError> {
        let rows = self.vault.list_by_user(kind, principal.as_str()).await?;
        Ok(rows.into_iter().map(|r| r.into_item(kind)).collect())
    }

    /// Store a new item if the caller's plan has room for it
    #[instrument(skip(self, item), fields(account_id = %principal, kind = %kind))]
    pub async fn create(
        &self,
        principal: &AccountId,
        kind: VaultKind,
        item: NewVaultItem,
    ) -> Result<VaultItem, CoreError> {
        if item.label.trim().is_empty() {
            return Err(CoreError::InvalidInput("label must not be empty".to_string()));
        }

        let account = self.gate.account(principal).await?;
        if account.is_suspended && !account.role.is_admin() {
            return Err(CoreError::AccessDenied("Account is suspended".to_string()));
        }
        if let Some(team_id) = item.team_id.as_deref() {
            self.gate.require(principal, Capability::HasTeamFeatures).await?;
            require_membership(self.teams.as_ref(), team_id, principal).await?;
        }

        let quota = account.subscription_tier.features().quota_for(kind);
        let limit = quota.limit().map(i64::from);

        let created = self
            .vault
            .create_within_quota(
                kind,
                CreateVaultItem {
                    id: Uuid::new_v4(),
                    user_id: principal.to_string(),
                    label: item.label,
                    payload: item.payload,
                    team_id: item.team_id,
                },
                limit,
            )
            .await?;

        let Some(row) = created else {
            info!(limit = ?limit, "Vault quota reached");
            return Err(CoreError::quota_exceeded(kind, quota));
        };

        if let Err(e) = self
            .activity
            .record(
                principal,
                created_action(kind),
                json!({ "itemId": row.id, "label": row.label }),
                row.team_id.clone(),
            )
            .await
        {
            warn!(error = %e, "Failed to record vault activity");
        }

        Ok(row.into_item(kind))
    }

    /// Delete an owned item
    #[instrument(skip(self), fields(account_id = %principal, kind = %kind))]
    pub async fn delete(&self, principal: &AccountId, kind: VaultKind, id: Uuid) -> Result<(), CoreError> {
        if !self.vault.delete(kind, principal.as_str(), id).await? {
            return Err(CoreError::ItemNotFound);
        }

        if let Err(e) = self
            .activity
            .record(principal, deleted_action(kind), json!({ "itemId": id }), None)
            .await
        {
            warn!(error = %e, "Failed to record vault activity");
        }

        Ok(())
    }
}

impl std::fmt::Debug for VaultService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultService").finish()
    }
}
