//! Password sharing
//!
//! Sharing with another account needs `canSharePasswords`; sharing with a
//! whole team needs `hasTeamFeatures` and a managing role in that team.
//! Only the owner of a password may share it, and only the sharer may
//! revoke a share.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use passvault_db::{
    AccountRepository, CreateShare, Repositories, ShareRepository, TeamRepository,
    VaultItemRepository,
};
use passvault_types::{
    AccountId, Capability, LogAction, PasswordShare, SharePermission, VaultItem, VaultKind,
};

use crate::{require_membership, ActivityService, CoreError, EntitlementGate};

/// New share input; exactly one of `recipient_email` and `team_id`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShare {
    pub password_id: Uuid,
    #[serde(default)]
    pub recipient_email: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub permission: SharePermission,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A share addressed to the caller, with the password it grants
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedItem {
    pub share: PasswordShare,
    pub item: VaultItem,
}

/// Password sharing service
#[derive(Clone)]
pub struct ShareService {
    shares: Arc<dyn ShareRepository>,
    teams: Arc<dyn TeamRepository>,
    accounts: Arc<dyn AccountRepository>,
    vault: Arc<dyn VaultItemRepository>,
    gate: EntitlementGate,
    activity: ActivityService,
}

impl ShareService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            shares: Arc::clone(&repos.shares),
            teams: Arc::clone(&repos.teams),
            accounts: Arc::clone(&repos.accounts),
            vault: Arc::clone(&repos.vault),
            gate: EntitlementGate::from_repositories(repos),
            activity: ActivityService::new(repos),
        }
    }

    /// Share one of the caller's passwords
    #[instrument(skip(self, share), fields(account_id = %principal, password_id = %share.password_id))]
    pub async fn share(&self, principal: &AccountId, share: NewShare) -> Result<PasswordShare, CoreError> {
        let recipient_email = share
            .recipient_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());
        let team_id = share.team_id.as_deref().map(str::trim).filter(|t| !t.is_empty());

        let capability = match (recipient_email, team_id) {
            (Some(_), None) => Capability::CanSharePasswords,
            (None, Some(_)) => Capability::HasTeamFeatures,
            _ => {
                return Err(CoreError::InvalidInput(
                    "share with exactly one of recipientEmail or teamId".to_string(),
                ))
            }
        };
        if share.expires_at.is_some_and(|at| at <= Utc::now()) {
            return Err(CoreError::InvalidInput("expiresAt must be in the future".to_string()));
        }

        self.gate.require(principal, capability).await?;

        let item = self
            .vault
            .find_by_id(VaultKind::Password, share.password_id)
            .await?
            .ok_or(CoreError::ItemNotFound)?;
        if item.user_id != principal.as_str() {
            return Err(CoreError::AccessDenied(
                "Not authorized to share this password".to_string(),
            ));
        }

        let shared_with = match (recipient_email, team_id) {
            (Some(email), _) => {
                let recipient = self
                    .accounts
                    .find_by_email(email)
                    .await?
                    .ok_or_else(|| CoreError::AccountNotFound(email.to_string()))?;
                if recipient.id == principal.as_str() {
                    return Err(CoreError::InvalidInput(
                        "cannot share a password with yourself".to_string(),
                    ));
                }
                Some(recipient.id)
            }
            (None, Some(team_id)) => {
                let membership = require_membership(self.teams.as_ref(), team_id, principal).await?;
                if !membership.role.can_manage() {
                    return Err(CoreError::AccessDenied(
                        "Only team admins can share with the team".to_string(),
                    ));
                }
                None
            }
            (None, None) => None,
        };

        let row = self
            .shares
            .create(CreateShare {
                id: Uuid::new_v4(),
                password_id: share.password_id,
                shared_by: principal.to_string(),
                shared_with,
                team_id: team_id.map(str::to_string),
                permission: share.permission.as_str().to_string(),
                expires_at: share.expires_at,
            })
            .await?;
        let created = row.into_share();

        info!(share_id = %created.id, "Password shared");
        if let Err(e) = self
            .activity
            .record(
                principal,
                LogAction::PasswordShare,
                json!({
                    "passwordId": created.password_id,
                    "recipientId": created.shared_with,
                    "permission": created.permission,
                    "teamId": created.team_id,
                }),
                created.team_id.clone(),
            )
            .await
        {
            warn!(error = %e, "Failed to record share activity");
        }

        Ok(created)
    }

    /// Unexpired shares addressed to the caller or to a team the caller is in
    pub async fn received(&self, principal: &AccountId) -> Result<Vec<SharedItem>, CoreError> {
        let mut rows = self.shares.list_shared_with(principal.as_str()).await?;
        for team in self.teams.list_for_member(principal.as_str()).await? {
            rows.extend(self.shares.list_by_team(&team.id).await?);
        }

        let now = Utc::now();
        let mut seen = HashSet::new();
        let mut received = Vec::new();
        for share in rows.into_iter().map(|r| r.into_share()) {
            if !share.is_active_at(now) || &share.shared_by == principal || !seen.insert(share.id) {
                continue;
            }
            if let Some(item) = self.vault.find_by_id(VaultKind::Password, share.password_id).await? {
                received.push(SharedItem {
                    share,
                    item: item.into_item(VaultKind::Password),
                });
            }
        }
        received.sort_by_key(|s| std::cmp::Reverse(s.share.created_at));
        Ok(received)
    }

    /// Shares the caller created, expired ones included
    pub async fn sent(&self, principal: &AccountId) -> Result<Vec<PasswordShare>, CoreError> {
        let rows = self.shares.list_by_owner(principal.as_str()).await?;
        Ok(rows.into_iter().map(|r| r.into_share()).collect())
    }

    /// Revoke a share the caller created
    #[instrument(skip(self), fields(account_id = %principal))]
    pub async fn revoke(&self, principal: &AccountId, share_id: Uuid) -> Result<(), CoreError> {
        let share = self
            .shares
            .find_by_id(share_id)
            .await?
            .ok_or(CoreError::ShareNotFound)?
            .into_share();
        if &share.shared_by != principal {
            return Err(CoreError::AccessDenied(
                "Not authorized to revoke this share".to_string(),
            ));
        }

        if !self.shares.delete(share_id).await? {
            return Err(CoreError::ShareNotFound);
        }

        info!("Password share revoked");
        if let Err(e) = self
            .activity
            .record(
                principal,
                LogAction::PasswordShare,
                json!({
                    "action": "revoke",
                    "passwordId": share.password_id,
                    "recipientId": share.shared_with,
                    "teamId": share.team_id,
                }),
                share.team_id.clone(),
            )
            .await
        {
            warn!(error = %e, "Failed to record share activity");
        }

        Ok(())
    }
}

impl std::fmt::Debug for ShareService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareService").finish()
    }
}
