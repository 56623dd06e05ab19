//! Activity log service
//!
//! Reads and writes are gated by `hasActivityLogs`. Administrative actions
//! are recorded regardless of the subject's tier. Team logs are readable by
//! team members only.

use passvault_db::{ActivityLogRepository, CreateActivityLog, Repositories, TeamRepository};
use passvault_types::{AccountId, ActivityLog, ActivityQuery, Capability, LogAction};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::{require_membership, CoreError, EntitlementGate};

/// Activity log service
#[derive(Clone)]
pub struct ActivityService {
    logs: Arc<dyn ActivityLogRepository>,
    teams: Arc<dyn TeamRepository>,
    gate: EntitlementGate,
}

impl ActivityService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            logs: Arc::clone(&repos.activity),
            teams: Arc::clone(&repos.teams),
            gate: EntitlementGate::from_repositories(repos),
        }
    }

    /// Record an action for `user_id`. Returns whether anything was written.
    pub async fn record(
        &self,
        user_id: &AccountId,
        action: LogAction,
        details: serde_json::Value,
        team_id: Option<String>,
    ) -> Result<bool, CoreError> {
        if !action.is_administrative()
            && !self.gate.has_feature(user_id, Capability::HasActivityLogs).await
        {
            debug!(account_id = %user_id, action = %action, "Activity logging not in plan, skipping");
            return Ok(false);
        }

        self.logs
            .append(CreateActivityLog {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                team_id,
                action: action.as_str().to_string(),
                details,
            })
            .await?;

        Ok(true)
    }

    /// The caller's own log entries; empty when the plan has no activity logs
    pub async fn user_logs(
        &self,
        principal: &AccountId,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivityLog>, CoreError> {
        if !self.gate.has_feature(principal, Capability::HasActivityLogs).await {
            return Ok(Vec::new());
        }

        let rows = self.logs.query_by_user(principal.as_str(), query).await?;
        Ok(rows.into_iter().filter_map(|r| r.into_log()).collect())
    }

    /// A team's log entries; empty when the plan has no activity logs
    ///
    /// Non-members are refused before anything is read.
    pub async fn team_logs(
        &self,
        principal: &AccountId,
        team_id: &str,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivityLog>, CoreError> {
        require_membership(self.teams.as_ref(), team_id, principal).await?;

        if !self.gate.has_feature(principal, Capability::HasActivityLogs).await {
            return Ok(Vec::new());
        }

        let rows = self.logs.query_by_team(team_id, query).await?;
        Ok(rows.into_iter().filter_map(|r| r.into_log()).collect())
    }
}

impl std::fmt::Debug for ActivityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityService").finish()
    }
}
