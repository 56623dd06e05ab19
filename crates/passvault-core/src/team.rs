//! Team service
//!
//! Creating teams and changing membership need `hasTeamFeatures`. Reading a
//! team, its logs or its shares needs membership and nothing else.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use passvault_db::{AccountRepository, CreateTeam, CreateTeamMember, Repositories, TeamRepository};
use passvault_types::{AccountId, Capability, LogAction, Team, TeamMember, TeamRole};

use crate::{ActivityService, CoreError, EntitlementGate};

/// Longest accepted team name, in characters
pub const MAX_TEAM_NAME_LEN: usize = 100;

/// The caller's membership of a team
///
/// Unknown teams are [`CoreError::TeamNotFound`]; non-members get
/// [`CoreError::AccessDenied`].
pub async fn require_membership(
    teams: &dyn TeamRepository,
    team_id: &str,
    principal: &AccountId,
) -> Result<TeamMember, CoreError> {
    if teams.find_by_id(team_id).await?.is_none() {
        return Err(CoreError::TeamNotFound(team_id.to_string()));
    }
    match teams.find_member(team_id, principal.as_str()).await? {
        Some(row) => Ok(row.into_member()),
        None => {
            warn!(account_id = %principal, team_id, "Team access by non-member refused");
            Err(CoreError::AccessDenied("Not a member of this team".to_string()))
        }
    }
}

/// Team service
#[derive(Clone)]
pub struct TeamService {
    teams: Arc<dyn TeamRepository>,
    accounts: Arc<dyn AccountRepository>,
    gate: EntitlementGate,
    activity: ActivityService,
}

impl TeamService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            teams: Arc::clone(&repos.teams),
            accounts: Arc::clone(&repos.accounts),
            gate: EntitlementGate::from_repositories(repos),
            activity: ActivityService::new(repos),
        }
    }

    async fn load(&self, team_id: &str) -> Result<Team, CoreError> {
        let row = self
            .teams
            .find_by_id(team_id)
            .await?
            .ok_or_else(|| CoreError::TeamNotFound(team_id.to_string()))?;
        let members = self.teams.members(team_id).await?;
        Ok(row.into_team(members))
    }

    async fn log(&self, principal: &AccountId, action: LogAction, details: serde_json::Value, team_id: &str) {
        if let Err(e) = self
            .activity
            .record(principal, action, details, Some(team_id.to_string()))
            .await
        {
            warn!(error = %e, action = %action, "Failed to record team activity");
        }
    }

    /// Create a team owned by the caller
    #[instrument(skip(self), fields(account_id = %principal))]
    pub async fn create(&self, principal: &AccountId, name: &str) -> Result<Team, CoreError> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_TEAM_NAME_LEN {
            return Err(CoreError::InvalidInput(format!(
                "team name must be 1 to {MAX_TEAM_NAME_LEN} characters"
            )));
        }

        self.gate.require(principal, Capability::HasTeamFeatures).await?;
        let owner = self.gate.account(principal).await?;

        let id = format!("team_{}", Uuid::new_v4().simple());
        self.teams
            .create(CreateTeam {
                id: id.clone(),
                name: name.to_string(),
                owner_id: principal.to_string(),
                owner_email: owner.email,
            })
            .await?;

        info!(team_id = %id, "Team created");
        self.log(principal, LogAction::TeamCreate, json!({ "teamId": id, "teamName": name }), &id)
            .await;
        self.load(&id).await
    }

    /// Teams the caller belongs to
    pub async fn list(&self, principal: &AccountId) -> Result<Vec<Team>, CoreError> {
        let rows = self.teams.list_for_member(principal.as_str()).await?;
        let mut teams = Vec::with_capacity(rows.len());
        for row in rows {
            let members = self.teams.members(&row.id).await?;
            teams.push(row.into_team(members));
        }
        Ok(teams)
    }

    /// A team the caller belongs to
    pub async fn get(&self, principal: &AccountId, team_id: &str) -> Result<Team, CoreError> {
        require_membership(self.teams.as_ref(), team_id, principal).await?;
        self.load(team_id).await
    }

    /// Add an existing account, found by email, to a team
    #[instrument(skip(self, email), fields(account_id = %principal))]
    pub async fn add_member(
        &self,
        principal: &AccountId,
        team_id: &str,
        email: &str,
        role: TeamRole,
    ) -> Result<Team, CoreError> {
        if role == TeamRole::Owner {
            return Err(CoreError::InvalidInput("a team has exactly one owner".to_string()));
        }

        self.gate.require(principal, Capability::HasTeamFeatures).await?;
        let team = self.load(team_id).await?;
        if !team.can_manage(principal) {
            return Err(CoreError::AccessDenied(
                "Only team admins can add members".to_string(),
            ));
        }

        let email = email.trim();
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound(email.to_string()))?;

        let added = self
            .teams
            .add_member(CreateTeamMember {
                team_id: team_id.to_string(),
                account_id: account.id.clone(),
                email: email.to_string(),
                role: role.as_str().to_string(),
                added_by: principal.to_string(),
            })
            .await?;
        if !added {
            return Err(CoreError::Conflict("User is already a team member".to_string()));
        }

        info!(member_id = %account.id, role = %role, "Team member added");
        self.log(
            principal,
            LogAction::MemberAdd,
            json!({
                "teamId": team_id,
                "teamName": team.name,
                "addedMemberId": account.id,
                "addedMemberEmail": email,
                "role": role,
            }),
            team_id,
        )
        .await;
        self.load(team_id).await
    }

    /// Remove a member; admins remove anyone but the owner, members may leave
    #[instrument(skip(self), fields(account_id = %principal))]
    pub async fn remove_member(
        &self,
        principal: &AccountId,
        team_id: &str,
        member_id: &AccountId,
    ) -> Result<Team, CoreError> {
        let team = self.load(team_id).await?;
        if &team.owner_id == member_id {
            return Err(CoreError::InvalidInput("Cannot remove team owner".to_string()));
        }
        if principal != member_id && !team.can_manage(principal) {
            return Err(CoreError::AccessDenied(
                "Only team admins can remove members".to_string(),
            ));
        }

        if !self.teams.remove_member(team_id, member_id.as_str()).await? {
            return Err(CoreError::AccountNotFound(member_id.to_string()));
        }

        info!(member_id = %member_id, "Team member removed");
        self.log(
            principal,
            LogAction::MemberRemove,
            json!({ "teamId": team_id, "removedMemberId": member_id }),
            team_id,
        )
        .await;
        self.load(team_id).await
    }

    /// Delete a team; owner only
    #[instrument(skip(self), fields(account_id = %principal))]
    pub async fn delete(&self, principal: &AccountId, team_id: &str) -> Result<(), CoreError> {
        let team = self.load(team_id).await?;
        if &team.owner_id != principal {
            return Err(CoreError::AccessDenied(
                "Only team owner can delete team".to_string(),
            ));
        }

        self.teams.delete(team_id).await?;

        info!("Team deleted");
        self.log(
            principal,
            LogAction::TeamDelete,
            json!({ "teamId": team_id, "teamName": team.name }),
            team_id,
        )
        .await;
        Ok(())
    }
}

impl std::fmt::Debug for TeamService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamService").finish()
    }
}
