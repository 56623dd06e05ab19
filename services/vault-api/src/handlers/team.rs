//! Team handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use passvault_types::{AccountId, Team, TeamRole};

use crate::auth::Principal;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub email: String,
    /// `admin` or `member`; defaults to `member`
    #[serde(default)]
    pub role: Option<String>,
}

/// GET /api/v1/teams
pub async fn list_teams(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<Vec<Team>>> {
    let teams = state.teams.list(&principal.account_id).await?;
    Ok(Json(teams))
}

/// POST /api/v1/teams
///
/// Business plan only.
pub async fn create_team(
    State(state): State<AppState>,
    principal: Principal,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<Team>)> {
    let team = state.teams.create(&principal.account_id, &req.name).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// GET /api/v1/teams/{team_id}
pub async fn get_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    principal: Principal,
) -> ApiResult<Json<Team>> {
    let team = state.teams.get(&principal.account_id, &team_id).await?;
    Ok(Json(team))
}

/// DELETE /api/v1/teams/{team_id}
pub async fn delete_team(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    principal: Principal,
) -> ApiResult<StatusCode> {
    state.teams.delete(&principal.account_id, &team_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/teams/{team_id}/members
pub async fn add_team_member(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    principal: Principal,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<Team>> {
    let role = match req.role.as_deref() {
        Some(role) => role.parse::<TeamRole>().map_err(ApiError::BadRequest)?,
        None => TeamRole::Member,
    };
    let team = state
        .teams
        .add_member(&principal.account_id, &team_id, &req.email, role)
        .await?;
    Ok(Json(team))
}

/// DELETE /api/v1/teams/{team_id}/members/{member_id}
pub async fn remove_team_member(
    State(state): State<AppState>,
    Path((team_id, member_id)): Path<(String, String)>,
    principal: Principal,
) -> ApiResult<Json<Team>> {
    let team = state
        .teams
        .remove_member(&principal.account_id, &team_id, &AccountId::new(member_id))
        .await?;
    Ok(Json(team))
}
