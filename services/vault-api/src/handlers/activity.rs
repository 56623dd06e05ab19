//! Activity log handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use passvault_types::{ActivityLog, ActivityQuery, LogAction};

use crate::auth::Principal;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ActivityParams {
    pub limit: Option<i64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Comma separated action names
    pub actions: Option<String>,
}

impl ActivityParams {
    fn into_query(self) -> Result<ActivityQuery, ApiError> {
        let actions = self
            .actions
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(|a| a.parse::<LogAction>().map_err(ApiError::BadRequest))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ActivityQuery {
            limit: self.limit,
            start: self.start,
            end: self.end,
            actions,
            team_id: None,
        })
    }
}

/// GET /api/v1/activity
///
/// Empty when the plan has no activity logs.
pub async fn list_activity(
    State(state): State<AppState>,
    Query(params): Query<ActivityParams>,
    principal: Principal,
) -> ApiResult<Json<Vec<ActivityLog>>> {
    let query = params.into_query()?;
    let logs = state.activity.user_logs(&principal.account_id, &query).await?;
    Ok(Json(logs))
}

/// GET /api/v1/activity/teams/{team_id}
pub async fn list_team_activity(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Query(params): Query<ActivityParams>,
    principal: Principal,
) -> ApiResult<Json<Vec<ActivityLog>>> {
    let query = params.into_query()?;
    let logs = state
        .activity
        .team_logs(&principal.account_id, &team_id, &query)
        .await?;
    Ok(Json(logs))
}
