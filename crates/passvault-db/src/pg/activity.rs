//! PostgreSQL activity log repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use passvault_types::ActivityQuery;

use crate::error::DbResult;
use crate::models::ActivityLogRow;
use crate::repo::{ActivityLogRepository, CreateActivityLog};

/// PostgreSQL activity log repository
#[derive(Clone)]
pub struct PgActivityLogRepository {
    pool: PgPool,
}

impl PgActivityLogRepository {
    /// Create a new activity log repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn query_scoped(
        &self,
        column: &'static str,
        value: &str,
        query: &ActivityQuery,
    ) -> DbResult<Vec<ActivityLogRow>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, user_id, team_id, action, details, timestamp FROM activity_logs WHERE ",
        );
        qb.push(column).push(" = ").push_bind(value.to_string());

        if let Some(start) = query.start {
            qb.push(" AND timestamp >= ").push_bind(start);
        }
        if let Some(end) = query.end {
            qb.push(" AND timestamp <= ").push_bind(end);
        }
        if !query.actions.is_empty() {
            let actions: Vec<String> = query.actions.iter().map(|a| a.as_str().to_string()).collect();
            qb.push(" AND action = ANY(").push_bind(actions).push(")");
        }
        if let Some(team_id) = &query.team_id {
            qb.push(" AND team_id = ").push_bind(team_id.clone());
        }

        qb.push(" ORDER BY timestamp DESC LIMIT ")
            .push_bind(query.effective_limit());

        let rows = qb
            .build_query_as::<ActivityLogRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

#[async_trait]
impl ActivityLogRepository for PgActivityLogRepository {
    async fn append(&self, entry: CreateActivityLog) -> DbResult<ActivityLogRow> {
        let row = sqlx::query_as::<_, ActivityLogRow>(
            r#"
            INSERT INTO activity_logs (id, user_id, team_id, action, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, team_id, action, details, timestamp
            "#,
        )
        .bind(entry.id)
        .bind(&entry.user_id)
        .bind(&entry.team_id)
        .bind(&entry.action)
        .bind(&entry.details)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn query_by_user(&self, user_id: &str, query: &ActivityQuery) -> DbResult<Vec<ActivityLogRow>> {
        self.query_scoped("user_id", user_id, query).await
    }

    async fn query_by_team(&self, team_id: &str, query: &ActivityQuery) -> DbResult<Vec<ActivityLogRow>> {
        self.query_scoped("team_id", team_id, query).await
    }

    async fn list_since(&self, since: DateTime<Utc>) -> DbResult<Vec<ActivityLogRow>> {
        let rows = sqlx::query_as::<_, ActivityLogRow>(
            r#"
            SELECT id, user_id, team_id, action, details, timestamp
            FROM activity_logs
            WHERE timestamp >= $1
            ORDER BY timestamp DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count_all(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
