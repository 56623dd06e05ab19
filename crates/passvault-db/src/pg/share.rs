//! PostgreSQL password share repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::ShareRow;
use crate::repo::{CreateShare, ShareRepository};

/// PostgreSQL password share repository
#[derive(Clone)]
pub struct PgShareRepository {
    pool: PgPool,
}

impl PgShareRepository {
    /// Create a new share repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_where(&self, column: &str, value: &str) -> DbResult<Vec<ShareRow>> {
        let sql = format!(
            r#"
            SELECT id, password_id, shared_by, shared_with, team_id, permission,
                   expires_at, created_at
            FROM password_shares
            WHERE {column} = $1
            ORDER BY created_at DESC
            "#
        );
        let shares = sqlx::query_as::<_, ShareRow>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;

        Ok(shares)
    }
}

#[async_trait]
impl ShareRepository for PgShareRepository {
    async fn create(&self, share: CreateShare) -> DbResult<ShareRow> {
        let row = sqlx::query_as::<_, ShareRow>(
            r#"
            INSERT INTO password_shares
                (id, password_id, shared_by, shared_with, team_id, permission, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, password_id, shared_by, shared_with, team_id, permission,
                      expires_at, created_at
            "#,
        )
        .bind(share.id)
        .bind(share.password_id)
        .bind(&share.shared_by)
        .bind(&share.shared_with)
        .bind(&share.team_id)
        .bind(&share.permission)
        .bind(share.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ShareRow>> {
        let share = sqlx::query_as::<_, ShareRow>(
            r#"
            SELECT id, password_id, shared_by, shared_with, team_id, permission,
                   expires_at, created_at
            FROM password_shares
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(share)
    }

    async fn list_shared_with(&self, account_id: &str) -> DbResult<Vec<ShareRow>> {
        self.list_where("shared_with", account_id).await
    }

    async fn list_by_team(&self, team_id: &str) -> DbResult<Vec<ShareRow>> {
        self.list_where("team_id", team_id).await
    }

    async fn list_by_owner(&self, account_id: &str) -> DbResult<Vec<ShareRow>> {
        self.list_where("shared_by", account_id).await
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM password_shares WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
