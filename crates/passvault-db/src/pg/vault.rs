//! PostgreSQL vault item repository implementation
//!
//! Passwords and personal info share a row shape and live in sibling tables;
//! the table name comes from [`VaultKind::collection`], never from input.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use passvault_types::VaultKind;

use crate::error::DbResult;
use crate::models::VaultItemRow;
use crate::repo::{CreateVaultItem, VaultItemRepository};

/// PostgreSQL vault item repository
#[derive(Clone)]
pub struct PgVaultItemRepository {
    pool: PgPool,
}

impl PgVaultItemRepository {
    /// Create a new vault item repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VaultItemRepository for PgVaultItemRepository {
    async fn count_by_user(&self, kind: VaultKind, user_id: &str) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE user_id = $1", kind.collection());
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn find_by_id(&self, kind: VaultKind, id: Uuid) -> DbResult<Option<VaultItemRow>> {
        let sql = format!(
            "SELECT id, user_id, label, payload, team_id, created_at FROM {} WHERE id = $1",
            kind.collection()
        );
        let item = sqlx::query_as::<_, VaultItemRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    async fn list_by_user(&self, kind: VaultKind, user_id: &str) -> DbResult<Vec<VaultItemRow>> {
        let sql = format!(
            r#"
            SELECT id, user_id, label, payload, team_id, created_at
            FROM {}
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
            kind.collection()
        );
        let items = sqlx::query_as::<_, VaultItemRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    async fn create_within_quota(
        &self,
        kind: VaultKind,
        item: CreateVaultItem,
        limit: Option<i64>,
    ) -> DbResult<Option<VaultItemRow>> {
        let mut tx = self.pool.begin().await?;

        // Per-owner lock, released at commit/rollback
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&item.user_id)
            .execute(&mut *tx)
            .await?;

        if let Some(limit) = limit {
            let sql = format!("SELECT COUNT(*) FROM {} WHERE user_id = $1", kind.collection());
            let current: i64 = sqlx::query_scalar(&sql)
                .bind(&item.user_id)
                .fetch_one(&mut *tx)
                .await?;
            if current >= limit {
                tx.rollback().await?;
                return Ok(None);
            }
        }

        let sql = format!(
            r#"
            INSERT INTO {} (id, user_id, label, payload, team_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, label, payload, team_id, created_at
            "#,
            kind.collection()
        );
        let row = sqlx::query_as::<_, VaultItemRow>(&sql)
            .bind(item.id)
            .bind(&item.user_id)
            .bind(&item.label)
            .bind(&item.payload)
            .bind(&item.team_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(row))
    }

    async fn delete(&self, kind: VaultKind, user_id: &str, id: Uuid) -> DbResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", kind.collection());
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_all(&self, kind: VaultKind) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.collection());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;

        Ok(count)
    }

    async fn count_created_since(&self, kind: VaultKind, since: DateTime<Utc>) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE created_at >= $1", kind.collection());
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(since)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
