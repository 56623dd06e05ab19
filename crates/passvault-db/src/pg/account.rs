//! PostgreSQL account repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::{DbError, DbResult};
use crate::models::AccountRow;
use crate::repo::{AccountRepository, CreateAccount};

/// PostgreSQL account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    /// Create a new account repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<AccountRow>> {
        let account = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, role, subscription_tier, subscription_expires_at,
                   subscription_updated_at, is_suspended, suspended_at, suspended_by,
                   last_payment, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn list(&self) -> DbResult<Vec<AccountRow>> {
        let accounts = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, role, subscription_tier, subscription_expires_at,
                   subscription_updated_at, is_suspended, suspended_at, suspended_by,
                   last_payment, created_at, updated_at
            FROM accounts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<AccountRow>> {
        let account = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, role, subscription_tier, subscription_expires_at,
                   subscription_updated_at, is_suspended, suspended_at, suspended_by,
                   last_payment, created_at, updated_at
            FROM accounts
            WHERE email = $1
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn create(&self, account: CreateAccount) -> DbResult<AccountRow> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, email, role, subscription_tier)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, role, subscription_tier, subscription_expires_at,
                      subscription_updated_at, is_suspended, suspended_at, suspended_by,
                      last_payment, created_at, updated_at
            "#,
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.role)
        .bind(&account.tier)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create_if_missing(&self, account: CreateAccount) -> DbResult<AccountRow> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, email, role, subscription_tier)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.role)
        .bind(&account.tier)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&account.id)
            .await?
            .ok_or_else(|| DbError::Sqlx(sqlx::Error::RowNotFound))
    }

    async fn update_subscription(
        &self,
        id: &str,
        tier: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET subscription_tier = $1, subscription_expires_at = $2,
                subscription_updated_at = NOW(), updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(tier)
        .bind(expires_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_role(&self, id: &str, role: &str) -> DbResult<bool> {
        let result = sqlx::query("UPDATE accounts SET role = $1, updated_at = NOW() WHERE id = $2")
            .bind(role)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_suspended(&self, id: &str, suspended: bool, by: Option<&str>) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET is_suspended = $1,
                suspended_at = CASE WHEN $1 THEN NOW() ELSE NULL END,
                suspended_by = CASE WHEN $1 THEN $2 ELSE NULL END,
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(suspended)
        .bind(by)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn any_admin(&self) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM accounts WHERE role IN ('admin', 'super_admin'))",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn promote_first_admin(&self, account: CreateAccount) -> DbResult<Option<AccountRow>> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent first-admin claims
        sqlx::query("LOCK TABLE accounts IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM accounts WHERE role IN ('admin', 'super_admin'))",
        )
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, email, role, subscription_tier, subscription_updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (id) DO UPDATE
            SET role = EXCLUDED.role,
                subscription_tier = EXCLUDED.subscription_tier,
                subscription_updated_at = NOW(),
                updated_at = NOW()
            RETURNING id, email, role, subscription_tier, subscription_expires_at,
                      subscription_updated_at, is_suspended, suspended_at, suspended_by,
                      last_payment, created_at, updated_at
            "#,
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.role)
        .bind(&account.tier)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(row))
    }

    async fn delete_cascade(&self, id: &str) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        for table in ["passwords", "personal_info", "payments"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE user_id = $1"))
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
