//! PostgreSQL payment repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::PaymentRow;
use crate::repo::{ApplyOutcome, CreatePayment, PaymentRepository};

/// PostgreSQL payment repository
#[derive(Clone)]
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    /// Create a new payment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn find_by_order_id(&self, order_id: &str) -> DbResult<Option<PaymentRow>> {
        let payment = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, user_id, plan, amount_minor, currency, status, order_id,
                   payment_reference, metadata, created_at
            FROM payments
            WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    async fn list_by_user(&self, user_id: &str, limit: i64) -> DbResult<Vec<PaymentRow>> {
        let payments = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, user_id, plan, amount_minor, currency, status, order_id,
                   payment_reference, metadata, created_at
            FROM payments
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    async fn apply_payment(
        &self,
        payment: CreatePayment,
        expires_at: DateTime<Utc>,
    ) -> DbResult<ApplyOutcome> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<String> =
            sqlx::query_scalar("SELECT id FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(&payment.user_id)
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            tx.rollback().await?;
            return Ok(ApplyOutcome::AccountMissing);
        }

        let inserted = sqlx::query_as::<_, PaymentRow>(
            r#"
            INSERT INTO payments (id, user_id, plan, amount_minor, currency, status,
                                  order_id, payment_reference, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (order_id) DO NOTHING
            RETURNING id, user_id, plan, amount_minor, currency, status, order_id,
                      payment_reference, metadata, created_at
            "#,
        )
        .bind(payment.id)
        .bind(&payment.user_id)
        .bind(&payment.plan)
        .bind(payment.amount_minor)
        .bind(&payment.currency)
        .bind(&payment.status)
        .bind(&payment.order_id)
        .bind(&payment.payment_reference)
        .bind(&payment.metadata)
        .bind(payment.created_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = inserted else {
            tx.rollback().await?;
            return Ok(ApplyOutcome::Duplicate);
        };

        let snapshot = serde_json::to_value(payment.last_payment())?;

        sqlx::query(
            r#"
            UPDATE accounts
            SET subscription_tier = $1, subscription_expires_at = $2, last_payment = $3,
                subscription_updated_at = NOW(), updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&payment.plan)
        .bind(expires_at)
        .bind(snapshot)
        .bind(&payment.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ApplyOutcome::Applied(row))
    }
}
