//! PostgreSQL team repository implementation

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::{TeamMemberRow, TeamRow};
use crate::repo::{CreateTeam, CreateTeamMember, TeamRepository};

/// PostgreSQL team repository
#[derive(Clone)]
pub struct PgTeamRepository {
    pool: PgPool,
}

impl PgTeamRepository {
    /// Create a new team repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamRepository for PgTeamRepository {
    async fn create(&self, team: CreateTeam) -> DbResult<TeamRow> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, TeamRow>(
            r#"
            INSERT INTO teams (id, name, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, owner_id, created_at, updated_at
            "#,
        )
        .bind(&team.id)
        .bind(&team.name)
        .bind(&team.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO team_members (team_id, account_id, email, role, added_by)
            VALUES ($1, $2, $3, 'owner', $2)
            "#,
        )
        .bind(&team.id)
        .bind(&team.owner_id)
        .bind(&team.owner_email)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<TeamRow>> {
        let team = sqlx::query_as::<_, TeamRow>(
            "SELECT id, name, owner_id, created_at, updated_at FROM teams WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(team)
    }

    async fn members(&self, team_id: &str) -> DbResult<Vec<TeamMemberRow>> {
        let members = sqlx::query_as::<_, TeamMemberRow>(
            r#"
            SELECT team_id, account_id, email, role, added_by, joined_at
            FROM team_members
            WHERE team_id = $1
            ORDER BY joined_at
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    async fn find_member(&self, team_id: &str, account_id: &str) -> DbResult<Option<TeamMemberRow>> {
        let member = sqlx::query_as::<_, TeamMemberRow>(
            r#"
            SELECT team_id, account_id, email, role, added_by, joined_at
            FROM team_members
            WHERE team_id = $1 AND account_id = $2
            "#,
        )
        .bind(team_id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn list_for_member(&self, account_id: &str) -> DbResult<Vec<TeamRow>> {
        let teams = sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT t.id, t.name, t.owner_id, t.created_at, t.updated_at
            FROM teams t
            JOIN team_members m ON m.team_id = t.id
            WHERE m.account_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(teams)
    }

    async fn add_member(&self, member: CreateTeamMember) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO team_members (team_id, account_id, email, role, added_by)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (team_id, account_id) DO NOTHING
            "#,
        )
        .bind(&member.team_id)
        .bind(&member.account_id)
        .bind(&member.email)
        .bind(&member.role)
        .bind(&member.added_by)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            sqlx::query("UPDATE teams SET updated_at = NOW() WHERE id = $1")
                .bind(&member.team_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_member(&self, team_id: &str, account_id: &str) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND account_id = $2")
            .bind(team_id)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() > 0 {
            sqlx::query("UPDATE teams SET updated_at = NOW() WHERE id = $1")
                .bind(team_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        // Memberships and team shares go with the team via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
