//! Repository for the `project_collaborators` table.

use annotator_core::types::DbId;
use sqlx::PgPool;

use crate::models::collaborator::Collaborator;

pub struct CollaboratorRepo;

impl CollaboratorRepo {
    pub async fn list(pool: &PgPool, project_id: DbId) -> Result<Vec<Collaborator>, sqlx::Error> {
        sqlx::query_as::<_, Collaborator>(
            "SELECT c.user_id, u.username, c.added_at
             FROM project_collaborators c
             JOIN users u ON u.id = c.user_id
             WHERE c.project_id = $1
             ORDER BY u.username",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn exists(pool: &PgPool, project_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM project_collaborators
                            WHERE project_id = $1 AND user_id = $2)",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Add a collaborator. Adding an existing one is a no-op; returns
    /// whether a row was inserted.
    pub async fn add(pool: &PgPool, project_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO project_collaborators (project_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT (project_id, user_id) DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove(pool: &PgPool, project_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM project_collaborators WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
