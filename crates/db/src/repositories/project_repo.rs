//! Repository for the `projects` table.
//!
//! `user_project_id` is a per-owner sequence kept dense at all times: new
//! projects take `max + 1` and every delete is followed by
//! [`ProjectRepo::renumber_projects`] in the same transaction. Both paths
//! take a transaction-scoped advisory lock on the owner id so concurrent
//! creates and deletes for one owner serialize.

use annotator_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project, ProjectListItem, UpdateProject};
use crate::repositories::{LabelRepo, PgTx};

const COLUMNS: &str =
    "id, name, description, owner_id, user_project_id, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a project numbered after the owner's existing ones and seed it
    /// with the default labels.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::lock_owner(&mut tx, owner_id).await?;

        let query = format!(
            "INSERT INTO projects (name, description, owner_id, user_project_id)
             VALUES ($1, $2, $3,
                     COALESCE((SELECT MAX(user_project_id) FROM projects WHERE owner_id = $3), 0) + 1)
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;

        LabelRepo::create_defaults(&mut tx, project.id, owner_id).await?;

        tx.commit().await?;
        Ok(project)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a project by its external address `(owner, user_project_id)`.
    pub async fn find_by_owner_number(
        pool: &PgPool,
        owner_id: DbId,
        user_project_id: i32,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM projects WHERE owner_id = $1 AND user_project_id = $2");
        sqlx::query_as::<_, Project>(&query)
            .bind(owner_id)
            .bind(user_project_id)
            .fetch_optional(pool)
            .await
    }

    /// Projects the user owns or collaborates on, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ProjectListItem>, sqlx::Error> {
        sqlx::query_as::<_, ProjectListItem>(
            "SELECT p.id, p.name, p.description, p.owner_id, u.username AS owner_username,
                    p.user_project_id, (p.owner_id = $1) AS is_owner,
                    (SELECT COUNT(*) FROM texts t WHERE t.project_id = p.id) AS text_count,
                    p.created_at
             FROM projects p
             JOIN users u ON u.id = p.owner_id
             WHERE p.owner_id = $1
                OR EXISTS (SELECT 1 FROM project_collaborators c
                           WHERE c.project_id = p.id AND c.user_id = $1)
             ORDER BY p.created_at DESC, p.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project (cascading to its labels, texts, annotations and
    /// collaborators) and close the gap in the owner's numbering.
    ///
    /// Returns `false` if no such project exists for the owner.
    pub async fn delete(pool: &PgPool, id: DbId, owner_id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::lock_owner(&mut tx, owner_id).await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        let renumbered = Self::renumber_projects(&mut tx, owner_id).await?;
        tx.commit().await?;

        tracing::debug!(project_id = id, owner_id, renumbered, "Project deleted");
        Ok(true)
    }

    /// Reassign the owner's `user_project_id`s to 1..N by creation order.
    /// Returns the number of projects whose number changed.
    pub async fn renumber_projects(tx: &mut PgTx<'_>, owner_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects p SET user_project_id = ranked.n
             FROM (SELECT id, ROW_NUMBER() OVER (ORDER BY created_at, id)::INTEGER AS n
                   FROM projects WHERE owner_id = $1) ranked
             WHERE p.id = ranked.id AND p.user_project_id <> ranked.n",
        )
        .bind(owner_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    async fn lock_owner(tx: &mut PgTx<'_>, owner_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(owner_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
