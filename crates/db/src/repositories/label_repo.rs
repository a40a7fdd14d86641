//! Repository for the `labels` table.

use annotator_core::labels::{DEFAULT_LABELS, DEFAULT_LABEL_COLOR};
use annotator_core::types::DbId;
use sqlx::PgPool;

use crate::models::label::{CreateLabel, Label, UpdateLabel};
use crate::repositories::PgTx;

const COLUMNS: &str =
    "id, project_id, name, color, description, is_static, created_by, created_at";

pub struct LabelRepo;

impl LabelRepo {
    /// All labels of a project ordered by name.
    pub async fn list(pool: &PgPool, project_id: DbId) -> Result<Vec<Label>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM labels WHERE project_id = $1 ORDER BY name, id");
        sqlx::query_as::<_, Label>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Find a label only if it belongs to `project_id`.
    pub async fn find_in_project(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Label>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM labels WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Label>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a label. A duplicate name in the project violates
    /// `uq_labels_project_name`.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        created_by: DbId,
        input: &CreateLabel,
    ) -> Result<Label, sqlx::Error> {
        let query = format!(
            "INSERT INTO labels (project_id, name, color, description, created_by)
             VALUES ($1, $2, COALESCE($3, '{DEFAULT_LABEL_COLOR}'), $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Label>(&query)
            .bind(project_id)
            .bind(&input.name)
            .bind(&input.color)
            .bind(&input.description)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLabel,
    ) -> Result<Option<Label>, sqlx::Error> {
        let query = format!(
            "UPDATE labels SET
                name = COALESCE($2, name),
                color = COALESCE($3, color),
                description = COALESCE($4, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Label>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.color)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a label and, by cascade, every annotation using it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Seed the default static labels of a new project.
    pub async fn create_defaults(
        tx: &mut PgTx<'_>,
        project_id: DbId,
        created_by: DbId,
    ) -> Result<(), sqlx::Error> {
        for label in DEFAULT_LABELS {
            sqlx::query(
                "INSERT INTO labels (project_id, name, color, is_static, created_by)
                 VALUES ($1, $2, $3, TRUE, $4)",
            )
            .bind(project_id)
            .bind(label.name)
            .bind(label.color)
            .bind(created_by)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Id of the label named `name` in the project, creating it with `color`
    /// if absent. A concurrent insert of the same name is treated as found.
    pub async fn get_or_create(
        tx: &mut PgTx<'_>,
        project_id: DbId,
        name: &str,
        color: &str,
        created_by: DbId,
    ) -> Result<DbId, sqlx::Error> {
        let inserted: Option<DbId> = sqlx::query_scalar(
            "INSERT INTO labels (project_id, name, color, created_by)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (project_id, name) DO NOTHING
             RETURNING id",
        )
        .bind(project_id)
        .bind(name)
        .bind(color)
        .bind(created_by)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(id) = inserted {
            tracing::debug!(project_id, label = name, "Label created during import");
            return Ok(id);
        }

        sqlx::query_scalar("SELECT id FROM labels WHERE project_id = $1 AND name = $2")
            .bind(project_id)
            .bind(name)
            .fetch_one(&mut **tx)
            .await
    }
}
