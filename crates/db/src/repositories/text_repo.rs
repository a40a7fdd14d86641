//! Repository for the `texts` table.

use annotator_core::types::DbId;
use sqlx::PgPool;

use crate::models::text::{CreateText, Text, TextUpsertOutcome, TextWithCount, UpdateText};
use crate::repositories::PgTx;

const COLUMNS: &str = "id, project_id, text_id, text, meta, created_at, updated_at";

pub struct TextRepo;

impl TextRepo {
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateText,
    ) -> Result<Text, sqlx::Error> {
        let query = format!(
            "INSERT INTO texts (project_id, text_id, text, meta)
             VALUES ($1, $2, $3, COALESCE($4, '{{}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Text>(&query)
            .bind(project_id)
            .bind(&input.text_id)
            .bind(&input.text)
            .bind(&input.meta)
            .fetch_one(pool)
            .await
    }

    /// Find a text only if it belongs to `project_id`.
    pub async fn find_in_project(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Text>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM texts WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Text>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a text. Content edits can leave stored spans out of range;
    /// those are cleaned up by the annotation repair pass, not here.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateText,
    ) -> Result<Option<Text>, sqlx::Error> {
        let query = format!(
            "UPDATE texts SET
                text_id = COALESCE($2, text_id),
                text = COALESCE($3, text),
                meta = COALESCE($4, meta),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Text>(&query)
            .bind(id)
            .bind(&input.text_id)
            .bind(&input.text)
            .bind(&input.meta)
            .fetch_optional(pool)
            .await
    }

    pub async fn count(pool: &PgPool, project_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM texts WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await
    }

    /// One page of a project's texts in insertion order, with annotation counts.
    pub async fn list_page(
        pool: &PgPool,
        project_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TextWithCount>, sqlx::Error> {
        sqlx::query_as::<_, TextWithCount>(
            "SELECT t.id, t.text_id, t.text,
                    (SELECT COUNT(*) FROM annotations a WHERE a.text_id = t.id) AS annotation_count
             FROM texts t
             WHERE t.project_id = $1
             ORDER BY t.id
             LIMIT $2 OFFSET $3",
        )
        .bind(project_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Store one imported text.
    ///
    /// With an external id, the oldest text of the project carrying that id
    /// is updated if its content differs and left alone otherwise. Texts
    /// without an external id, or with one not seen before, are inserted.
    pub async fn upsert_by_external_id(
        tx: &mut PgTx<'_>,
        project_id: DbId,
        external_id: Option<&str>,
        content: &str,
    ) -> Result<(DbId, TextUpsertOutcome), sqlx::Error> {
        if let Some(external_id) = external_id {
            let existing: Option<(DbId, String)> = sqlx::query_as(
                "SELECT id, text FROM texts
                 WHERE project_id = $1 AND text_id = $2
                 ORDER BY id LIMIT 1",
            )
            .bind(project_id)
            .bind(external_id)
            .fetch_optional(&mut **tx)
            .await?;

            if let Some((id, current)) = existing {
                if current == content {
                    return Ok((id, TextUpsertOutcome::Unchanged));
                }
                sqlx::query("UPDATE texts SET text = $2, updated_at = NOW() WHERE id = $1")
                    .bind(id)
                    .bind(content)
                    .execute(&mut **tx)
                    .await?;
                return Ok((id, TextUpsertOutcome::Updated));
            }
        }

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO texts (project_id, text_id, text) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(project_id)
        .bind(external_id)
        .bind(content)
        .fetch_one(&mut **tx)
        .await?;
        Ok((id, TextUpsertOutcome::Created))
    }
}
