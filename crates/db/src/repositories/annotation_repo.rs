//! Repository for the `annotations` table.
//!
//! Offsets are compared against `char_length(texts.text)`, which counts code
//! points like the core span functions do.

use annotator_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use crate::models::annotation::{
    Annotation, AnnotationWithLabel, ExportRow, SaveAnnotation, UpsertOutcome,
};

const COLUMNS: &str = "id, text_id, user_id, label_id, start_index, end_index, suggestions, \
                       is_reannotation, created_at, updated_at";

pub struct AnnotationRepo;

impl AnnotationRepo {
    /// Create the user's annotation on this exact range, or overwrite the
    /// label, suggestions and reannotation flag of the one already there.
    ///
    /// Runs on a pool or inside an import transaction.
    pub async fn upsert_for_range<'e, E>(
        executor: E,
        text_id: DbId,
        user_id: DbId,
        input: &SaveAnnotation,
    ) -> Result<UpsertOutcome, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, UpsertOutcome>(
            "INSERT INTO annotations
                (text_id, user_id, label_id, start_index, end_index, suggestions, is_reannotation)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT ON CONSTRAINT uq_annotations_text_user_range DO UPDATE SET
                label_id = EXCLUDED.label_id,
                suggestions = EXCLUDED.suggestions,
                is_reannotation = EXCLUDED.is_reannotation,
                updated_at = NOW()
             RETURNING id, (xmax = 0) AS inserted",
        )
        .bind(text_id)
        .bind(user_id)
        .bind(input.label_id)
        .bind(input.start_index)
        .bind(input.end_index)
        .bind(Json(&input.suggestions))
        .bind(input.is_reannotation)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Annotation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM annotations WHERE id = $1");
        sqlx::query_as::<_, Annotation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All annotations on a text, by every user, ordered by start.
    pub async fn list_for_text(
        pool: &PgPool,
        text_id: DbId,
    ) -> Result<Vec<AnnotationWithLabel>, sqlx::Error> {
        sqlx::query_as::<_, AnnotationWithLabel>(
            "SELECT a.id, a.start_index, a.end_index, l.name AS label, l.color AS label_color,
                    a.suggestions, a.user_id, u.username
             FROM annotations a
             JOIN labels l ON l.id = a.label_id
             JOIN users u ON u.id = a.user_id
             WHERE a.text_id = $1
             ORDER BY a.start_index, a.id",
        )
        .bind(text_id)
        .fetch_all(pool)
        .await
    }

    /// Annotations for many texts at once, ordered by text then start.
    pub async fn list_for_texts(
        pool: &PgPool,
        text_ids: &[DbId],
    ) -> Result<Vec<(DbId, AnnotationWithLabel)>, sqlx::Error> {
        let rows: Vec<TextAnnotationRow> = sqlx::query_as(
            "SELECT a.text_id, a.id, a.start_index, a.end_index, l.name AS label,
                    l.color AS label_color, a.suggestions, a.user_id, u.username
             FROM annotations a
             JOIN labels l ON l.id = a.label_id
             JOIN users u ON u.id = a.user_id
             WHERE a.text_id = ANY($1)
             ORDER BY a.text_id, a.start_index, a.id",
        )
        .bind(text_ids)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|r| (r.text_id, r.annotation)).collect())
    }

    /// Delete annotations on a text whose span no longer fits its content.
    /// Returns the number purged.
    pub async fn purge_invalid(pool: &PgPool, text_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM annotations a
             USING texts t
             WHERE a.text_id = t.id AND t.id = $1
               AND (a.start_index < 0
                    OR a.end_index <= a.start_index
                    OR a.end_index > char_length(t.text))",
        )
        .bind(text_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Replace the suggestions of the user's own annotation on a text.
    /// Returns `None` if no such annotation exists.
    pub async fn update_suggestions(
        pool: &PgPool,
        id: DbId,
        text_id: DbId,
        user_id: DbId,
        suggestions: &[String],
    ) -> Result<Option<Annotation>, sqlx::Error> {
        let query = format!(
            "UPDATE annotations SET suggestions = $4, updated_at = NOW()
             WHERE id = $1 AND text_id = $2 AND user_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Annotation>(&query)
            .bind(id)
            .bind(text_id)
            .bind(user_id)
            .bind(Json(suggestions))
            .fetch_optional(pool)
            .await
    }

    /// Delete an annotation only if `user_id` created it.
    pub async fn delete_own(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM annotations WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every annotation of a project with its text and label, ordered by
    /// text then start index.
    pub async fn list_for_export(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ExportRow>, sqlx::Error> {
        sqlx::query_as::<_, ExportRow>(
            "SELECT a.id AS annotation_id, t.text_id AS external_text_id, t.text AS content,
                    a.start_index, a.end_index, l.name AS label, a.suggestions
             FROM annotations a
             JOIN texts t ON t.id = a.text_id
             JOIN labels l ON l.id = a.label_id
             WHERE t.project_id = $1
             ORDER BY t.id, a.start_index, a.id",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}

#[derive(sqlx::FromRow)]
struct TextAnnotationRow {
    text_id: DbId,
    #[sqlx(flatten)]
    annotation: AnnotationWithLabel,
}
