//! CSV import into a project.
//!
//! One request is one transaction: texts are upserted, annotation rows are
//! planned against the stored texts, labels are fetched or created, and
//! annotations are upserted. A fatal [`ImportError`] or database error rolls
//! everything back. Row-level problems are skipped and reported as warnings.

use std::collections::HashMap;

use annotator_core::encoding::decode;
use annotator_core::error::RowWarning;
use annotator_core::importer::annotation::parse_annotation_file;
use annotator_core::importer::combined::{is_combined_header, parse_combined_file};
use annotator_core::importer::plan::{
    plan_annotations, AnnotationCandidate, AnnotationPlan, EndIndexPolicy, TextTarget,
};
use annotator_core::importer::text::parse_text_file;
use annotator_core::importer::{ImportMode, ImportSummary, ParsedTexts, TextKey};
use annotator_core::labels::NEUTRAL_LABEL_COLOR;
use annotator_core::span::char_len;
use annotator_core::types::DbId;
use annotator_db::models::annotation::SaveAnnotation;
use annotator_db::models::text::TextUpsertOutcome;
use annotator_db::repositories::{AnnotationRepo, LabelRepo, PgTx, TextRepo};
use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::Json;

use crate::access::{load_as_owner, ProjectPath};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Uploaded form parts, by field name.
#[derive(Debug, Default)]
struct ImportForm {
    import_type: Option<String>,
    csv_file: Option<Bytes>,
    text_csv_file: Option<Bytes>,
    annotation_csv_file: Option<Bytes>,
}

impl ImportForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            match name.as_str() {
                "import_type" => form.import_type = Some(String::from_utf8_lossy(&data).into_owned()),
                "csv_file" => form.csv_file = Some(data),
                "text_csv_file" => form.text_csv_file = Some(data),
                "annotation_csv_file" => form.annotation_csv_file = Some(data),
                other => tracing::debug!(field = other, "Ignoring unknown import form field"),
            }
        }
        Ok(form)
    }
}

/// POST /api/v1/users/{owner_id}/projects/{project_no}/import
///
/// Multipart fields: `import_type` (`single` or `dual`, default `single`),
/// `csv_file` for single mode, `text_csv_file` and `annotation_csv_file`
/// for dual mode.
pub async fn import(
    State(state): State<AppState>,
    user: AuthUser,
    Path(path): Path<ProjectPath>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportSummary>>> {
    let scope = load_as_owner(&state.pool, path, &user).await?;
    let form = ImportForm::read(multipart).await?;
    let mode = ImportMode::parse(form.import_type.as_deref().unwrap_or_default());

    let mut importer = ProjectImport {
        project_id: scope.id(),
        user_id: user.user_id,
        summary: ImportSummary::default(),
    };
    let mut tx = state.pool.begin().await?;

    match mode {
        ImportMode::Single => {
            let bytes = required_file(form.csv_file, "Please upload a CSV file.")?;
            let source = decode(&bytes, "CSV file")?;
            tracing::debug!(encoding = %source.encoding, "Decoded import file");

            if is_combined_header(&source.text)? {
                let parsed = parse_combined_file(&source.text)?;
                let targets = importer.store_texts(&mut tx, parsed.texts).await?;
                importer
                    .store_annotations(&mut tx, &parsed.annotations, &targets, EndIndexPolicy::Clamp)
                    .await?;
            } else {
                let parsed = parse_text_file(&source.text)?;
                importer.store_texts(&mut tx, parsed).await?;
            }
        }
        ImportMode::Dual => {
            let text_bytes = required_file(form.text_csv_file, "Please upload a text CSV file.")?;
            let annotation_bytes = required_file(
                form.annotation_csv_file,
                "Please upload an annotation CSV file.",
            )?;
            let texts = decode(&text_bytes, "text CSV file")?;
            let annotations = decode(&annotation_bytes, "annotation CSV file")?;

            let parsed_texts = parse_text_file(&texts.text)?;
            let candidates = parse_annotation_file(&annotations.text)?;

            let targets = importer.store_texts(&mut tx, parsed_texts).await?;
            importer
                .store_annotations(&mut tx, &candidates, &targets, EndIndexPolicy::Strict)
                .await?;
        }
    }

    tx.commit().await?;

    let summary = importer.summary;
    tracing::info!(
        project_id = scope.id(),
        mode = ?mode,
        texts_created = summary.texts_created,
        texts_updated = summary.texts_updated,
        texts_unchanged = summary.texts_unchanged,
        annotations = summary.annotations_imported,
        duplicates = summary.duplicates,
        warnings = summary.warnings.len(),
        "Import committed"
    );
    Ok(Json(DataResponse::new(summary)))
}

fn required_file(file: Option<Bytes>, message: &str) -> AppResult<Bytes> {
    file.filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::BadRequest(message.to_string()))
}

/// Accumulates the summary while the import runs inside one transaction.
struct ProjectImport {
    project_id: DbId,
    user_id: DbId,
    summary: ImportSummary,
}

impl ProjectImport {
    /// Upsert parsed texts and return them keyed for annotation lookup.
    async fn store_texts(
        &mut self,
        tx: &mut PgTx<'_>,
        parsed: ParsedTexts,
    ) -> Result<HashMap<TextKey, TextTarget>, AppError> {
        self.warn_all(parsed.warnings);
        self.summary.texts_repeated += parsed.repeated;

        let mut targets = HashMap::with_capacity(parsed.texts.len());
        for row in parsed.texts {
            let (text_id, outcome) = TextRepo::upsert_by_external_id(
                tx,
                self.project_id,
                row.external_id.as_deref(),
                &row.content,
            )
            .await?;

            match outcome {
                TextUpsertOutcome::Created => self.summary.texts_created += 1,
                TextUpsertOutcome::Updated => self.summary.texts_updated += 1,
                TextUpsertOutcome::Unchanged => self.summary.texts_unchanged += 1,
            }

            targets.insert(
                row.key,
                TextTarget {
                    text_id,
                    char_len: char_len(&row.content),
                },
            );
        }
        Ok(targets)
    }

    async fn store_annotations(
        &mut self,
        tx: &mut PgTx<'_>,
        candidates: &[AnnotationCandidate],
        targets: &HashMap<TextKey, TextTarget>,
        policy: EndIndexPolicy,
    ) -> Result<(), AppError> {
        let plan = plan_annotations(candidates, targets, policy);

        let mut label_ids: HashMap<String, DbId> = HashMap::new();
        for name in plan.label_names() {
            let id = LabelRepo::get_or_create(
                tx,
                self.project_id,
                name,
                NEUTRAL_LABEL_COLOR,
                self.user_id,
            )
            .await?;
            label_ids.insert(name.to_string(), id);
        }

        let AnnotationPlan {
            annotations,
            duplicates,
            warnings,
        } = plan;
        self.warn_all(warnings);
        self.summary.duplicates += duplicates;

        for planned in annotations {
            let label_id = label_ids[planned.label.as_str()];
            let input = SaveAnnotation {
                start_index: planned.start_index,
                end_index: planned.end_index,
                label_id,
                suggestions: planned.suggestions,
                is_reannotation: false,
            };
            AnnotationRepo::upsert_for_range(&mut **tx, planned.text_id, self.user_id, &input)
                .await?;
            self.summary.annotations_imported += 1;
        }
        Ok(())
    }

    fn warn_all(&mut self, warnings: Vec<RowWarning>) {
        for warning in &warnings {
            tracing::warn!(
                project_id = self.project_id,
                row = warning.row,
                message = %warning.message,
                "Skipped import row"
            );
        }
        self.summary.warnings.extend(warnings);
    }
}

