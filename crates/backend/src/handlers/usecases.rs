use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use contracts::usecases::common::{UseCaseError, UseCaseMetadata};
use contracts::usecases::u501_import_components_csv::{
    ImportComponentsCsv, ImportResult, CSV_COLUMNS,
};
use std::time::Duration;

use crate::shared::config::ImportConfig;
use crate::usecases::u501_import_components_csv::{
    DbImportStore, ImportCancellation, ImportExecutor, ImportFailure,
};

// ============================================================================
// UseCase u501: Import components from CSV
// ============================================================================

type UseCaseFailure = (StatusCode, Json<UseCaseError>);

fn reject(status: StatusCode, error: UseCaseError) -> UseCaseFailure {
    tracing::warn!("CSV import rejected ({}): {}", status.as_u16(), error);
    (status, Json(error))
}

fn bad_request(error: UseCaseError) -> UseCaseFailure {
    reject(StatusCode::BAD_REQUEST, error)
}

/// Ошибка multipart: 413 при превышении лимита тела, иначе 400
fn multipart_failure(message: &str, e: MultipartError) -> UseCaseFailure {
    let status = e.status();
    let error = if status == StatusCode::PAYLOAD_TOO_LARGE {
        UseCaseError::file_too_large("Uploaded file exceeds the size limit")
    } else {
        UseCaseError::validation(message)
    };
    reject(status, error.with_details(e.body_text()))
}

/// Содержимое поля multipart с именем `file`
async fn read_file_field(multipart: &mut Multipart) -> Result<Vec<u8>, UseCaseFailure> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_failure("Invalid multipart body", e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_failure("Failed to read uploaded file", e))?;
        return Ok(bytes.to_vec());
    }
    Err(bad_request(UseCaseError::validation(
        "Multipart field 'file' is missing",
    )))
}

fn import_failure(failure: ImportFailure) -> UseCaseFailure {
    match failure {
        ImportFailure::Decode(e) => bad_request(UseCaseError::file_decode(e.to_string())),
        ImportFailure::Cancelled {
            processed,
            remaining_rows,
            partial,
        } => {
            let message = format!(
                "Import cancelled after {} rows ({} imported, {} failed), {} rows not processed; imported components are kept",
                processed, partial.successful_imports, partial.failed_imports, remaining_rows
            );
            let mut error = UseCaseError::import_cancelled(message);
            match serde_json::to_string(&partial) {
                Ok(details) => error = error.with_details(details),
                Err(e) => tracing::error!("Failed to serialize partial import result: {}", e),
            }
            reject(StatusCode::SERVICE_UNAVAILABLE, error)
        }
        ImportFailure::Phase(e) => {
            tracing::error!("CSV import aborted: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(UseCaseError::internal(e.to_string())),
            )
        }
    }
}

/// POST /api/u501/import-csv
pub async fn u501_import_csv(
    State(config): State<ImportConfig>,
    mut multipart: Multipart,
) -> Result<Json<ImportResult>, UseCaseFailure> {
    let content = read_file_field(&mut multipart).await?;
    tracing::info!(
        "{}: received {} bytes",
        ImportComponentsCsv::full_name(),
        content.len()
    );

    // лимит тела включает запас на разметку multipart, сам файл проверяем точно
    if content.len() > config.max_file_bytes {
        return Err(reject(
            StatusCode::PAYLOAD_TOO_LARGE,
            UseCaseError::file_too_large(format!(
                "File is {} bytes, the limit is {} bytes",
                content.len(),
                config.max_file_bytes
            )),
        ));
    }

    let cancellation = ImportCancellation::new();
    let deadline = (config.timeout_secs > 0)
        .then(|| cancellation.cancel_after(Duration::from_secs(config.timeout_secs)));

    let outcome = ImportExecutor::new(DbImportStore)
        .with_cancellation(cancellation)
        .run(&content)
        .await;

    if let Some(deadline) = deadline {
        deadline.abort();
    }

    outcome.map(Json).map_err(import_failure)
}

/// GET /api/u501/import-csv/template
pub async fn u501_csv_template() -> impl IntoResponse {
    let body = format!("{}\n", CSV_COLUMNS.join(","));
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"components_template.csv\"",
            ),
        ],
        body,
    )
}
