use super::cancellation::ImportCancellation;
use super::parser::{self, FileDecodeError};
use super::reporter::{PhaseError, ResultReporter};
use super::store::ImportStore;
use super::validator::validate_row;
use contracts::usecases::u501_import_components_csv::{ImportError, ImportResult};
use std::time::Instant;
use thiserror::Error;

const PERSISTENCE_FAILURE: &str = "Failed to create component";

/// Импорт, не дошедший до полного [`ImportResult`]
#[derive(Debug, Error)]
pub enum ImportFailure {
    #[error(transparent)]
    Decode(#[from] FileDecodeError),

    /// Остановлен флагом отмены; `partial` описывает уже обработанные строки,
    /// созданные компоненты остаются в базе
    #[error("import cancelled after {processed} rows, {remaining_rows} rows not processed")]
    Cancelled {
        processed: usize,
        remaining_rows: usize,
        partial: ImportResult,
    },

    #[error(transparent)]
    Phase(#[from] PhaseError),
}

/// Исполнитель импорта компонентов из CSV
pub struct ImportExecutor<S> {
    store: S,
    cancellation: Option<ImportCancellation>,
}

impl<S: ImportStore> ImportExecutor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, cancellation: ImportCancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .map_or(false, ImportCancellation::is_cancelled)
    }

    /// Разбирает файл и импортирует строки по одной, в порядке файла.
    ///
    /// Ошибки отдельных строк попадают в `ImportResult::errors`; `Err`
    /// означает нечитаемый файл или отмену.
    pub async fn run(&self, content: &[u8]) -> Result<ImportResult, ImportFailure> {
        let started = Instant::now();
        let mut reporter = ResultReporter::new();

        reporter.start_parsing()?;
        let rows = match parser::parse_rows(content) {
            Ok(rows) => rows,
            Err(e) => {
                reporter.fail()?;
                tracing::warn!("Import rejected: {}", e);
                return Err(e.into());
            }
        };
        tracing::info!("Importing {} rows ({} bytes)", rows.len(), content.len());

        reporter.start_processing(rows.len())?;
        for row in &rows {
            if self.is_cancelled() {
                tracing::warn!(
                    "Import cancelled before row {} of {}",
                    row.row_number,
                    rows.len()
                );
                let cancelled = reporter.cancel(started.elapsed())?;
                return Err(ImportFailure::Cancelled {
                    processed: cancelled.partial.total_rows,
                    remaining_rows: cancelled.remaining_rows,
                    partial: cancelled.partial,
                });
            }

            let request = match validate_row(row, &self.store).await {
                Ok(request) => request,
                Err(error) => {
                    tracing::debug!("Row {} rejected: {}", row.row_number, error.error_message);
                    reporter.record_failure(error)?;
                    continue;
                }
            };

            match self.store.create_component(request).await {
                Ok(id) => reporter.record_success(id)?,
                Err(e) => {
                    tracing::error!("Row {}: failed to create component: {:#}", row.row_number, e);
                    reporter.record_failure(ImportError::new(row, PERSISTENCE_FAILURE))?;
                }
            }
        }

        Ok(reporter.finish(started.elapsed())?)
    }
}

/// Один импорт через `store`
pub async fn run_import<S: ImportStore>(
    content: &[u8],
    store: S,
    cancellation: Option<ImportCancellation>,
) -> Result<ImportResult, ImportFailure> {
    let mut executor = ImportExecutor::new(store);
    if let Some(cancellation) = cancellation {
        executor = executor.with_cancellation(cancellation);
    }
    executor.run(content).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u501_import_components_csv::validator::tests::FakeLookup;
    use crate::usecases::u501_import_components_csv::validator::OwnerLookup;
    use async_trait::async_trait;
    use contracts::domain::a003_component::aggregate::CreateComponentRequest;
    use std::sync::Mutex;
    use uuid::Uuid;

    const HEADER: &str = "name,sku,description,category,owner_type,supplier_name,location_code,quantity,unit,unit_cost,reorder_level\n";

    #[derive(Default)]
    struct FakeStore {
        lookup: FakeLookup,
        created: Mutex<Vec<CreateComponentRequest>>,
        /// Имена, на которых вставка падает
        rejecting: Vec<String>,
        /// Отменить токен, когда создано столько компонентов
        cancel_at: Option<(usize, ImportCancellation)>,
    }

    impl FakeStore {
        fn stocked() -> Self {
            Self {
                lookup: FakeLookup::default()
                    .with_supplier("Acme")
                    .with_location("A-01"),
                ..Default::default()
            }
        }

        fn created_names(&self) -> Vec<String> {
            self.created
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.name.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ImportStore for &FakeStore {
        async fn create_component(&self, request: CreateComponentRequest) -> anyhow::Result<Uuid> {
            if self.rejecting.contains(&request.name) {
                anyhow::bail!("UNIQUE constraint failed: a003_component.sku");
            }
            let mut created = self.created.lock().unwrap();
            created.push(request);
            if let Some((limit, token)) = &self.cancel_at {
                if created.len() >= *limit {
                    token.cancel();
                }
            }
            Ok(Uuid::new_v4())
        }
    }

    #[async_trait]
    impl OwnerLookup for &FakeStore {
        async fn find_supplier_ids_by_name(&self, name: &str) -> anyhow::Result<Vec<Uuid>> {
            self.lookup.find_supplier_ids_by_name(name).await
        }

        async fn find_storage_location_id_by_code(
            &self,
            code: &str,
        ) -> anyhow::Result<Option<Uuid>> {
            self.lookup.find_storage_location_id_by_code(code).await
        }
    }

    fn csv(lines: &[&str]) -> Vec<u8> {
        let mut text = HEADER.to_string();
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
        text.into_bytes()
    }

    fn assert_invariants(result: &ImportResult) {
        assert!(result.is_consistent(), "inconsistent result: {:?}", result);
        let numbers: Vec<usize> = result.errors.iter().map(|e| e.row_number).collect();
        let mut sorted = numbers.clone();
        sorted.sort_unstable();
        assert_eq!(numbers, sorted, "errors out of file order");
    }

    #[tokio::test]
    async fn test_all_rows_valid() {
        let store = FakeStore::stocked();
        let content = csv(&[
            "Bolt M3,B-M3,,Fasteners,supplier,Acme,,100,pcs,0.05,20",
            "Nut M3,,,Fasteners,supplier,acme,,250,,,",
            "Cable,,,Wiring,storage_location,,A-01,12,m,1.5,",
        ]);

        let result = run_import(&content, &store, None).await.unwrap();

        assert_invariants(&result);
        assert_eq!(result.total_rows, 3);
        assert_eq!(result.successful_imports, 3);
        assert_eq!(result.failed_imports, 0);
        assert!(result.errors.is_empty());
        assert_eq!(store.created_names(), vec!["Bolt M3", "Nut M3", "Cable"]);
    }

    #[tokio::test]
    async fn test_bad_owner_type_only_fails_its_row() {
        let store = FakeStore::stocked();
        let content = csv(&[
            "Bolt M3,,,,supplier,Acme,,1,,,",
            "Washer,,,,bogus,Acme,,1,,,",
            "Nut M3,,,,supplier,Acme,,1,,,",
        ]);

        let result = run_import(&content, &store, None).await.unwrap();

        assert_invariants(&result);
        assert_eq!(result.successful_imports, 2);
        assert_eq!(result.failed_imports, 1);
        let error = &result.errors[0];
        assert_eq!(error.row_number, 2);
        assert_eq!(error.error_field.as_deref(), Some("owner_type"));
        assert_eq!(error.row_data.name.as_deref(), Some("Washer"));
        assert_eq!(store.created_names(), vec!["Bolt M3", "Nut M3"]);
    }

    #[tokio::test]
    async fn test_non_numeric_quantity() {
        let store = FakeStore::stocked();
        let content = csv(&["Bolt M3,,,,supplier,Acme,,abc,,,"]);

        let result = run_import(&content, &store, None).await.unwrap();

        assert_eq!(result.failed_imports, 1);
        let error = &result.errors[0];
        assert_eq!(error.error_field.as_deref(), Some("quantity"));
        assert!(error.error_message.contains("must be a number"));
        assert!(store.created_names().is_empty());
    }

    #[tokio::test]
    async fn test_header_only() {
        let store = FakeStore::stocked();
        let result = run_import(HEADER.as_bytes(), &store, None).await.unwrap();
        assert_eq!(result.total_rows, 0);
        assert_eq!(result.successful_imports, 0);
        assert_eq!(result.failed_imports, 0);
        assert!(result.errors.is_empty());
        assert!(result.imported_component_ids.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_fatal() {
        let store = FakeStore::stocked();
        let err = run_import(&[0xff, 0xfe, 0x00, 0x41], &store, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ImportFailure::Decode(FileDecodeError::Encoding(_))
        ));

        let err = run_import(b"", &store, None).await.unwrap_err();
        assert!(matches!(err, ImportFailure::Decode(FileDecodeError::Empty)));
        assert!(store.created_names().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_continues() {
        let store = FakeStore {
            rejecting: vec!["Duplicate".into()],
            ..FakeStore::stocked()
        };
        let content = csv(&[
            "Duplicate,D-1,,,supplier,Acme,,1,,,",
            "Fresh,,,,supplier,Acme,,1,,,",
        ]);

        let result = run_import(&content, &store, None).await.unwrap();

        assert_invariants(&result);
        assert_eq!(result.successful_imports, 1);
        let error = &result.errors[0];
        assert_eq!(error.row_number, 1);
        assert_eq!(error.error_field, None);
        assert_eq!(error.error_message, "Failed to create component");
    }

    #[tokio::test]
    async fn test_malformed_line_is_a_row_error() {
        let store = FakeStore::stocked();
        let content = csv(&["Bolt M3,,,,supplier,Acme,,1", "Nut M3,,,,supplier,Acme,,1,,,"]);

        let result = run_import(&content, &store, None).await.unwrap();

        assert_invariants(&result);
        assert_eq!(result.failed_imports, 1);
        assert_eq!(result.errors[0].row_number, 1);
        assert_eq!(result.errors[0].error_field, None);
        assert_eq!(store.created_names(), vec!["Nut M3"]);
    }

    #[tokio::test]
    async fn test_cancellation_returns_partial_result() {
        let token = ImportCancellation::new();
        let store = FakeStore {
            cancel_at: Some((2, token.clone())),
            ..FakeStore::stocked()
        };
        let content = csv(&[
            "One,,,,supplier,Acme,,1,,,",
            "Two,,,,supplier,Acme,,1,,,",
            "Three,,,,supplier,Acme,,1,,,",
            "Four,,,,supplier,Acme,,1,,,",
        ]);

        let err = ImportExecutor::new(&store)
            .with_cancellation(token)
            .run(&content)
            .await
            .unwrap_err();

        match err {
            ImportFailure::Cancelled {
                processed,
                remaining_rows,
                partial,
            } => {
                assert_invariants(&partial);
                assert_eq!(processed, 2);
                assert_eq!(remaining_rows, 2);
                assert_eq!(partial.total_rows, 2);
                assert_eq!(partial.imported_component_ids.len(), 2);
            }
            other => panic!("expected cancellation, got {:?}", other),
        }
        assert_eq!(store.created_names(), vec!["One", "Two"]);
    }

    #[tokio::test]
    async fn test_cancelled_up_front() {
        let store = FakeStore::stocked();
        let token = ImportCancellation::new();
        token.cancel();
        let content = csv(&["One,,,,supplier,Acme,,1,,,"]);

        let err = run_import(&content, &store, Some(token)).await.unwrap_err();
        assert!(matches!(
            err,
            ImportFailure::Cancelled {
                processed: 0,
                remaining_rows: 1,
                ..
            }
        ));
        assert!(store.created_names().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_after_last_row_still_completes() {
        // флаг выставлен после последней строки, проверять больше нечего
        let token = ImportCancellation::new();
        let store = FakeStore {
            cancel_at: Some((1, token.clone())),
            ..FakeStore::stocked()
        };
        let content = csv(&["One,,,,supplier,Acme,,1,,,"]);

        let result = run_import(&content, &store, Some(token)).await.unwrap();
        assert_eq!(result.total_rows, 1);
        assert_eq!(result.successful_imports, 1);
    }

    #[tokio::test]
    async fn test_cancelled_differs_from_header_only() {
        let token = ImportCancellation::new();
        token.cancel();
        let store = FakeStore::stocked();

        let empty = run_import(HEADER.as_bytes(), &store, Some(token.clone()))
            .await
            .unwrap();
        assert_eq!(empty.total_rows, 0);

        let content = csv(&["One,,,,supplier,Acme,,1,,,"]);
        let cancelled = run_import(&content, &store, Some(token)).await;
        assert!(cancelled.is_err());
    }

    #[tokio::test]
    async fn test_rows_cannot_reference_each_other() {
        let store = FakeStore::stocked();
        let content = csv(&[
            "Bolt M3,,,,supplier,Acme,,1,,,",
            "Nut M3,,,,supplier,Bolt M3,,1,,,",
        ]);

        let result = run_import(&content, &store, None).await.unwrap();
        assert_eq!(result.successful_imports, 1);
        assert_eq!(result.errors[0].row_number, 2);
        assert_eq!(result.errors[0].error_field.as_deref(), Some("supplier_id"));
    }
}
