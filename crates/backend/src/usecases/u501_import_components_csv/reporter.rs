use contracts::usecases::u501_import_components_csv::{ImportError, ImportResult};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Жизненный цикл одного импорта:
/// `Pending → Parsing → Processing → Completed | Cancelled`,
/// при нечитаемом файле `Pending | Parsing → Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Pending,
    Parsing,
    Processing,
    Completed,
    Cancelled,
    Failed,
}

/// Попытка действия, недопустимого в текущей фазе
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} while the import is {phase:?}")]
pub struct PhaseError {
    pub phase: ImportPhase,
    pub action: &'static str,
}

/// Импорт, остановленный до конца файла
#[derive(Debug, Clone, PartialEq)]
pub struct CancelledImport {
    pub partial: ImportResult,
    /// Строки, до которых очередь не дошла
    pub remaining_rows: usize,
}

/// Накапливает результаты строк в порядке файла и собирает итоговый
/// [`ImportResult`]
#[derive(Debug)]
pub struct ResultReporter {
    phase: ImportPhase,
    rows_in_file: usize,
    result: ImportResult,
}

impl ResultReporter {
    pub fn new() -> Self {
        Self {
            phase: ImportPhase::Pending,
            rows_in_file: 0,
            result: ImportResult::default(),
        }
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    fn require(&self, allowed: &[ImportPhase], action: &'static str) -> Result<(), PhaseError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(PhaseError {
                phase: self.phase,
                action,
            })
        }
    }

    pub fn start_parsing(&mut self) -> Result<(), PhaseError> {
        self.require(&[ImportPhase::Pending], "start parsing")?;
        self.phase = ImportPhase::Parsing;
        Ok(())
    }

    pub fn start_processing(&mut self, rows_in_file: usize) -> Result<(), PhaseError> {
        self.require(&[ImportPhase::Parsing], "start processing")?;
        self.rows_in_file = rows_in_file;
        self.phase = ImportPhase::Processing;
        Ok(())
    }

    /// Файл не дал ни одной строки
    pub fn fail(&mut self) -> Result<(), PhaseError> {
        self.require(&[ImportPhase::Pending, ImportPhase::Parsing], "fail")?;
        self.phase = ImportPhase::Failed;
        Ok(())
    }

    fn require_open_row(&self, action: &'static str) -> Result<(), PhaseError> {
        self.require(&[ImportPhase::Processing], action)?;
        if self.result.total_rows >= self.rows_in_file {
            return Err(PhaseError {
                phase: self.phase,
                action,
            });
        }
        Ok(())
    }

    pub fn record_success(&mut self, id: Uuid) -> Result<(), PhaseError> {
        self.require_open_row("record a success")?;
        self.result.total_rows += 1;
        self.result.successful_imports += 1;
        self.result.imported_component_ids.push(id.to_string());
        Ok(())
    }

    pub fn record_failure(&mut self, error: ImportError) -> Result<(), PhaseError> {
        self.require_open_row("record a failure")?;
        self.result.total_rows += 1;
        self.result.failed_imports += 1;
        self.result.errors.push(error);
        Ok(())
    }

    fn take_result(&mut self, elapsed: Duration) -> ImportResult {
        self.result.duration_ms = elapsed.as_millis() as u64;
        debug_assert!(self.result.is_consistent());
        std::mem::take(&mut self.result)
    }

    /// Все строки файла обработаны
    pub fn finish(&mut self, elapsed: Duration) -> Result<ImportResult, PhaseError> {
        self.require(&[ImportPhase::Processing], "finish")?;
        if self.result.total_rows != self.rows_in_file {
            return Err(PhaseError {
                phase: self.phase,
                action: "finish with unprocessed rows",
            });
        }
        self.phase = ImportPhase::Completed;
        let result = self.take_result(elapsed);

        tracing::info!(
            "Import completed: {} rows, {} imported, {} failed in {} ms",
            result.total_rows,
            result.successful_imports,
            result.failed_imports,
            result.duration_ms
        );
        Ok(result)
    }

    /// Остановка по флагу отмены; уже созданные компоненты остаются в базе
    pub fn cancel(&mut self, elapsed: Duration) -> Result<CancelledImport, PhaseError> {
        self.require(&[ImportPhase::Processing], "cancel")?;
        self.phase = ImportPhase::Cancelled;
        let remaining_rows = self.rows_in_file - self.result.total_rows;
        let partial = self.take_result(elapsed);

        tracing::warn!(
            "Import cancelled: {} of {} rows processed, {} imported, {} failed in {} ms",
            partial.total_rows,
            self.rows_in_file,
            partial.successful_imports,
            partial.failed_imports,
            partial.duration_ms
        );
        Ok(CancelledImport {
            partial,
            remaining_rows,
        })
    }
}

impl Default for ResultReporter {
    fn default() -> Self {
        Self::new()
    }
}
