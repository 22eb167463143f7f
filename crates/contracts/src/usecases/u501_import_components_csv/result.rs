use super::row::ImportRow;
use serde::{Deserialize, Serialize};

/// Почему строка не импортирована
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportError {
    pub row_number: usize,
    pub row_data: ImportRow,
    pub error_message: String,
    /// Ошибочный атрибут; пусто для ошибок строки целиком и записи в БД
    pub error_field: Option<String>,
}

impl ImportError {
    pub fn new(row: &ImportRow, error_message: impl Into<String>) -> Self {
        Self {
            row_number: row.row_number,
            row_data: row.clone(),
            error_message: error_message.into(),
            error_field: None,
        }
    }

    pub fn for_field(
        row: &ImportRow,
        error_field: &str,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            error_field: Some(error_field.to_string()),
            ..Self::new(row, error_message)
        }
    }
}

/// Итог завершённого импорта
///
/// `successful_imports + failed_imports == total_rows`, по одному id на
/// успех и по одной ошибке на отказ, в порядке строк.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub total_rows: usize,
    pub successful_imports: usize,
    pub failed_imports: usize,
    pub errors: Vec<ImportError>,
    pub imported_component_ids: Vec<String>,
    pub duration_ms: u64,
}

impl ImportResult {
    /// Сходятся ли счётчики с записанными id и ошибками
    pub fn is_consistent(&self) -> bool {
        self.successful_imports + self.failed_imports == self.total_rows
            && self.successful_imports == self.imported_component_ids.len()
            && self.failed_imports == self.errors.len()
    }
}
