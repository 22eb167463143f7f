use serde::{Deserialize, Serialize};

/// Ошибка сценария целиком, тело ответа при отказе
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl UseCaseError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Загруженный файл не удалось прочитать
    pub fn file_decode(message: impl Into<String>) -> Self {
        Self::new("FILE_DECODE_ERROR", message)
    }

    /// Файл больше настроенного лимита
    pub fn file_too_large(message: impl Into<String>) -> Self {
        Self::new("FILE_TOO_LARGE", message)
    }

    /// Импорт остановлен до конца файла; в `details` частичный результат
    pub fn import_cancelled(message: impl Into<String>) -> Self {
        Self::new("IMPORT_CANCELLED", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, ": {}", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for UseCaseError {}

impl From<anyhow::Error> for UseCaseError {
    fn from(err: anyhow::Error) -> Self {
        UseCaseError::internal(err.to_string())
    }
}
