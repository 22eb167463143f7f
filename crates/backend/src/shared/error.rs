use axum::http::StatusCode;
use thiserror::Error;

/// Ошибки, на которые вызывающий может отреагировать; остальное идёт как `anyhow`
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// HTTP статус для ошибки сервиса
pub fn status_for(err: &anyhow::Error) -> StatusCode {
    match err.downcast_ref::<DomainError>() {
        Some(DomainError::Validation(_)) => StatusCode::BAD_REQUEST,
        Some(DomainError::NotFound(_)) => StatusCode::NOT_FOUND,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for() {
        let validation: anyhow::Error = DomainError::Validation("name is empty".into()).into();
        assert_eq!(status_for(&validation), StatusCode::BAD_REQUEST);
        assert_eq!(validation.to_string(), "Validation failed: name is empty");

        let missing: anyhow::Error = DomainError::NotFound("supplier".into()).into();
        assert_eq!(status_for(&missing), StatusCode::NOT_FOUND);

        let other = anyhow::anyhow!("disk full");
        assert_eq!(status_for(&other), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
