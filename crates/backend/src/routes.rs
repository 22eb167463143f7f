use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::shared::config::Config;

/// Запас лимита тела на границы и заголовки multipart поверх самого файла
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Конфигурация всех роутов приложения
pub fn configure_routes(config: &Config) -> Router {
    Router::new()
        .route("/health", get(handlers::health::liveness))
        .route("/api/health", get(handlers::health::readiness))
        // ============================================================
        // Catalogs
        // ============================================================
        // A001 Supplier handlers
        .route(
            "/api/supplier",
            get(handlers::a001_supplier::list_all).post(handlers::a001_supplier::upsert),
        )
        .route(
            "/api/supplier/:id",
            get(handlers::a001_supplier::get_by_id).delete(handlers::a001_supplier::delete),
        )
        // A002 Storage location handlers
        .route(
            "/api/storage_location",
            get(handlers::a002_storage_location::list_all)
                .post(handlers::a002_storage_location::upsert),
        )
        .route(
            "/api/storage_location/:id",
            get(handlers::a002_storage_location::get_by_id)
                .delete(handlers::a002_storage_location::delete),
        )
        // A003 Component handlers
        .route(
            "/api/component",
            get(handlers::a003_component::list_paginated)
                .post(handlers::a003_component::upsert),
        )
        .route(
            "/api/component/:id",
            get(handlers::a003_component::get_by_id).delete(handlers::a003_component::delete),
        )
        // ============================================================
        // UseCase u501: Import components from CSV
        // ============================================================
        .route(
            "/api/u501/import-csv/template",
            get(handlers::usecases::u501_csv_template),
        )
        .merge(u501_routes(config))
}

fn u501_routes(config: &Config) -> Router {
    Router::new()
        .route(
            "/api/u501/import-csv",
            post(handlers::usecases::u501_import_csv),
        )
        .layer(DefaultBodyLimit::max(
            config.import.max_file_bytes + MULTIPART_OVERHEAD,
        ))
        .with_state(config.import.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::{DatabaseConfig, ImportConfig, ServerConfig};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use contracts::usecases::common::UseCaseError;
    use contracts::usecases::u501_import_components_csv::ImportResult;
    use tower::ServiceExt;

    const BOUNDARY: &str = "inventory-test-boundary";
    const HEADER: &str = "name,owner_type,supplier_name,location_code,quantity\n";

    fn config(max_file_bytes: usize) -> Config {
        Config {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                path: ":memory:".into(),
            },
            import: ImportConfig {
                max_file_bytes,
                timeout_secs: 0,
            },
        }
    }

    fn multipart(field: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"components.csv\"\r\nContent-Type: text/csv\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/u501/import-csv")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(config: &Config, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = u501_routes(config).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_error(config: &Config, request: Request<Body>) -> (StatusCode, UseCaseError) {
        let (status, body) = send(config, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// Заголовок CSV, дополненный пустыми строками до `len` байт
    fn header_only_csv(len: usize) -> Vec<u8> {
        let mut content = HEADER.as_bytes().to_vec();
        content.resize(len, b'\n');
        content
    }

    #[tokio::test]
    async fn test_corrupt_upload_is_file_decode_error() {
        let (status, error) =
            send_error(&config(1024), multipart("file", &[0xff, 0xfe, 0x00, 0x41])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error.code, "FILE_DECODE_ERROR");
    }

    #[tokio::test]
    async fn test_missing_file_field_is_validation_error() {
        let (status, error) =
            send_error(&config(1024), multipart("attachment", HEADER.as_bytes())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_header_only_upload_succeeds() {
        let (status, body) = send(&config(1024), multipart("file", HEADER.as_bytes())).await;
        assert_eq!(status, StatusCode::OK);
        let result: ImportResult = serde_json::from_slice(&body).unwrap();
        assert_eq!(result.total_rows, 0);
        assert!(result.is_consistent());
    }

    #[tokio::test]
    async fn test_file_at_limit_is_accepted() {
        let (status, _) = send(&config(1024), multipart("file", &header_only_csv(1024))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_file_over_limit_is_payload_too_large() {
        let (status, error) =
            send_error(&config(1024), multipart("file", &header_only_csv(1025))).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error.code, "FILE_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_body_over_limit_is_payload_too_large() {
        let huge = header_only_csv(1024 + MULTIPART_OVERHEAD + 1);
        let (status, _) = send(&config(1024), multipart("file", &huge)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
