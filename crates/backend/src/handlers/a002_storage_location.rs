use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a002_storage_location::aggregate::{StorageLocation, StorageLocationDto};
use contracts::domain::common::AggregateRoot;
use serde_json::json;

use crate::domain::a002_storage_location;
use crate::shared::error::status_for;

/// GET /api/storage_location
pub async fn list_all() -> Result<Json<Vec<StorageLocation>>, StatusCode> {
    a002_storage_location::service::list_all()
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("Failed to list {}: {}", StorageLocation::list_name(), e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

/// GET /api/storage_location/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<StorageLocation>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a002_storage_location::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load storage location {}: {}", uuid, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/storage_location
pub async fn upsert(
    Json(dto): Json<StorageLocationDto>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let result = match dto.id {
        Some(_) => a002_storage_location::service::update(dto)
            .await
            .map(|_| uuid::Uuid::nil().to_string()),
        None => a002_storage_location::service::create(dto)
            .await
            .map(|id| id.to_string()),
    };

    result.map(|id| Json(json!({"id": id}))).map_err(|e| {
        tracing::error!("Failed to save storage location: {}", e);
        status_for(&e)
    })
}

/// DELETE /api/storage_location/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a002_storage_location::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to delete {} {}: {}", StorageLocation::full_name(), uuid, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
