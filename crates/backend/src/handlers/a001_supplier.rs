use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a001_supplier::aggregate::{Supplier, SupplierDto};
use contracts::domain::common::AggregateRoot;
use serde_json::json;

use crate::domain::a001_supplier;
use crate::shared::error::status_for;

/// GET /api/supplier
pub async fn list_all() -> Result<Json<Vec<Supplier>>, StatusCode> {
    match a001_supplier::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list {}: {}", Supplier::list_name(), e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/supplier/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Supplier>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a001_supplier::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load supplier {}: {}", uuid, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/supplier
pub async fn upsert(Json(dto): Json<SupplierDto>) -> Result<Json<serde_json::Value>, StatusCode> {
    let result = if dto.id.is_some() {
        a001_supplier::service::update(dto)
            .await
            .map(|_| uuid::Uuid::nil().to_string())
    } else {
        a001_supplier::service::create(dto)
            .await
            .map(|id| id.to_string())
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => {
            tracing::error!("Failed to save supplier: {}", e);
            Err(status_for(&e))
        }
    }
}

/// DELETE /api/supplier/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a001_supplier::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to delete {} {}: {}", Supplier::full_name(), uuid, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
