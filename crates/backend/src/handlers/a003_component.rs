use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a003_component::aggregate::{Component, ComponentDto};
use contracts::domain::a003_component::list::{ComponentListParams, ComponentPage};
use contracts::domain::common::AggregateRoot;
use serde_json::json;

use crate::domain::a003_component;
use crate::shared::error::status_for;

/// GET /api/component
///
/// Фильтры, сортировка и страницы из query string, см.
/// [`ComponentListParams`].
pub async fn list_paginated(
    Query(params): Query<ComponentListParams>,
) -> Result<Json<ComponentPage>, StatusCode> {
    match a003_component::service::list_paginated(&params).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            tracing::error!("Failed to list {}: {}", Component::list_name(), e);
            Err(status_for(&e))
        }
    }
}

/// GET /api/component/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Component>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a003_component::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load component {}: {}", uuid, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/component
pub async fn upsert(Json(dto): Json<ComponentDto>) -> Result<Json<serde_json::Value>, StatusCode> {
    let result = if dto.id.is_some() {
        a003_component::service::update(dto)
            .await
            .map(|_| uuid::Uuid::nil().to_string())
    } else {
        a003_component::service::create(dto)
            .await
            .map(|id| id.to_string())
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => {
            tracing::error!("Failed to save component: {}", e);
            Err(status_for(&e))
        }
    }
}

/// DELETE /api/component/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a003_component::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to delete {} {}: {}", Component::full_name(), uuid, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
