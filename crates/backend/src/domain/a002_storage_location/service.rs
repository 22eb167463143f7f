use super::repository;
use contracts::domain::a002_storage_location::aggregate::{StorageLocation, StorageLocationDto};
use uuid::Uuid;

use crate::shared::error::DomainError;

fn normalize(dto: StorageLocationDto) -> StorageLocationDto {
    StorageLocationDto {
        code: dto.code.trim().to_string(),
        description: dto.description.trim().to_string(),
        zone: dto
            .zone
            .map(|z| z.trim().to_string())
            .filter(|z| !z.is_empty()),
        ..dto
    }
}

async fn ensure_code_is_free(code: &str, own_id: Option<Uuid>) -> anyhow::Result<()> {
    if let Some(existing) = repository::find_id_by_code(code).await? {
        if Some(existing) != own_id {
            return Err(DomainError::Validation(format!(
                "location code '{}' is already in use",
                code
            ))
            .into());
        }
    }
    Ok(())
}

pub async fn create(dto: StorageLocationDto) -> anyhow::Result<Uuid> {
    let dto = normalize(dto);
    let mut aggregate =
        StorageLocation::new_for_insert(dto.code, dto.description, dto.zone, dto.comment);

    aggregate
        .validate()
        .map_err(DomainError::Validation)?;
    ensure_code_is_free(aggregate.location_code(), None).await?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    tracing::info!(
        "Storage location '{}' created with id {}",
        aggregate.location_code(),
        id
    );
    Ok(id)
}

pub async fn update(dto: StorageLocationDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| DomainError::Validation("invalid id".into()))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| DomainError::NotFound(id.to_string()))?;

    aggregate.update(&normalize(dto));

    aggregate
        .validate()
        .map_err(DomainError::Validation)?;
    ensure_code_is_free(aggregate.location_code(), Some(id)).await?;
    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<StorageLocation>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<StorageLocation>> {
    repository::list_all().await
}

/// Поиск места хранения по коду для импорта CSV
pub async fn find_id_by_code(code: &str) -> anyhow::Result<Option<Uuid>> {
    let code = code.trim();
    if code.is_empty() {
        return Ok(None);
    }
    repository::find_id_by_code(code).await
}
