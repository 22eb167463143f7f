use super::repository;
use contracts::domain::a001_supplier::aggregate::{Supplier, SupplierDto};
use uuid::Uuid;

use crate::shared::error::DomainError;

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn create(dto: SupplierDto) -> anyhow::Result<Uuid> {
    let code = trimmed(dto.code)
        .unwrap_or_else(|| format!("SUP-{}", &Uuid::new_v4().simple().to_string()[..8]));
    let mut aggregate = Supplier::new_for_insert(
        code,
        dto.description.trim().to_string(),
        trimmed(dto.contact_email),
        trimmed(dto.phone),
        dto.comment,
    );

    aggregate
        .validate()
        .map_err(DomainError::Validation)?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    tracing::info!("Supplier '{}' created with id {}", aggregate.name(), id);
    Ok(id)
}

pub async fn update(dto: SupplierDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| DomainError::Validation("invalid id".into()))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| DomainError::NotFound(id.to_string()))?;

    let dto = SupplierDto {
        code: trimmed(dto.code),
        description: dto.description.trim().to_string(),
        contact_email: trimmed(dto.contact_email),
        phone: trimmed(dto.phone),
        ..dto
    };
    aggregate.update(&dto);

    aggregate
        .validate()
        .map_err(DomainError::Validation)?;
    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Supplier>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<Supplier>> {
    repository::list_all().await
}

/// Поиск поставщика по имени для импорта CSV.
/// Имена не уникальны: возвращается до двух совпадений, что делать
/// с дублем решает вызывающий.
pub async fn find_ids_by_name(name: &str) -> anyhow::Result<Vec<Uuid>> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(Vec::new());
    }
    repository::find_ids_by_name(name, 2).await
}
