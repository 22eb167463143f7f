use super::repository;
use crate::domain::{a001_supplier, a002_storage_location};
use crate::shared::error::DomainError;
use contracts::domain::a003_component::aggregate::{
    Component, ComponentDto, ComponentOwner, CreateComponentRequest, OwnerType, DEFAULT_UNIT,
};
use contracts::domain::a003_component::list::{ComponentListParams, ComponentPage};
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: u64 = 100;

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_owner_id(value: Option<&String>, field: &str) -> anyhow::Result<Option<Uuid>> {
    match value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => Uuid::parse_str(v)
            .map(Some)
            .map_err(|_| DomainError::Validation(format!("{} is not a valid id", field)).into()),
    }
}

/// Сверить id владельца в DTO с owner_type и проверить, что поставщик
/// или место хранения существует
async fn resolve_owner(dto: &ComponentDto) -> anyhow::Result<ComponentOwner> {
    let supplier_id = parse_owner_id(dto.supplier_id.as_ref(), "supplier_id")?;
    let location_id = parse_owner_id(dto.storage_location_id.as_ref(), "storage_location_id")?;

    match (dto.owner_type, supplier_id, location_id) {
        (OwnerType::Supplier, Some(id), None) => {
            let live = a001_supplier::service::get_by_id(id)
                .await?
                .map_or(false, |s| !s.base.metadata.is_deleted);
            if !live {
                return Err(DomainError::Validation(format!("supplier {} not found", id)).into());
            }
            Ok(ComponentOwner::Supplier(id))
        }
        (OwnerType::StorageLocation, None, Some(id)) => {
            let live = a002_storage_location::service::get_by_id(id)
                .await?
                .map_or(false, |l| !l.base.metadata.is_deleted);
            if !live {
                return Err(
                    DomainError::Validation(format!("storage location {} not found", id)).into(),
                );
            }
            Ok(ComponentOwner::StorageLocation(id))
        }
        (owner_type, _, _) => Err(DomainError::Validation(format!(
            "a component owned by a {} needs exactly one owner reference: {}",
            owner_type,
            owner_type.owner_field()
        ))
        .into()),
    }
}

async fn request_from_dto(dto: ComponentDto) -> anyhow::Result<CreateComponentRequest> {
    let owner = resolve_owner(&dto).await?;
    Ok(CreateComponentRequest {
        name: dto.name.trim().to_string(),
        sku: trimmed(dto.sku),
        description: trimmed(dto.description),
        category: trimmed(dto.category),
        owner,
        quantity: dto.quantity,
        unit: trimmed(dto.unit).unwrap_or_else(|| DEFAULT_UNIT.to_string()),
        unit_cost: dto.unit_cost,
        reorder_level: dto.reorder_level,
    })
}

async fn ensure_sku_is_free(sku: Option<&str>, own_id: Option<Uuid>) -> anyhow::Result<()> {
    if let Some(sku) = sku {
        if let Some(existing) = repository::find_id_by_sku(sku).await? {
            if Some(existing) != own_id {
                return Err(
                    DomainError::Validation(format!("SKU '{}' already exists", sku)).into(),
                );
            }
        }
    }
    Ok(())
}

/// Создать компонент из уже нормализованных полей.
/// Существование владельца не перепроверяется.
pub async fn create_from_request(request: CreateComponentRequest) -> anyhow::Result<Uuid> {
    let mut aggregate = Component::new_for_insert(request);

    aggregate.validate().map_err(DomainError::Validation)?;
    ensure_sku_is_free(aggregate.sku.as_deref(), None).await?;
    aggregate.before_write();

    repository::insert(&aggregate).await
}

pub async fn create(dto: ComponentDto) -> anyhow::Result<Uuid> {
    let request = request_from_dto(dto).await?;
    let id = create_from_request(request).await?;
    tracing::info!("Component {} created", id);
    Ok(id)
}

pub async fn update(dto: ComponentDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| DomainError::Validation("invalid id".into()))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .filter(|c| !c.base.metadata.is_deleted)
        .ok_or_else(|| DomainError::NotFound(id.to_string()))?;

    let request = request_from_dto(dto).await?;
    aggregate.apply(request);

    aggregate.validate().map_err(DomainError::Validation)?;
    ensure_sku_is_free(aggregate.sku.as_deref(), Some(id)).await?;
    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Component>> {
    repository::get_by_id(id).await
}

pub async fn list_paginated(params: &ComponentListParams) -> anyhow::Result<ComponentPage> {
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(10, 10000);
    let offset = params.offset.unwrap_or(0);

    let (items, total) = repository::list_paginated(params, limit, offset).await?;
    Ok(ComponentPage::new(items, total, limit, offset))
}
