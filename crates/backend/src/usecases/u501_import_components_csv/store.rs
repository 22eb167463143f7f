use super::validator::OwnerLookup;
use crate::domain::{a001_supplier, a002_storage_location, a003_component};
use async_trait::async_trait;
use contracts::domain::a003_component::aggregate::CreateComponentRequest;
use uuid::Uuid;

/// Всё, что импорту нужно от остальной системы
#[async_trait]
pub trait ImportStore: OwnerLookup {
    async fn create_component(&self, request: CreateComponentRequest) -> anyhow::Result<Uuid>;
}

/// Хранилище поверх доменных сервисов и глобального подключения к БД
#[derive(Debug, Clone, Copy, Default)]
pub struct DbImportStore;

#[async_trait]
impl OwnerLookup for DbImportStore {
    async fn find_supplier_ids_by_name(&self, name: &str) -> anyhow::Result<Vec<Uuid>> {
        a001_supplier::service::find_ids_by_name(name).await
    }

    async fn find_storage_location_id_by_code(&self, code: &str) -> anyhow::Result<Option<Uuid>> {
        a002_storage_location::service::find_id_by_code(code).await
    }
}

#[async_trait]
impl ImportStore for DbImportStore {
    async fn create_component(&self, request: CreateComponentRequest) -> anyhow::Result<Uuid> {
        a003_component::service::create_from_request(request).await
    }
}
