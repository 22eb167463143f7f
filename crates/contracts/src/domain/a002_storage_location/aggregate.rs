use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageLocationId(pub Uuid);

impl StorageLocationId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for StorageLocationId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(StorageLocationId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Стеллаж, ячейка или помещение. `base.code` это код места для импорта CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageLocation {
    #[serde(flatten)]
    pub base: BaseAggregate<StorageLocationId>,

    #[serde(default)]
    pub zone: Option<String>,
}

impl StorageLocation {
    pub fn new_for_insert(
        code: String,
        description: String,
        zone: Option<String>,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::new(StorageLocationId::new_v4(), code, description);
        base.comment = comment;

        Self { base, zone }
    }

    pub fn location_code(&self) -> &str {
        &self.base.code
    }

    pub fn update(&mut self, dto: &StorageLocationDto) {
        self.base.code = dto.code.clone();
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.zone = dto.zone.clone();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.code.trim().is_empty() {
            return Err("Location code must not be empty".into());
        }
        if self.base.description.trim().is_empty() {
            return Err("Location name must not be empty".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for StorageLocation {
    type Id = StorageLocationId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "storage_location"
    }

    fn element_name() -> &'static str {
        "Storage location"
    }

    fn list_name() -> &'static str {
        "Storage locations"
    }
}

// ============================================================================
// DTO
// ============================================================================

/// Код места обязателен, в отличие от кода поставщика, который генерируется
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageLocationDto {
    pub id: Option<String>,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub zone: Option<String>,
}
