use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Единица измерения, если при создании не указана
pub const DEFAULT_UNIT: &str = "pcs";

// ============================================================================
// ID Type
// ============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub Uuid);

impl ComponentId {
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

impl AggregateId for ComponentId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ComponentId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Owner
// ============================================================================

/// Владелец компонента: поставщик или место хранения, но не оба сразу
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerType {
    Supplier,
    StorageLocation,
}

impl OwnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerType::Supplier => "supplier",
            OwnerType::StorageLocation => "storage_location",
        }
    }

    /// Имя атрибута id, в котором ссылка на владельца
    pub fn owner_field(&self) -> &'static str {
        match self {
            OwnerType::Supplier => "supplier_id",
            OwnerType::StorageLocation => "storage_location_id",
        }
    }
}

impl std::fmt::Display for OwnerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OwnerType {
    type Err = String;

    /// Без учёта регистра и пробелов по краям
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supplier" => Ok(OwnerType::Supplier),
            "storage_location" => Ok(OwnerType::StorageLocation),
            other => Err(format!(
                "owner_type must be 'supplier' or 'storage_location', got '{}'",
                other
            )),
        }
    }
}

/// Найденная ссылка на владельца
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentOwner {
    Supplier(Uuid),
    StorageLocation(Uuid),
}

impl ComponentOwner {
    pub fn owner_type(&self) -> OwnerType {
        match self {
            ComponentOwner::Supplier(_) => OwnerType::Supplier,
            ComponentOwner::StorageLocation(_) => OwnerType::StorageLocation,
        }
    }

    pub fn supplier_id(&self) -> Option<Uuid> {
        match self {
            ComponentOwner::Supplier(id) => Some(*id),
            ComponentOwner::StorageLocation(_) => None,
        }
    }

    pub fn storage_location_id(&self) -> Option<Uuid> {
        match self {
            ComponentOwner::Supplier(_) => None,
            ComponentOwner::StorageLocation(id) => Some(*id),
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Складской компонент. `base.description` это наименование,
/// `base.code` это SKU или сгенерированный код, если SKU не задан.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    #[serde(flatten)]
    pub base: BaseAggregate<ComponentId>,

    pub sku: Option<String>,

    pub full_description: Option<String>,

    pub category: Option<String>,

    pub owner_type: OwnerType,

    pub supplier_id: Option<String>,

    pub storage_location_id: Option<String>,

    pub quantity: f64,

    pub unit: String,

    pub unit_cost: Option<f64>,

    pub reorder_level: Option<i64>,
}

impl Component {
    pub fn new_for_insert(request: CreateComponentRequest) -> Self {
        let code = request
            .sku
            .clone()
            .unwrap_or_else(|| format!("CMP-{}", &Uuid::new_v4().simple().to_string()[..8]));
        let base = BaseAggregate::new(ComponentId::new_v4(), code, request.name);

        Self {
            base,
            sku: request.sku,
            full_description: request.description,
            category: request.category,
            owner_type: request.owner.owner_type(),
            supplier_id: request.owner.supplier_id().map(|id| id.to_string()),
            storage_location_id: request.owner.storage_location_id().map(|id| id.to_string()),
            quantity: request.quantity,
            unit: request.unit,
            unit_cost: request.unit_cost,
            reorder_level: request.reorder_level,
        }
    }

    pub fn name(&self) -> &str {
        &self.base.description
    }

    /// Заменить все редактируемые поля; id и метаданные сохраняются
    pub fn apply(&mut self, request: CreateComponentRequest) {
        if let Some(sku) = &request.sku {
            self.base.code = sku.clone();
        }
        self.base.description = request.name;
        self.sku = request.sku;
        self.full_description = request.description;
        self.category = request.category;
        self.owner_type = request.owner.owner_type();
        self.supplier_id = request.owner.supplier_id().map(|id| id.to_string());
        self.storage_location_id = request.owner.storage_location_id().map(|id| id.to_string());
        self.quantity = request.quantity;
        self.unit = request.unit;
        self.unit_cost = request.unit_cost;
        self.reorder_level = request.reorder_level;
    }

    pub fn is_low_stock(&self) -> bool {
        self.reorder_level
            .map_or(false, |level| self.quantity <= level as f64)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Component name must not be empty".into());
        }
        if self.quantity < 0.0 || !self.quantity.is_finite() {
            return Err("Quantity must be a non-negative number".into());
        }
        if self.unit_cost.map_or(false, |c| c < 0.0 || !c.is_finite()) {
            return Err("Unit cost must be a non-negative number".into());
        }
        if self.reorder_level.map_or(false, |r| r < 0) {
            return Err("Reorder level must not be negative".into());
        }
        match (
            self.owner_type,
            self.supplier_id.is_some(),
            self.storage_location_id.is_some(),
        ) {
            (OwnerType::Supplier, true, false) | (OwnerType::StorageLocation, false, true) => Ok(()),
            (owner_type, _, _) => Err(format!(
                "Component owned by a {} must reference exactly one {}",
                owner_type,
                owner_type.owner_field()
            )),
        }
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for Component {
    type Id = ComponentId;

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
        "a003"
    }

    fn collection_name() -> &'static str {
        "component"
    }

    fn element_name() -> &'static str {
        "Component"
    }

    fn list_name() -> &'static str {
        "Components"
    }
}

// ============================================================================
// Requests / DTO
// ============================================================================

/// Нормализованные типизированные поля для создания компонента
#[derive(Debug, Clone, PartialEq)]
pub struct CreateComponentRequest {
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub owner: ComponentOwner,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: Option<f64>,
    pub reorder_level: Option<i64>,
}

/// Тело `POST /api/component`; без `id` создаёт новый
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDto {
    pub id: Option<String>,
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub owner_type: OwnerType,
    pub supplier_id: Option<String>,
    pub storage_location_id: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    pub unit: Option<String>,
    pub unit_cost: Option<f64>,
    pub reorder_level: Option<i64>,
}
