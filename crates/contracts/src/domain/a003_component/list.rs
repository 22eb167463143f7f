use super::aggregate::{Component, OwnerType};
use serde::{Deserialize, Serialize};

/// Query string для `GET /api/component`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentListParams {
    /// Подстрока имени или SKU без учёта регистра
    pub search: Option<String>,
    pub category: Option<String>,
    pub owner_type: Option<OwnerType>,
    pub supplier_id: Option<String>,
    pub storage_location_id: Option<String>,
    /// Только компоненты на уровне дозаказа или ниже
    #[serde(default)]
    pub low_stock: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub sort_by: Option<ComponentSortField>,
    pub sort_desc: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentSortField {
    #[default]
    Name,
    Sku,
    Quantity,
    Category,
    CreatedAt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentPage {
    pub items: Vec<Component>,
    pub total: u64,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl ComponentPage {
    pub fn new(items: Vec<Component>, total: u64, limit: u64, offset: u64) -> Self {
        let page_size = limit.max(1) as usize;
        let page = (offset as usize) / page_size;
        let total_pages = (total as usize + page_size - 1) / page_size;
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}
