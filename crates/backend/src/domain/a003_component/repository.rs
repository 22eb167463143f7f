use chrono::Utc;
use contracts::domain::a003_component::aggregate::{Component, ComponentId, OwnerType};
use contracts::domain::a003_component::list::{ComponentListParams, ComponentSortField};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_component")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub sku: Option<String>,
    pub full_description: Option<String>,
    pub category: Option<String>,
    pub owner_type: String,
    pub supplier_id: Option<String>,
    pub storage_location_id: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: Option<f64>,
    pub reorder_level: Option<i64>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Component {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        // CHECK таблицы держит owner_type корректным, иначе берём заполненный id
        let owner_type = m.owner_type.parse().unwrap_or(if m.supplier_id.is_some() {
            OwnerType::Supplier
        } else {
            OwnerType::StorageLocation
        });

        Component {
            base: BaseAggregate::with_metadata(
                ComponentId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            sku: m.sku,
            full_description: m.full_description,
            category: m.category,
            owner_type,
            supplier_id: m.supplier_id,
            storage_location_id: m.storage_location_id,
            quantity: m.quantity,
            unit: m.unit,
            unit_cost: m.unit_cost,
            reorder_level: m.reorder_level,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn lower(column: Column) -> Expr {
    Expr::expr(Func::lower(Expr::col(column)))
}

/// Неудалённые компоненты по фильтрам списка, без сортировки
fn filtered(params: &ComponentListParams) -> Select<Entity> {
    let mut query = Entity::find().filter(Column::IsDeleted.eq(false));

    if let Some(search) = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_ascii_lowercase());
        query = query.filter(
            Condition::any()
                .add(lower(Column::Description).like(pattern.clone()))
                .add(lower(Column::Sku).like(pattern)),
        );
    }
    if let Some(category) = params.category.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        query = query.filter(lower(Column::Category).eq(category.to_ascii_lowercase()));
    }
    if let Some(owner_type) = params.owner_type {
        query = query.filter(Column::OwnerType.eq(owner_type.as_str()));
    }
    if let Some(supplier_id) = &params.supplier_id {
        query = query.filter(Column::SupplierId.eq(supplier_id.clone()));
    }
    if let Some(location_id) = &params.storage_location_id {
        query = query.filter(Column::StorageLocationId.eq(location_id.clone()));
    }
    if params.low_stock {
        query = query
            .filter(Column::ReorderLevel.is_not_null())
            .filter(Expr::col(Column::Quantity).lte(Expr::col(Column::ReorderLevel)));
    }

    query
}

pub async fn list_paginated(
    params: &ComponentListParams,
    limit: u64,
    offset: u64,
) -> anyhow::Result<(Vec<Component>, u64)> {
    let total = filtered(params).count(conn()).await?;

    let order = if params.sort_desc.unwrap_or(false) {
        Order::Desc
    } else {
        Order::Asc
    };
    let sort_column = match params.sort_by.unwrap_or_default() {
        ComponentSortField::Name => Column::Description,
        ComponentSortField::Sku => Column::Sku,
        ComponentSortField::Quantity => Column::Quantity,
        ComponentSortField::Category => Column::Category,
        ComponentSortField::CreatedAt => Column::CreatedAt,
    };

    let items = filtered(params)
        .order_by(sort_column, order)
        .order_by_asc(Column::Id)
        .limit(limit)
        .offset(offset)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok((items, total))
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Component>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(Into::into))
}

/// Id неудалённого компонента с этим SKU
pub async fn find_id_by_sku(sku: &str) -> anyhow::Result<Option<Uuid>> {
    let found = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::Sku.eq(sku))
        .one(conn())
        .await?;
    Ok(found.and_then(|m| Uuid::parse_str(&m.id).ok()))
}

pub async fn insert(aggregate: &Component) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        sku: Set(aggregate.sku.clone()),
        full_description: Set(aggregate.full_description.clone()),
        category: Set(aggregate.category.clone()),
        owner_type: Set(aggregate.owner_type.as_str().to_string()),
        supplier_id: Set(aggregate.supplier_id.clone()),
        storage_location_id: Set(aggregate.storage_location_id.clone()),
        quantity: Set(aggregate.quantity),
        unit: Set(aggregate.unit.clone()),
        unit_cost: Set(aggregate.unit_cost),
        reorder_level: Set(aggregate.reorder_level),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    };
    active.insert(conn()).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &Component) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        sku: Set(aggregate.sku.clone()),
        full_description: Set(aggregate.full_description.clone()),
        category: Set(aggregate.category.clone()),
        owner_type: Set(aggregate.owner_type.as_str().to_string()),
        supplier_id: Set(aggregate.supplier_id.clone()),
        storage_location_id: Set(aggregate.storage_location_id.clone()),
        quantity: Set(aggregate.quantity),
        unit: Set(aggregate.unit.clone()),
        unit_cost: Set(aggregate.unit_cost),
        reorder_level: Set(aggregate.reorder_level),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
        created_at: sea_orm::ActiveValue::NotSet,
    };
    active.update(conn()).await?;
    Ok(())
}

pub async fn soft_delete(id: Uuid) -> anyhow::Result<bool> {
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}
