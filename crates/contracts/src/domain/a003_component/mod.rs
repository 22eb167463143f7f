pub mod aggregate;
pub mod list;

pub use aggregate::{
    Component, ComponentDto, ComponentId, ComponentOwner, CreateComponentRequest, OwnerType,
};
pub use list::{ComponentListParams, ComponentPage, ComponentSortField};
