pub mod a001_supplier;
pub mod a002_storage_location;
pub mod a003_component;
pub mod health;
pub mod usecases;
