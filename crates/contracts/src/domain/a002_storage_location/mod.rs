pub mod aggregate;

pub use aggregate::{StorageLocation, StorageLocationDto, StorageLocationId};
