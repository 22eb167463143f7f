//! u501: массовое создание компонентов из загруженного CSV.
//!
//! байты -> [`parser`] -> строки -> [`validator`] (по строке) ->
//! [`executor`] (сохранение, подсчёт) -> [`reporter`] -> `ImportResult`.

pub mod cancellation;
pub mod executor;
pub mod parser;
pub mod reporter;
pub mod store;
pub mod validator;

pub use cancellation::ImportCancellation;
pub use executor::{run_import, ImportExecutor, ImportFailure};
pub use parser::FileDecodeError;
pub use store::{DbImportStore, ImportStore};
pub use validator::OwnerLookup;
