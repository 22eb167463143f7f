pub mod result;
pub mod row;

pub use result::{ImportError, ImportResult};
pub use row::{ImportRow, CSV_COLUMNS, REQUIRED_COLUMNS};

use crate::usecases::common::UseCaseMetadata;

pub struct ImportComponentsCsv;

impl UseCaseMetadata for ImportComponentsCsv {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "import_components_csv"
    }

    fn display_name() -> &'static str {
        "Import components from CSV"
    }

    fn description() -> &'static str {
        "Creates one component per valid CSV row and reports per-row errors"
    }
}
