/// Идентификация use case для логов и документации API
pub trait UseCaseMetadata {
    /// Индекс, например "u501"
    fn usecase_index() -> &'static str;

    /// Техническое имя, например "import_components_csv"
    fn usecase_name() -> &'static str;

    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// "u501_import_components_csv"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
