use super::EntityMetadata;

/// Корень агрегата: доступ к экземпляру и статические метаданные имён
pub trait AggregateRoot {
    type Id;

    // ============================================================================
    // Методы экземпляра
    // ============================================================================

    fn id(&self) -> Self::Id;

    fn code(&self) -> &str;

    fn description(&self) -> &str;

    fn metadata(&self) -> &EntityMetadata;

    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    // ============================================================================
    // Метаданные класса агрегата
    // ============================================================================

    /// Индекс агрегата в системе, например "a003"
    fn aggregate_index() -> &'static str;

    /// Имя коллекции, например "component"
    fn collection_name() -> &'static str;

    fn element_name() -> &'static str;

    fn list_name() -> &'static str;

    /// Полное имя, например "a003_component", оно же имя таблицы
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }
}
