use async_trait::async_trait;
use contracts::domain::a003_component::aggregate::{
    ComponentOwner, CreateComponentRequest, OwnerType, DEFAULT_UNIT,
};
use contracts::usecases::u501_import_components_csv::{ImportError, ImportRow};
use uuid::Uuid;

/// Поиск владельцев по ссылкам из файла (только чтение)
#[async_trait]
pub trait OwnerLookup: Send + Sync {
    /// Живые поставщики с таким именем, старшие первыми. Имена не уникальны,
    /// достаточно вернуть не больше двух.
    async fn find_supplier_ids_by_name(&self, name: &str) -> anyhow::Result<Vec<Uuid>>;

    /// Код места хранения уникален среди живых записей
    async fn find_storage_location_id_by_code(&self, code: &str) -> anyhow::Result<Option<Uuid>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberError {
    NotANumber,
    Negative,
    NotWhole,
}

impl NumberError {
    fn describe(self, label: &str, raw: &str) -> String {
        match self {
            NumberError::NotANumber => format!("{} must be a number, got '{}'", label, raw),
            NumberError::Negative => format!("{} must not be negative, got '{}'", label, raw),
            NumberError::NotWhole => format!("{} must be a whole number, got '{}'", label, raw),
        }
    }
}

/// Неотрицательное десятичное число; допускается десятичная запятая
fn parse_amount(raw: &str) -> Result<f64, NumberError> {
    let value: f64 = raw
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| NumberError::NotANumber)?;
    if !value.is_finite() {
        return Err(NumberError::NotANumber);
    }
    if value < 0.0 {
        return Err(NumberError::Negative);
    }
    Ok(value)
}

/// Неотрицательное целое; "12.0" принимается, "12.5" нет
fn parse_count(raw: &str) -> Result<i64, NumberError> {
    if let Ok(value) = raw.trim().parse::<i64>() {
        return if value < 0 {
            Err(NumberError::Negative)
        } else {
            Ok(value)
        };
    }
    let value = parse_amount(raw)?;
    if value.fract() != 0.0 {
        return Err(NumberError::NotWhole);
    }
    if value > i64::MAX as f64 {
        return Err(NumberError::NotANumber);
    }
    Ok(value as i64)
}

/// Правило 3: ровно одна ссылка на владельца, соответствующая `owner_type`,
/// и владелец существует
async fn resolve_owner<L: OwnerLookup + ?Sized>(
    row: &ImportRow,
    owner_type: OwnerType,
    lookup: &L,
) -> Result<ComponentOwner, ImportError> {
    let field = owner_type.owner_field();
    let fail = |message: String| ImportError::for_field(row, field, message);

    if row.supplier_name.is_some() && row.location_code.is_some() {
        return Err(fail(
            "Provide either supplier_name or location_code, not both".to_string(),
        ));
    }

    match owner_type {
        OwnerType::Supplier => {
            let name = row.supplier_name.as_deref().ok_or_else(|| {
                fail("supplier_name is missing for owner_type 'supplier'".to_string())
            })?;
            match lookup.find_supplier_ids_by_name(name).await {
                Ok(ids) => match ids.as_slice() {
                    [] => Err(fail(format!("Supplier '{}' not found", name))),
                    [id] => Ok(ComponentOwner::Supplier(*id)),
                    _ => Err(fail(format!(
                        "Supplier '{}' is ambiguous: several suppliers share this name",
                        name
                    ))),
                },
                Err(e) => {
                    tracing::warn!("Row {}: supplier lookup failed: {}", row.row_number, e);
                    Err(ImportError::new(row, "Failed to look up supplier"))
                }
            }
        }
        OwnerType::StorageLocation => {
            let code = row.location_code.as_deref().ok_or_else(|| {
                fail("location_code is missing for owner_type 'storage_location'".to_string())
            })?;
            match lookup.find_storage_location_id_by_code(code).await {
                Ok(Some(id)) => Ok(ComponentOwner::StorageLocation(id)),
                Ok(None) => Err(fail(format!("Storage location '{}' not found", code))),
                Err(e) => {
                    tracing::warn!(
                        "Row {}: storage location lookup failed: {}",
                        row.row_number,
                        e
                    );
                    Err(ImportError::new(row, "Failed to look up storage location"))
                }
            }
        }
    }
}

/// Проверить строку и превратить её в запрос на создание компонента.
///
/// Правила проверяются в фиксированном порядке, возвращается первая ошибка:
/// форма строки, name, owner_type, ссылка на владельца, quantity, unit_cost,
/// reorder_level.
pub async fn validate_row<L: OwnerLookup + ?Sized>(
    row: &ImportRow,
    lookup: &L,
) -> Result<CreateComponentRequest, ImportError> {
    if let Some(reason) = &row.malformed {
        return Err(ImportError::new(row, format!("Malformed row: {}", reason)));
    }

    let name = row
        .name
        .clone()
        .ok_or_else(|| ImportError::for_field(row, "name", "Name is required"))?;

    let owner_type: OwnerType = match row.owner_type.as_deref() {
        None => {
            return Err(ImportError::for_field(
                row,
                "owner_type",
                "owner_type is required",
            ))
        }
        Some(raw) => raw
            .parse()
            .map_err(|e: String| ImportError::for_field(row, "owner_type", e))?,
    };

    let owner = resolve_owner(row, owner_type, lookup).await?;

    let quantity = match row.quantity.as_deref() {
        None => {
            return Err(ImportError::for_field(
                row,
                "quantity",
                "Quantity is required",
            ))
        }
        Some(raw) => parse_amount(raw)
            .map_err(|e| ImportError::for_field(row, "quantity", e.describe("Quantity", raw)))?,
    };

    let unit_cost = row
        .unit_cost
        .as_ref()
        .map(|raw| {
            parse_amount(raw).map_err(|e| {
                ImportError::for_field(row, "unit_cost", e.describe("Unit cost", raw))
            })
        })
        .transpose()?;

    let reorder_level = row
        .reorder_level
        .as_ref()
        .map(|raw| {
            parse_count(raw).map_err(|e| {
                ImportError::for_field(row, "reorder_level", e.describe("Reorder level", raw))
            })
        })
        .transpose()?;

    Ok(CreateComponentRequest {
        name,
        sku: row.sku.clone(),
        description: row.description.clone(),
        category: row.category.clone(),
        owner,
        quantity,
        unit: row.unit.clone().unwrap_or_else(|| DEFAULT_UNIT.to_string()),
        unit_cost,
        reorder_level,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Поставщики по имени в нижнем регистре, места хранения по коду
    #[derive(Default)]
    pub(crate) struct FakeLookup {
        pub suppliers: HashMap<String, Vec<Uuid>>,
        pub locations: HashMap<String, Uuid>,
        pub broken: bool,
    }

    impl FakeLookup {
        pub fn with_supplier(mut self, name: &str) -> Self {
            self.suppliers
                .entry(name.to_ascii_lowercase())
                .or_default()
                .push(Uuid::new_v4());
            self
        }

        pub fn with_location(mut self, code: &str) -> Self {
            self.locations.insert(code.to_ascii_lowercase(), Uuid::new_v4());
            self
        }
    }

    #[async_trait]
    impl OwnerLookup for FakeLookup {
        async fn find_supplier_ids_by_name(&self, name: &str) -> anyhow::Result<Vec<Uuid>> {
            if self.broken {
                anyhow::bail!("connection reset");
            }
            Ok(self
                .suppliers
                .get(&name.to_ascii_lowercase())
                .cloned()
                .unwrap_or_default())
        }

        async fn find_storage_location_id_by_code(
            &self,
            code: &str,
        ) -> anyhow::Result<Option<Uuid>> {
            if self.broken {
                anyhow::bail!("connection reset");
            }
            Ok(self.locations.get(&code.to_ascii_lowercase()).copied())
        }
    }

    fn supplier_row() -> ImportRow {
        ImportRow {
            row_number: 4,
            name: Some("Bolt M3".into()),
            owner_type: Some("supplier".into()),
            supplier_name: Some("Acme".into()),
            quantity: Some("10".into()),
            ..Default::default()
        }
    }

    async fn rejected(row: &ImportRow, lookup: &FakeLookup) -> ImportError {
        validate_row(row, lookup).await.unwrap_err()
    }

    #[tokio::test]
    async fn test_valid_supplier_row() {
        let lookup = FakeLookup::default().with_supplier("ACME");
        let mut row = supplier_row();
        row.unit_cost = Some("1,25".into());
        row.reorder_level = Some("5".into());

        let request = validate_row(&row, &lookup).await.unwrap();
        assert_eq!(request.name, "Bolt M3");
        assert_eq!(
            request.owner,
            ComponentOwner::Supplier(lookup.suppliers["acme"][0])
        );
        assert_eq!(request.quantity, 10.0);
        assert_eq!(request.unit, DEFAULT_UNIT);
        assert_eq!(request.unit_cost, Some(1.25));
        assert_eq!(request.reorder_level, Some(5));
    }

    #[tokio::test]
    async fn test_valid_location_row() {
        let lookup = FakeLookup::default().with_location("A-01");
        let row = ImportRow {
            owner_type: Some("Storage_Location".into()),
            supplier_name: None,
            location_code: Some("a-01".into()),
            unit: Some("m".into()),
            ..supplier_row()
        };
        let request = validate_row(&row, &lookup).await.unwrap();
        assert_eq!(
            request.owner,
            ComponentOwner::StorageLocation(lookup.locations["a-01"])
        );
        assert_eq!(request.unit, "m");
    }

    #[tokio::test]
    async fn test_malformed_row_is_rejected_without_field() {
        let lookup = FakeLookup::default().with_supplier("Acme");
        let mut row = supplier_row();
        row.malformed = Some("expected 11 columns, found 9".into());
        let err = rejected(&row, &lookup).await;
        assert_eq!(err.row_number, 4);
        assert_eq!(err.error_field, None);
        assert!(err.error_message.contains("expected 11 columns"));
    }

    #[tokio::test]
    async fn test_missing_name() {
        let lookup = FakeLookup::default().with_supplier("Acme");
        let mut row = supplier_row();
        row.name = None;
        assert_eq!(rejected(&row, &lookup).await.error_field.as_deref(), Some("name"));
    }

    #[tokio::test]
    async fn test_bogus_owner_type() {
        let lookup = FakeLookup::default().with_supplier("Acme");
        let mut row = supplier_row();
        row.owner_type = Some("bogus".into());
        let err = rejected(&row, &lookup).await;
        assert_eq!(err.error_field.as_deref(), Some("owner_type"));
        assert!(err.error_message.contains("bogus"));
        assert_eq!(err.row_data, row);
    }

    #[tokio::test]
    async fn test_first_failing_rule_wins() {
        let lookup = FakeLookup::default();
        let mut row = supplier_row();
        row.owner_type = Some("bogus".into());
        row.quantity = Some("abc".into());
        assert_eq!(
            rejected(&row, &lookup).await.error_field.as_deref(),
            Some("owner_type")
        );
    }

    #[tokio::test]
    async fn test_owner_reference_errors() {
        let lookup = FakeLookup::default().with_supplier("Acme");

        let mut missing = supplier_row();
        missing.supplier_name = None;
        let err = rejected(&missing, &lookup).await;
        assert_eq!(err.error_field.as_deref(), Some("supplier_id"));
        assert!(err.error_message.contains("missing"));

        let mut unknown = supplier_row();
        unknown.supplier_name = Some("Globex".into());
        let err = rejected(&unknown, &lookup).await;
        assert_eq!(err.error_field.as_deref(), Some("supplier_id"));
        assert!(err.error_message.contains("not found"));

        let mut both = supplier_row();
        both.location_code = Some("A-01".into());
        let err = rejected(&both, &lookup).await;
        assert_eq!(err.error_field.as_deref(), Some("supplier_id"));
        assert!(err.error_message.contains("not both"));

        let wrong_kind = ImportRow {
            owner_type: Some("storage_location".into()),
            ..supplier_row()
        };
        let err = rejected(&wrong_kind, &lookup).await;
        assert_eq!(err.error_field.as_deref(), Some("storage_location_id"));
        assert!(err.error_message.contains("missing"));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_a_row_error() {
        let lookup = FakeLookup {
            broken: true,
            ..Default::default()
        };
        let err = rejected(&supplier_row(), &lookup).await;
        assert_eq!(err.error_field, None);
        assert_eq!(err.error_message, "Failed to look up supplier");
    }

    #[tokio::test]
    async fn test_quantity_rules() {
        let lookup = FakeLookup::default().with_supplier("Acme");
        let cases = [
            (None, "Quantity is required"),
            (Some("abc"), "Quantity must be a number, got 'abc'"),
            (Some("-3"), "Quantity must not be negative, got '-3'"),
        ];
        for (raw, message) in cases {
            let mut row = supplier_row();
            row.quantity = raw.map(String::from);
            let err = rejected(&row, &lookup).await;
            assert_eq!(err.error_field.as_deref(), Some("quantity"));
            assert_eq!(err.error_message, message);
        }

        let mut whole = supplier_row();
        whole.quantity = Some("12.0".into());
        assert_eq!(validate_row(&whole, &lookup).await.unwrap().quantity, 12.0);
    }

    #[tokio::test]
    async fn test_fractional_quantity() {
        let lookup = FakeLookup::default().with_location("A-01");
        let row = ImportRow {
            name: Some("Cable".into()),
            owner_type: Some("storage_location".into()),
            location_code: Some("A-01".into()),
            quantity: Some("2.5".into()),
            unit: Some("m".into()),
            ..ImportRow::new(1)
        };
        let request = validate_row(&row, &lookup).await.unwrap();
        assert_eq!(request.quantity, 2.5);
        assert_eq!(request.unit, "m");

        let comma = ImportRow {
            quantity: Some("0,75".into()),
            ..row
        };
        assert_eq!(validate_row(&comma, &lookup).await.unwrap().quantity, 0.75);
    }

    #[tokio::test]
    async fn test_ambiguous_supplier_name() {
        let lookup = FakeLookup::default()
            .with_supplier("Acme")
            .with_supplier("ACME");
        let err = rejected(&supplier_row(), &lookup).await;
        assert_eq!(err.error_field.as_deref(), Some("supplier_id"));
        assert!(err.error_message.contains("ambiguous"));
    }

    #[tokio::test]
    async fn test_optional_numbers() {
        let lookup = FakeLookup::default().with_supplier("Acme");

        let mut cost = supplier_row();
        cost.unit_cost = Some("-0.5".into());
        let err = rejected(&cost, &lookup).await;
        assert_eq!(err.error_field.as_deref(), Some("unit_cost"));

        let mut nan = supplier_row();
        nan.unit_cost = Some("NaN".into());
        assert_eq!(
            rejected(&nan, &lookup).await.error_field.as_deref(),
            Some("unit_cost")
        );

        let mut level = supplier_row();
        level.reorder_level = Some("many".into());
        let err = rejected(&level, &lookup).await;
        assert_eq!(err.error_field.as_deref(), Some("reorder_level"));
        assert_eq!(err.error_message, "Reorder level must be a number, got 'many'");
    }

    #[tokio::test]
    async fn test_validation_is_repeatable() {
        let lookup = FakeLookup::default().with_supplier("Acme");
        let good = supplier_row();
        let mut bad = supplier_row();
        bad.quantity = Some("x".into());

        for _ in 0..2 {
            assert_eq!(
                validate_row(&good, &lookup).await.unwrap(),
                validate_row(&good, &lookup).await.unwrap()
            );
            assert_eq!(
                validate_row(&bad, &lookup).await.unwrap_err(),
                validate_row(&bad, &lookup).await.unwrap_err()
            );
        }
    }
}
