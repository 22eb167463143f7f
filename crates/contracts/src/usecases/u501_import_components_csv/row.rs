use serde::{Deserialize, Serialize};

/// Заголовок файла импорта в порядке шаблона
pub const CSV_COLUMNS: [&str; 11] = [
    "name",
    "sku",
    "description",
    "category",
    "owner_type",
    "supplier_name",
    "location_code",
    "quantity",
    "unit",
    "unit_cost",
    "reorder_level",
];

/// Колонки, без которых ни одна строка не пройдёт проверку
pub const REQUIRED_COLUMNS: [&str; 3] = ["name", "owner_type", "quantity"];

/// Одна строка данных файла импорта, как текст.
///
/// Значения без пробелов по краям, пустые ячейки `None`. Приведения типов нет:
/// `owner_type` и числовые колонки хранят исходный текст, чтобы отклонённая
/// строка вернулась без изменений.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    /// 1-based position among the data lines
    pub row_number: usize,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub owner_type: Option<String>,
    pub supplier_name: Option<String>,
    pub location_code: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub unit_cost: Option<String>,
    pub reorder_level: Option<String>,
    /// Строку не удалось разбить на колонки заголовка
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub malformed: Option<String>,
}

impl ImportRow {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            ..Default::default()
        }
    }

    /// Ячейка для колонки из [`CSV_COLUMNS`]; `None` для неизвестных имён
    pub fn field_mut(&mut self, column: &str) -> Option<&mut Option<String>> {
        let slot = match column {
            "name" => &mut self.name,
            "sku" => &mut self.sku,
            "description" => &mut self.description,
            "category" => &mut self.category,
            "owner_type" => &mut self.owner_type,
            "supplier_name" => &mut self.supplier_name,
            "location_code" => &mut self.location_code,
            "quantity" => &mut self.quantity,
            "unit" => &mut self.unit,
            "unit_cost" => &mut self.unit_cost,
            "reorder_level" => &mut self.reorder_level,
            _ => return None,
        };
        Some(slot)
    }
}
