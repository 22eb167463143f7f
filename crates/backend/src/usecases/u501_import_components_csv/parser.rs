use contracts::usecases::u501_import_components_csv::{ImportRow, CSV_COLUMNS, REQUIRED_COLUMNS};
use thiserror::Error;

/// Файл непригоден целиком, ни одна строка не обрабатывается
#[derive(Debug, Error)]
pub enum FileDecodeError {
    #[error("File is empty")]
    Empty,

    #[error("File is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Cannot read CSV header: {0}")]
    Header(String),

    #[error("CSV header is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Для каждой позиции заголовка известная колонка, если есть.
/// Неизвестные и повторные заголовки дают `None`.
fn column_layout(headers: &csv::StringRecord) -> Vec<Option<&'static str>> {
    let mut seen: Vec<&'static str> = Vec::new();
    headers
        .iter()
        .map(|header| {
            let header = header.trim().to_ascii_lowercase();
            let column = CSV_COLUMNS.iter().copied().find(|c| *c == header)?;
            if seen.contains(&column) {
                return None;
            }
            seen.push(column);
            Some(column)
        })
        .collect()
}

/// Разбить байты CSV на строки с номерами 1..N в порядке файла.
///
/// Строки из одних пустых ячеек пропускаются и номер не занимают.
/// Строка с неверным числом ячеек всё равно становится строкой импорта с
/// пометкой `malformed` и отклоняется отдельно.
pub fn parse_rows(content: &[u8]) -> Result<Vec<ImportRow>, FileDecodeError> {
    let text = std::str::from_utf8(content)?;
    let text = text.trim_start_matches('\u{FEFF}');
    if text.trim().is_empty() {
        return Err(FileDecodeError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FileDecodeError::Header(e.to_string()))?
        .clone();
    let layout = column_layout(&headers);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !layout.contains(&Some(**required)))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(FileDecodeError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let row_number = rows.len() + 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("CSV line for row {} is unreadable: {}", row_number, e);
                let mut row = ImportRow::new(row_number);
                row.malformed = Some(format!("unreadable line: {}", e));
                rows.push(row);
                continue;
            }
        };

        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let mut row = ImportRow::new(row_number);
        for (value, column) in record.iter().zip(layout.iter()) {
            if let Some(slot) = column.and_then(|c| row.field_mut(c)) {
                if !value.is_empty() {
                    *slot = Some(value.to_string());
                }
            }
        }
        if record.len() != headers.len() {
            row.malformed = Some(format!(
                "expected {} columns, found {}",
                headers.len(),
                record.len()
            ));
        }
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "name,sku,description,category,owner_type,supplier_name,location_code,quantity,unit,unit_cost,reorder_level";

    #[test]
    fn test_rows_keep_file_order_and_numbering() {
        let csv = format!(
            "{HEADER}\n\
             Bolt M3,B-M3,,Fasteners,supplier,Acme,,100,pcs,0.05,20\n\
             Nut M3,,,Fasteners,storage_location,,A-01,250,,,\n"
        );
        let rows = parse_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].row_number, 1);
        assert_eq!(rows[0].name.as_deref(), Some("Bolt M3"));
        assert_eq!(rows[0].sku.as_deref(), Some("B-M3"));
        assert_eq!(rows[0].description, None);
        assert_eq!(rows[0].supplier_name.as_deref(), Some("Acme"));
        assert_eq!(rows[0].unit_cost.as_deref(), Some("0.05"));
        assert_eq!(rows[0].malformed, None);

        assert_eq!(rows[1].row_number, 2);
        assert_eq!(rows[1].location_code.as_deref(), Some("A-01"));
        assert_eq!(rows[1].unit, None);
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let rows = parse_rows(format!("{HEADER}\n").as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_columns_are_matched_by_name() {
        let csv = "Quantity , OWNER_TYPE,name,colour\n7,supplier,Washer,red\n";
        let rows = parse_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].quantity.as_deref(), Some("7"));
        assert_eq!(rows[0].owner_type.as_deref(), Some("supplier"));
        assert_eq!(rows[0].name.as_deref(), Some("Washer"));
        assert_eq!(rows[0].malformed, None);
    }

    #[test]
    fn test_short_line_is_marked_malformed() {
        let csv = "name,owner_type,quantity\nWasher,supplier\nSpring,supplier,3\n";
        let rows = parse_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].malformed.as_deref(),
            Some("expected 3 columns, found 2")
        );
        assert_eq!(rows[0].name.as_deref(), Some("Washer"));
        assert_eq!(rows[1].row_number, 2);
        assert_eq!(rows[1].malformed, None);
    }

    #[test]
    fn test_blank_lines_do_not_consume_row_numbers() {
        let csv = "name,owner_type,quantity\nA,supplier,1\n,,\n\nB,supplier,2\n";
        let rows = parse_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name.as_deref(), Some("B"));
        assert_eq!(rows[1].row_number, 2);
    }

    #[test]
    fn test_bom_and_quoted_cells() {
        let csv = "\u{FEFF}name,owner_type,quantity,description\n\"Bolt, long\",supplier,5,\"says \"\"hi\"\"\"\n";
        let rows = parse_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].name.as_deref(), Some("Bolt, long"));
        assert_eq!(rows[0].description.as_deref(), Some("says \"hi\""));
    }

    #[test]
    fn test_empty_input_is_fatal() {
        assert!(matches!(parse_rows(b""), Err(FileDecodeError::Empty)));
        assert!(matches!(parse_rows(b"  \n\n"), Err(FileDecodeError::Empty)));
        assert!(matches!(
            parse_rows("\u{FEFF}".as_bytes()),
            Err(FileDecodeError::Empty)
        ));
    }

    #[test]
    fn test_invalid_utf8_is_fatal() {
        let bytes = [0x6e, 0x61, 0x6d, 0x65, 0x0a, 0xff, 0xfe, 0x00, 0xc3];
        assert!(matches!(parse_rows(&bytes), Err(FileDecodeError::Encoding(_))));
    }

    #[test]
    fn test_missing_required_columns_are_fatal() {
        let err = parse_rows(b"name,sku\nBolt,B1\n").unwrap_err();
        match err {
            FileDecodeError::MissingColumns(columns) => {
                assert_eq!(columns, vec!["owner_type".to_string(), "quantity".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
