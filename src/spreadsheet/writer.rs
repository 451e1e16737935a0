//! Export serialization
//!
//! Builds xlsx downloads from tabular rows. Cells arrive as JSON values so
//! the flattening code can mix text and amounts without a cell enum of its
//! own; numbers are written as numbers, everything else as text.

use crate::error::AppError;
use rust_xlsxwriter::Workbook;
use serde_json::Value;

/// Serialize headers plus rows into xlsx bytes
///
/// Row cells beyond the header width are ignored; missing cells stay blank.
pub fn rows_to_xlsx(
    sheet_name: &str,
    headers: &[String],
    rows: &[Vec<Value>],
) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name)
        .map_err(|e| AppError::Spreadsheet(e.to_string()))?;

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, header)
            .map_err(|e| AppError::Spreadsheet(e.to_string()))?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate().take(headers.len()) {
            let col_num = col as u16;
            match cell {
                Value::Number(n) => {
                    let num = n.as_f64().unwrap_or(0.0);
                    worksheet
                        .write_number(row_num, col_num, num)
                        .map_err(|e| AppError::Spreadsheet(e.to_string()))?;
                }
                Value::Null => {}
                Value::String(s) => {
                    worksheet
                        .write_string(row_num, col_num, s)
                        .map_err(|e| AppError::Spreadsheet(e.to_string()))?;
                }
                other => {
                    worksheet
                        .write_string(row_num, col_num, &other.to_string())
                        .map_err(|e| AppError::Spreadsheet(e.to_string()))?;
                }
            }
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| AppError::Spreadsheet(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_to_xlsx_produces_zip_container() {
        let headers = vec!["a".to_string(), "b".to_string()];
        let rows = vec![vec![json!("x"), json!(1)]];
        let bytes = rows_to_xlsx("Hoja", &headers, &rows).unwrap();

        // xlsx files are zip archives
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_rows_to_xlsx_empty_rows_ok() {
        let headers = vec!["solo_encabezado".to_string()];
        let bytes = rows_to_xlsx("Hoja", &headers, &[]).unwrap();
        assert!(!bytes.is_empty());
    }
}
