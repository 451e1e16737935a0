//! Upload parsing
//!
//! Turns an uploaded spreadsheet into `Vec<HashMap<String, String>>`, one map
//! per data row keyed by normalized header name. Excel files are read with
//! calamine, CSV with the csv crate; blank rows are skipped.

use crate::error::AppError;
use calamine::{Data, Range, Reader, Xls, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Cursor;

/// A parsed data row, keyed by normalized header
pub type RawRecord = HashMap<String, String>;

/// Normalize a column header: trim, lowercase, spaces to underscores,
/// Spanish accents folded (the originals come from hand-edited sheets)
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' => '_',
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Parse an uploaded spreadsheet by file extension
///
/// Supported: `.xlsx`, `.xls`, `.csv`. Anything else is rejected with a
/// validation error, mirroring the original endpoint.
pub fn parse_upload(filename: &str, bytes: &[u8]) -> Result<Vec<RawRecord>, AppError> {
    let ext = filename
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "xlsx" => {
            let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
                .map_err(|e| AppError::Spreadsheet(e.to_string()))?;
            let sheet_name = first_sheet_name(workbook.sheet_names())?;
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| AppError::Spreadsheet(e.to_string()))?;
            range_to_records(&range)
        }
        "xls" => {
            let mut workbook: Xls<_> = Xls::new(Cursor::new(bytes))
                .map_err(|e| AppError::Spreadsheet(e.to_string()))?;
            let sheet_name = first_sheet_name(workbook.sheet_names())?;
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| AppError::Spreadsheet(e.to_string()))?;
            range_to_records(&range)
        }
        "csv" => parse_csv(bytes),
        other => Err(AppError::Validation(format!(
            "Formato inválido: .{other}. Use .xlsx, .xls o .csv"
        ))),
    }
}

fn first_sheet_name(sheet_names: Vec<String>) -> Result<String, AppError> {
    sheet_names
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Spreadsheet("El archivo no tiene hojas".to_string()))
}

/// Convert a cell range into records, first row taken as headers
fn range_to_records(range: &Range<Data>) -> Result<Vec<RawRecord>, AppError> {
    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| AppError::Spreadsheet("El archivo no tiene filas".to_string()))?;

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| normalize_header(&cell.to_string()))
        .collect();

    let mut records = Vec::new();
    for data_row in rows {
        let mut row_map = HashMap::new();

        for (col_idx, cell) in data_row.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                let value = cell.to_string().trim().to_string();
                row_map.insert(header.clone(), value);
            }
        }

        // Skip completely blank rows
        if row_map.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(row_map);
    }

    Ok(records)
}

/// Parse CSV bytes with the same record shape as the Excel path
fn parse_csv(bytes: &[u8]) -> Result<Vec<RawRecord>, AppError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Spreadsheet(e.to_string()))?
        .iter()
        .map(normalize_header)
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::Spreadsheet(e.to_string()))?;
        let mut row_map = HashMap::new();

        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row_map.insert(header.clone(), value.trim().to_string());
            }
        }

        if row_map.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(row_map);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header_folds_accents_and_spaces() {
        assert_eq!(normalize_header("  Nombre Acción "), "nombre_accion");
        assert_eq!(normalize_header("Descripción"), "descripcion");
        assert_eq!(normalize_header("AÑO"), "ano");
    }

    #[test]
    fn test_parse_csv_basic() {
        let csv = b"Nombre Accion,Monto\nTaller lector,1000\nSalida pedagogica,2500\n";
        let records = parse_upload("plan.csv", csv).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].get("nombre_accion"),
            Some(&"Taller lector".to_string())
        );
        assert_eq!(records[1].get("monto"), Some(&"2500".to_string()));
    }

    #[test]
    fn test_parse_csv_skips_blank_rows() {
        let csv = b"a,b\n1,2\n,\n3,4\n";
        let records = parse_upload("data.csv", csv).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_upload_rejects_unknown_extension() {
        let result = parse_upload("notas.pdf", b"%PDF");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_xlsx_roundtrip() {
        // Build a workbook with the export writer, then read it back
        let headers = vec!["nombre_accion".to_string(), "monto".to_string()];
        let rows = vec![
            vec![
                serde_json::json!("Taller lector"),
                serde_json::json!(1500),
            ],
            vec![serde_json::json!("Biblioteca"), serde_json::json!(0)],
        ];
        let bytes = crate::spreadsheet::rows_to_xlsx("Hoja", &headers, &rows).unwrap();

        let records = parse_upload("export.xlsx", &bytes).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].get("nombre_accion"),
            Some(&"Taller lector".to_string())
        );
        assert_eq!(records[0].get("monto"), Some(&"1500".to_string()));
    }
}
