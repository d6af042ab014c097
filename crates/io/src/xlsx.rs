// Excel import (xlsx, xls, xlsb, ods) and export (xlsx only)
//
// Import reads one named sheet into a text table; the header row is the
// first row of the used range. Export writes one worksheet per result table.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use commrec_recon::{Cell, OutputTable, ReconError, Table};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};

/// Excel caps sheet names at 31 characters.
const MAX_SHEET_NAME: usize = 31;

/// Sheet names in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, ReconError> {
    let workbook = open(path)?;
    Ok(workbook.sheet_names().to_vec())
}

/// Read one sheet. Sheet lookup ignores case and surrounding whitespace;
/// without a sheet name the first sheet is used.
pub fn read_sheet(path: &Path, sheet: Option<&str>, name: &str) -> Result<Table, ReconError> {
    let mut workbook = open(path)?;
    let names: Vec<String> = workbook.sheet_names().to_vec();

    let target = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.trim().eq_ignore_ascii_case(wanted.trim()))
            .cloned()
            .ok_or_else(|| ReconError::MissingSheet {
                sheet: wanted.to_string(),
                available: names.clone(),
            })?,
        None => names.first().cloned().ok_or_else(|| {
            ReconError::Io(format!("{}: workbook contains no sheets", path.display()))
        })?,
    };

    let range = workbook
        .worksheet_range(&target)
        .map_err(|e| ReconError::Io(format!("failed to read sheet '{target}': {e}")))?;

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(data_to_string).collect(),
        None => return Ok(Table::new(name, Vec::new())),
    };

    let mut table = Table::new(name, columns);
    for row in rows {
        let values: Vec<String> = row.iter().map(data_to_string).collect();
        if values.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        table.push_row(values);
    }
    log::debug!("{}: read {} rows from sheet '{}'", path.display(), table.len(), target);
    Ok(table)
}

fn open(path: &Path) -> Result<Sheets<std::io::BufReader<std::fs::File>>, ReconError> {
    open_workbook_auto(path)
        .map_err(|e| ReconError::Io(format!("failed to open Excel file {}: {e}", path.display())))
}

fn data_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        // Serial number; the snapshot date parser understands it
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Write every table to its own worksheet, header row in bold and amounts
/// as two-decimal numbers.
pub fn write_workbook(tables: &[OutputTable], path: &Path) -> Result<(), ReconError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let money = Format::new().set_num_format("0.00");
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| ReconError::Io(format!("{}: {e}", path.display()));

    for table in tables {
        let sheet_name: String = table.name.chars().take(MAX_SHEET_NAME).collect();
        let worksheet = workbook
            .add_worksheet()
            .set_name(&sheet_name)
            .map_err(|e| ReconError::Io(format!("failed to create sheet '{}': {e}", table.name)))?;

        for (col, name) in table.columns.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, name, &header)
                .map_err(xlsx_err)?;
        }

        for (r, row) in table.rows.iter().enumerate() {
            let excel_row = (r + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        worksheet.write_string(excel_row, col, s).map_err(xlsx_err)?;
                    }
                    Cell::Number(d) => {
                        let n = d.to_f64().unwrap_or(0.0);
                        worksheet
                            .write_number_with_format(excel_row, col, n, &money)
                            .map_err(xlsx_err)?;
                    }
                    Cell::Count(n) => {
                        worksheet.write_number(excel_row, col, *n as f64).map_err(xlsx_err)?;
                    }
                }
            }
        }
    }

    workbook
        .save(path)
        .map_err(|e| ReconError::Io(format!("failed to save XLSX file {}: {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    fn sample() -> Vec<OutputTable> {
        let mut orders = OutputTable::new(
            "Orders",
            vec!["BookingLocator".into(), "Provider".into(), "Expected".into()],
        );
        orders.rows.push(vec![
            Cell::text("AB-1"),
            Cell::text("Acme"),
            Cell::Number(Decimal::new(10050, 2)),
        ]);
        orders.rows.push(vec![Cell::text("AB-2"), Cell::Empty, Cell::Count(7)]);
        let commissions = OutputTable::new("Commissions", vec!["Locator".into()]);
        vec![orders, commissions]
    }

    #[test]
    fn test_workbook_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_workbook(&sample(), &path).unwrap();

        assert_eq!(sheet_names(&path).unwrap(), vec!["Orders", "Commissions"]);

        let table = read_sheet(&path, Some(" orders "), "orders").unwrap();
        assert_eq!(table.name, "orders");
        assert_eq!(table.columns, vec!["BookingLocator", "Provider", "Expected"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 0), "AB-1");
        assert_eq!(table.cell(0, 2), "100.5");
        assert_eq!(table.cell(1, 1), "");
        assert_eq!(table.cell(1, 2), "7");
    }

    #[test]
    fn test_header_only_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_workbook(&sample(), &path).unwrap();
        let table = read_sheet(&path, Some("Commissions"), "commissions").unwrap();
        assert_eq!(table.columns, vec!["Locator"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_first_sheet_by_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_workbook(&sample(), &path).unwrap();
        let table = read_sheet(&path, None, "orders").unwrap();
        assert_eq!(table.columns[0], "BookingLocator");
    }

    #[test]
    fn test_missing_sheet_lists_available() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        write_workbook(&sample(), &path).unwrap();
        let err = read_sheet(&path, Some("ODV"), "orders").unwrap_err();
        assert!(err.is_schema());
        assert_eq!(
            err.to_string(),
            "sheet 'ODV' not found, available sheets: Orders, Commissions"
        );
    }

    #[test]
    fn test_long_sheet_names_truncated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("long.xlsx");
        let table = OutputTable::new("a_result_table_with_a_very_long_name", vec!["x".into()]);
        write_workbook(&[table], &path).unwrap();
        assert_eq!(sheet_names(&path).unwrap()[0].chars().count(), 31);
    }
}
